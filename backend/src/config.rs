// Application configuration
// Loaded once from the environment (and an optional .env file) at startup.
// Every key has a default so an empty environment yields a working server.

use anyhow::{bail, Context, Result};
use std::fmt::Display;
use std::str::FromStr;

use crate::signals::{PolicyKind, VoteThresholds};

/// Which MACD series feeds the MACD vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdSource {
    Line,
    Histogram,
}

impl FromStr for MacdSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" | "macd" => Ok(MacdSource::Line),
            "histogram" | "hist" => Ok(MacdSource::Histogram),
            other => Err(format!("unknown MACD source: {}", other)),
        }
    }
}

/// Indicator periods, multipliers and vote thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_mult: f64,
    pub macd_source: MacdSource,
    pub thresholds: VoteThresholds,
    pub policy: PolicyKind,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_mult: 2.0,
            macd_source: MacdSource::Line,
            thresholds: VoteThresholds::default(),
            policy: PolicyKind::Votes,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("RSI_PERIOD", self.rsi_period),
            ("MACD_FAST", self.macd_fast),
            ("MACD_SLOW", self.macd_slow),
            ("MACD_SIGNAL", self.macd_signal),
            ("BB_PERIOD", self.bollinger_period),
        ];
        for (key, period) in periods {
            if period == 0 {
                bail!("{} must be at least 1", key);
            }
        }

        if self.macd_fast >= self.macd_slow {
            bail!(
                "MACD_FAST ({}) must be shorter than MACD_SLOW ({})",
                self.macd_fast,
                self.macd_slow
            );
        }
        if !self.bollinger_mult.is_finite() || self.bollinger_mult <= 0.0 {
            bail!("BB_MULT must be a positive finite number, got {}", self.bollinger_mult);
        }

        let t = &self.thresholds;
        let thresholds = [
            ("RSI_OVERBOUGHT", t.rsi_overbought),
            ("RSI_OVERSOLD", t.rsi_oversold),
            ("MACD_ZERO_LINE", t.macd_zero_line),
            ("BB_UPPER_POSITION", t.bollinger_upper),
            ("BB_LOWER_POSITION", t.bollinger_lower),
        ];
        for (key, value) in thresholds {
            if !value.is_finite() {
                bail!("{} must be a finite number, got {}", key, value);
            }
        }

        if t.rsi_oversold > t.rsi_overbought {
            bail!(
                "RSI_OVERSOLD ({}) must not exceed RSI_OVERBOUGHT ({})",
                t.rsi_oversold,
                t.rsi_overbought
            );
        }
        if t.bollinger_lower > t.bollinger_upper {
            bail!(
                "BB_LOWER_POSITION ({}) must not exceed BB_UPPER_POSITION ({})",
                t.bollinger_lower,
                t.bollinger_upper
            );
        }

        Ok(())
    }

    fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let thresholds = VoteThresholds {
            rsi_overbought: parse_or(lookup, "RSI_OVERBOUGHT", defaults.thresholds.rsi_overbought)?,
            rsi_oversold: parse_or(lookup, "RSI_OVERSOLD", defaults.thresholds.rsi_oversold)?,
            macd_zero_line: parse_or(lookup, "MACD_ZERO_LINE", defaults.thresholds.macd_zero_line)?,
            bollinger_upper: parse_or(
                lookup,
                "BB_UPPER_POSITION",
                defaults.thresholds.bollinger_upper,
            )?,
            bollinger_lower: parse_or(
                lookup,
                "BB_LOWER_POSITION",
                defaults.thresholds.bollinger_lower,
            )?,
        };

        let config = Self {
            rsi_period: parse_or(lookup, "RSI_PERIOD", defaults.rsi_period)?,
            macd_fast: parse_or(lookup, "MACD_FAST", defaults.macd_fast)?,
            macd_slow: parse_or(lookup, "MACD_SLOW", defaults.macd_slow)?,
            macd_signal: parse_or(lookup, "MACD_SIGNAL", defaults.macd_signal)?,
            bollinger_period: parse_or(lookup, "BB_PERIOD", defaults.bollinger_period)?,
            bollinger_mult: parse_or(lookup, "BB_MULT", defaults.bollinger_mult)?,
            macd_source: parse_or(lookup, "MACD_SOURCE", defaults.macd_source)?,
            thresholds,
            policy: parse_or(lookup, "SIGNAL_POLICY", defaults.policy)?,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Twelve Data access and watched-pair polling
#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    pub base_url: String,
    /// Used by the poller and as a fallback for requests without `apikey`
    pub api_key: Option<String>,
    pub pairs: Vec<String>,
    pub interval: String,
    pub outputsize: u32,
    pub poll_secs: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twelvedata.com".to_string(),
            api_key: None,
            pairs: default_pairs(),
            interval: "1min".to_string(),
            outputsize: 200,
            poll_secs: 60,
        }
    }
}

fn default_pairs() -> Vec<String> {
    ["EUR/USD", "GBP/USD", "USD/JPY", "USD/CAD", "AUD/USD", "NZD/USD"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Maximum number of signal records kept in memory
    pub history_size: usize,
    pub market: MarketDataConfig,
    pub indicators: IndicatorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            history_size: 500,
            market: MarketDataConfig::default(),
            indicators: IndicatorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let pairs = match non_empty(&lookup, "SIGNAL_PAIRS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.market.pairs,
        };

        let market = MarketDataConfig {
            base_url: non_empty(&lookup, "TWELVE_DATA_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.market.base_url),
            api_key: non_empty(&lookup, "TWELVE_DATA_API_KEY"),
            pairs,
            interval: non_empty(&lookup, "SIGNAL_INTERVAL").unwrap_or(defaults.market.interval),
            outputsize: parse_or(&lookup, "SIGNAL_OUTPUTSIZE", defaults.market.outputsize)?,
            poll_secs: parse_or(&lookup, "SIGNAL_POLL_SECS", defaults.market.poll_secs)?,
        };

        if market.poll_secs == 0 {
            bail!("SIGNAL_POLL_SECS must be at least 1");
        }

        Ok(Self {
            bind_addr: non_empty(&lookup, "SIGNAL_BIND_ADDR").unwrap_or(defaults.bind_addr),
            history_size: parse_or(&lookup, "SIGNAL_HISTORY_SIZE", defaults.history_size)?,
            market,
            indicators: IndicatorConfig::from_lookup(&lookup)?,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
