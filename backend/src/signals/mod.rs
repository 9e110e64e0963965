// Signal aggregation
// Turns the latest indicator readings into one discrete trading signal

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub mod rsi_score;
pub mod votes;

pub use rsi_score::RsiScorePolicy;
pub use votes::VotePolicy;

/// Directional opinion of a single indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Rsi,
    Macd,
    Bollinger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndicatorVote {
    pub indicator: Indicator,
    pub vote: Vote,
}

impl IndicatorVote {
    pub fn new(indicator: Indicator, vote: Vote) -> Self {
        Self { indicator, vote }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
    Mixed,
    Wait,
}

impl SignalKind {
    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
            SignalKind::Mixed => "MIXED",
            SignalKind::Wait => "WAIT",
        }
    }
}

impl From<Vote> for SignalKind {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Buy => SignalKind::Buy,
            Vote::Sell => SignalKind::Sell,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregated signal together with the votes that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalDecision {
    pub kind: SignalKind,
    pub votes: Vec<IndicatorVote>,
}

impl SignalDecision {
    pub fn wait() -> Self {
        Self {
            kind: SignalKind::Wait,
            votes: Vec::new(),
        }
    }
}

/// Latest indicator readings fed to a policy
///
/// `bollinger` is the normalized band position of the latest price
/// (see `Band::position`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Readings {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub bollinger: Option<f64>,
}

/// Vote thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteThresholds {
    /// RSI above this votes Sell
    pub rsi_overbought: f64,
    /// RSI below this votes Buy
    pub rsi_oversold: f64,
    /// MACD above this votes Buy, at or below votes Sell
    pub macd_zero_line: f64,
    /// Band position above this votes Sell
    pub bollinger_upper: f64,
    /// Band position below this votes Buy
    pub bollinger_lower: f64,
}

impl Default for VoteThresholds {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            macd_zero_line: 0.0,
            bollinger_upper: 0.5,
            bollinger_lower: -0.5,
        }
    }
}

/// Outcome of a policy run
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub signal: SignalDecision,
    /// Scalar score, only produced by score-based policies
    pub score: Option<i32>,
}

/// Core trait for aggregation policies
pub trait SignalPolicy: Send + Sync {
    fn assess(&self, readings: &Readings) -> Assessment;

    /// Policy name reported alongside results
    fn name(&self) -> &'static str;
}

/// Selectable aggregation policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Majority of RSI, MACD and Bollinger votes
    Votes,
    /// RSI-only score in [-90, 90]
    RsiScore,
}

impl PolicyKind {
    pub fn build(self, thresholds: VoteThresholds) -> Box<dyn SignalPolicy> {
        match self {
            PolicyKind::Votes => Box::new(VotePolicy::new(thresholds)),
            PolicyKind::RsiScore => Box::new(RsiScorePolicy::new(thresholds)),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "votes" => Ok(PolicyKind::Votes),
            "rsi_score" | "score" => Ok(PolicyKind::RsiScore),
            other => Err(format!("unknown signal policy: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_kind_parse() {
        assert_eq!("votes".parse::<PolicyKind>(), Ok(PolicyKind::Votes));
        assert_eq!(" RSI_SCORE ".parse::<PolicyKind>(), Ok(PolicyKind::RsiScore));
        assert!("majority".parse::<PolicyKind>().is_err());
    }

    #[test]
    fn test_policy_kind_builds_matching_policy() {
        let thresholds = VoteThresholds::default();
        assert_eq!(PolicyKind::Votes.build(thresholds).name(), "votes");
        assert_eq!(PolicyKind::RsiScore.build(thresholds).name(), "rsi_score");
    }

    #[test]
    fn test_signal_kind_serializes_upper_case() {
        let json = serde_json::to_string(&SignalKind::Mixed).unwrap();
        assert_eq!(json, "\"MIXED\"");

        let vote = IndicatorVote::new(Indicator::Macd, Vote::Buy);
        let json = serde_json::to_value(vote).unwrap();
        assert_eq!(json, serde_json::json!({"indicator": "macd", "vote": "buy"}));
    }
}
