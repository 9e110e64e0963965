use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::indicators::Band;
use crate::signals::{SignalDecision, SignalKind};

pub type Pair = String;

/// One bar of a provider time series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub datetime: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Latest Bollinger reading; all fields null during warmup
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BandsReading {
    pub middle: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

impl From<Option<Band>> for BandsReading {
    fn from(band: Option<Band>) -> Self {
        match band {
            Some(b) => Self {
                middle: Some(b.middle),
                upper: Some(b.upper),
                lower: Some(b.lower),
            },
            None => Self::default(),
        }
    }
}

/// Latest indicator readings and the aggregated signal for one pair
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReport {
    pub symbol: Pair,
    pub interval: String,
    pub price: f64,
    pub latest: Candle,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb: BandsReading,
    pub band_position: Option<f64>,
    pub signal: SignalDecision,
    pub score: Option<i32>,
    pub policy: &'static str,
    pub evaluated_at: DateTime<Utc>,
}

/// Entry in the in-memory signal history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRecord {
    pub pair: Pair,
    pub signal: SignalKind,
    pub score: Option<i32>,
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
}

impl From<&SignalReport> for SignalRecord {
    fn from(report: &SignalReport) -> Self {
        Self {
            pair: report.symbol.clone(),
            signal: report.signal.kind,
            score: report.score,
            price: report.price,
            recorded_at: report.evaluated_at,
        }
    }
}
