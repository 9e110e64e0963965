use crate::models::Candle;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

/// Envelope of a Twelve Data `time_series` response
/// Errors come back with HTTP 200 and `status: "error"`
#[derive(Deserialize)]
struct TimeSeriesResponse {
    status: Option<String>,
    message: Option<String>,
    values: Option<Vec<TimeSeriesValue>>,
}

/// Prices are string-encoded by the provider
#[derive(Deserialize)]
struct TimeSeriesValue {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, PartialEq)]
pub enum ApiError {
    RequestFailed(String),
    ParseError(String),
    /// Provider answered with an error envelope
    Provider(String),
    EmptySeries(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            ApiError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ApiError::Provider(msg) => write!(f, "Provider error: {}", msg),
            ApiError::EmptySeries(symbol) => write!(f, "No price data returned for {}", symbol),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch closing-price history for `symbol`, oldest first
    pub async fn fetch_time_series(
        &self,
        symbol: &str,
        interval: &str,
        outputsize: u32,
        apikey: &str,
    ) -> Result<Vec<Candle>, ApiError> {
        let url = format!("{}/time_series", self.base_url);
        let outputsize = outputsize.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("outputsize", outputsize.as_str()),
                ("apikey", apikey),
            ])
            .header("User-Agent", "quotex-signal/0.1")
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let response_text = response
            .text()
            .await
            .map_err(|e| ApiError::ParseError(format!("Failed to get response text: {}", e)))?;

        let candles = parse_time_series(&response_text)?;
        if candles.is_empty() {
            return Err(ApiError::EmptySeries(symbol.to_string()));
        }

        tracing::debug!(symbol, bars = candles.len(), "Fetched time series");
        Ok(candles)
    }
}

/// Parse a `time_series` body into candles ordered oldest first
/// (the provider returns most recent first)
pub fn parse_time_series(body: &str) -> Result<Vec<Candle>, ApiError> {
    let response: TimeSeriesResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::ParseError(format!("Failed to parse time series: {}", e)))?;

    if response.status.as_deref() == Some("error") {
        return Err(ApiError::Provider(
            response
                .message
                .unwrap_or_else(|| "unknown provider error".to_string()),
        ));
    }

    let values = response
        .values
        .ok_or_else(|| ApiError::ParseError("Response has no values".to_string()))?;

    let mut candles = values
        .into_iter()
        .map(parse_value)
        .collect::<Result<Vec<_>, _>>()?;

    candles.reverse();
    Ok(candles)
}

fn parse_value(value: TimeSeriesValue) -> Result<Candle, ApiError> {
    Ok(Candle {
        datetime: parse_datetime(&value.datetime)?,
        open: parse_price("open", &value.open)?,
        high: parse_price("high", &value.high)?,
        low: parse_price("low", &value.low)?,
        close: parse_price("close", &value.close)?,
        volume: value
            .volume
            .as_deref()
            .map(|v| parse_price("volume", v))
            .transpose()?,
    })
}

fn parse_price(field: &str, raw: &str) -> Result<f64, ApiError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| ApiError::ParseError(format!("Invalid {} {:?}: {}", field, raw, e)))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ApiError::ParseError(format!("Non-finite {}: {}", field, raw)))
    }
}

/// Intraday bars carry a time, daily and longer bars only a date
fn parse_datetime(raw: &str) -> Result<NaiveDateTime, ApiError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|e| ApiError::ParseError(format!("Invalid datetime {:?}: {}", raw, e)))
}
