use axum::{extract::{Query, State}, http::StatusCode, Json};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::{
    api_client::ApiError,
    config::IndicatorConfig,
    indicators::{BollingerBands, EMA, MACD, RSI, SMA},
    state::AppState,
};

const MAX_PERIOD: usize = 200;

#[derive(Deserialize)]
pub struct IndicatorQuery {
    pub symbol: Option<String>,
    pub interval: Option<String>,
    pub apikey: Option<String>,
    pub indicators: Option<String>, // comma-separated: "sma_20,ema_12,rsi_14,bb_20,macd"
}

#[derive(Serialize)]
pub struct IndicatorResponse {
    pub symbol: String,
    pub interval: String,
    pub timestamps: Vec<NaiveDateTime>,
    pub prices: Vec<f64>,
    /// RSI series are one entry shorter than `prices` (aligned to `prices[1..]`)
    pub indicators: BTreeMap<String, Vec<Option<f64>>>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiFailure = (StatusCode, Json<ErrorResponse>);

fn failure(status: StatusCode, error: impl Into<String>) -> ApiFailure {
    (status, Json(ErrorResponse { error: error.into() }))
}

pub async fn get_indicators(
    State(state): State<AppState>,
    Query(query): Query<IndicatorQuery>,
) -> Result<Json<IndicatorResponse>, ApiFailure> {
    let symbol = query
        .symbol
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Missing symbol parameter"))?;
    let requested = query
        .indicators
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Missing indicators parameter"))?;

    let apikey = state
        .resolve_api_key(query.apikey)
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Missing apikey parameter"))?;

    let series = compute_series(&[], &requested, &state.config.indicators);
    if series.is_empty() {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            format!("No valid indicators requested: {:?}", requested),
        ));
    }

    let market = &state.config.market;
    let interval = query.interval.unwrap_or_else(|| market.interval.clone());

    let candles = state
        .client
        .fetch_time_series(&symbol, &interval, market.outputsize, &apikey)
        .await
        .map_err(|e| {
            tracing::warn!(symbol = %symbol, "Indicator fetch failed: {}", e);
            let status = match &e {
                ApiError::EmptySeries(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            };
            failure(status, e.to_string())
        })?;

    // Extract prices and timestamps
    let prices: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let timestamps: Vec<NaiveDateTime> = candles.iter().map(|c| c.datetime).collect();

    let indicators = compute_series(&prices, &requested, &state.config.indicators);

    Ok(Json(IndicatorResponse {
        symbol,
        interval,
        timestamps,
        prices,
        indicators,
    }))
}

/// Compute every well-formed indicator in a comma-separated request string
/// Malformed entries, unknown types and out-of-range periods are skipped
pub fn compute_series(
    prices: &[f64],
    requested: &str,
    config: &IndicatorConfig,
) -> BTreeMap<String, Vec<Option<f64>>> {
    let mut indicators = BTreeMap::new();

    for indicator_str in requested.split(',').map(|s| s.trim()) {
        if indicator_str == "macd" {
            let macd = MACD::new(config.macd_fast, config.macd_slow, config.macd_signal)
                .calculate(prices);
            indicators.insert("macd".to_string(), present(macd.macd));
            indicators.insert("macd_signal".to_string(), present(macd.signal));
            indicators.insert("macd_hist".to_string(), present(macd.hist));
            continue;
        }

        // Parse indicator format: "sma_20", "ema_12", etc.
        let Some((indicator_type, period)) = indicator_str.split_once('_') else {
            continue; // Skip malformed indicator strings
        };

        let period: usize = match period.parse() {
            Ok(p) => p,
            Err(_) => continue, // Skip if period is not a valid number
        };

        if period == 0 || period > MAX_PERIOD {
            continue;
        }

        match indicator_type {
            "sma" => {
                indicators.insert(indicator_str.to_string(), SMA::new(period).calculate(prices));
            }
            "ema" => {
                indicators.insert(
                    indicator_str.to_string(),
                    present(EMA::new(period).calculate(prices)),
                );
            }
            "rsi" => {
                indicators.insert(indicator_str.to_string(), RSI::new(period).calculate(prices));
            }
            "bb" => {
                let bands = BollingerBands::new(period, config.bollinger_mult).calculate(prices);
                indicators.insert(
                    format!("{}_middle", indicator_str),
                    bands.iter().map(|b| b.map(|b| b.middle)).collect(),
                );
                indicators.insert(
                    format!("{}_upper", indicator_str),
                    bands.iter().map(|b| b.map(|b| b.upper)).collect(),
                );
                indicators.insert(
                    format!("{}_lower", indicator_str),
                    bands.iter().map(|b| b.map(|b| b.lower)).collect(),
                );
            }
            _ => continue, // Skip unknown indicator types
        }
    }

    indicators
}

fn present(values: Vec<f64>) -> Vec<Option<f64>> {
    values.into_iter().map(Some).collect()
}
