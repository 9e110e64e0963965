use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;

use crate::api_client::{ApiClient, ApiError};
use crate::config::{IndicatorConfig, MacdSource};
use crate::indicators::{latest, BollingerBands, MACD, RSI};
use crate::models::{Candle, SignalReport};
use crate::signals::{Readings, SignalPolicy};

/// What to fetch from the market-data provider for one evaluation
#[derive(Debug, Clone)]
pub struct SeriesRequest {
    pub symbol: String,
    pub interval: String,
    pub outputsize: u32,
    pub apikey: String,
}

/// Run every indicator over the candles' closes and aggregate the latest
/// readings with `policy`
///
/// Returns None for an empty series.
pub fn analyze(
    symbol: &str,
    interval: &str,
    candles: &[Candle],
    config: &IndicatorConfig,
    policy: &dyn SignalPolicy,
) -> Option<SignalReport> {
    let latest_candle = candles.last()?.clone();
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let price = latest_candle.close;

    let rsi = latest(&RSI::new(config.rsi_period).calculate(&closes));

    let macd = MACD::new(config.macd_fast, config.macd_slow, config.macd_signal).calculate(&closes);
    let macd_line = macd.macd.last().copied();
    let macd_signal = macd.signal.last().copied();
    let macd_hist = macd.hist.last().copied();

    let band = latest(
        &BollingerBands::new(config.bollinger_period, config.bollinger_mult).calculate(&closes),
    );
    let band_position = band.and_then(|b| b.position(price));

    let readings = Readings {
        rsi,
        macd: match config.macd_source {
            MacdSource::Line => macd_line,
            MacdSource::Histogram => macd_hist,
        },
        bollinger: band_position,
    };
    let assessment = policy.assess(&readings);

    Some(SignalReport {
        symbol: symbol.to_string(),
        interval: interval.to_string(),
        price,
        latest: latest_candle,
        rsi,
        macd: macd_line,
        macd_signal,
        macd_hist,
        bb: band.into(),
        band_position,
        signal: assessment.signal,
        score: assessment.score,
        policy: policy.name(),
        evaluated_at: Utc::now(),
    })
}

/// Fetch price history for one pair and evaluate it
pub async fn evaluate_pair(
    client: &ApiClient,
    request: &SeriesRequest,
    config: &IndicatorConfig,
    policy: &dyn SignalPolicy,
) -> Result<SignalReport, ApiError> {
    let candles = client
        .fetch_time_series(
            &request.symbol,
            &request.interval,
            request.outputsize,
            &request.apikey,
        )
        .await?;

    analyze(&request.symbol, &request.interval, &candles, config, policy)
        .ok_or_else(|| ApiError::EmptySeries(request.symbol.clone()))
}

/// Evaluate several pairs concurrently, one task per pair
/// Results come back in the order the pairs were given
pub async fn evaluate_pairs(
    client: &ApiClient,
    requests: Vec<SeriesRequest>,
    config: Arc<IndicatorConfig>,
    policy: Arc<dyn SignalPolicy>,
) -> Vec<(String, Result<SignalReport, ApiError>)> {
    let mut tasks = JoinSet::new();

    for (index, request) in requests.iter().cloned().enumerate() {
        let client = client.clone();
        let config = config.clone();
        let policy = policy.clone();
        tasks.spawn(async move {
            let result = evaluate_pair(&client, &request, &config, policy.as_ref()).await;
            (index, result)
        });
    }

    let mut results: Vec<Option<Result<SignalReport, ApiError>>> =
        requests.iter().map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => tracing::error!("Signal evaluation task failed: {}", e),
        }
    }

    requests
        .into_iter()
        .zip(results)
        .map(|(request, result)| {
            let result = result.unwrap_or_else(|| {
                Err(ApiError::RequestFailed("evaluation task aborted".to_string()))
            });
            (request.symbol, result)
        })
        .collect()
}
