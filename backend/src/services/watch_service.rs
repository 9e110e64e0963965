use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::{error, info, warn};

use crate::services::signal_service::{evaluate_pairs, SeriesRequest};
use crate::signals::SignalPolicy;
use crate::state::AppState;

/// Re-evaluate every configured pair on a fixed interval and publish the
/// results into shared state
pub async fn start_signal_polling(state: AppState) {
    let market = &state.config.market;

    let Some(apikey) = market.api_key.clone() else {
        warn!("TWELVE_DATA_API_KEY not set, pair watcher disabled");
        return;
    };

    let indicator_config = Arc::new(state.config.indicators.clone());
    let policy: Arc<dyn SignalPolicy> = Arc::from(
        indicator_config
            .policy
            .build(indicator_config.thresholds),
    );

    let requests: Vec<SeriesRequest> = market
        .pairs
        .iter()
        .map(|symbol| SeriesRequest {
            symbol: symbol.clone(),
            interval: market.interval.clone(),
            outputsize: market.outputsize,
            apikey: apikey.clone(),
        })
        .collect();

    let mut interval = time::interval(Duration::from_secs(market.poll_secs));

    info!(
        pairs = ?market.pairs,
        interval = %market.interval,
        policy = policy.name(),
        "Starting signal polling service ({}s interval)",
        market.poll_secs
    );

    loop {
        interval.tick().await;

        let results = evaluate_pairs(
            &state.client,
            requests.clone(),
            indicator_config.clone(),
            policy.clone(),
        )
        .await;

        for (pair, result) in results {
            match result {
                Ok(report) => {
                    info!(
                        pair = %pair,
                        signal = %report.signal.kind,
                        price = report.price,
                        rsi = ?report.rsi,
                        "Signal updated"
                    );
                    state.update_latest(report).await;
                }
                Err(e) => {
                    // Resiliency: keep polling the other pairs
                    error!(pair = %pair, "Failed to evaluate signal: {}", e);
                }
            }
        }
    }
}
