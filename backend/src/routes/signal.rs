use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::SignalReport;
use crate::services::signal_service::{evaluate_pair, SeriesRequest};
use crate::signals::PolicyKind;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignalQuery {
    pub symbol: Option<String>,
    pub interval: Option<String>,
    pub apikey: Option<String>,
    pub outputsize: Option<String>,
    /// Overrides the configured aggregation policy
    pub policy: Option<String>,
}

/// `{"status": "ok", ...report}` or `{"status": "error", "message": ...}`
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SignalEnvelope {
    Ok(Box<SignalReport>),
    Error { message: String },
}

impl SignalEnvelope {
    fn error(message: impl Into<String>) -> Json<Self> {
        Json(SignalEnvelope::Error {
            message: message.into(),
        })
    }
}

/// Fetch history for one symbol and return the latest indicator readings
/// with the aggregated signal
pub async fn get_signal(
    State(state): State<AppState>,
    Query(query): Query<SignalQuery>,
) -> Json<SignalEnvelope> {
    let Some(symbol) = query.symbol.filter(|s| !s.trim().is_empty()) else {
        return SignalEnvelope::error("Missing symbol parameter");
    };

    let Some(apikey) = state.resolve_api_key(query.apikey) else {
        return SignalEnvelope::error("Missing apikey parameter");
    };

    let market = &state.config.market;
    let outputsize = match query.outputsize.as_deref().map(str::trim) {
        None | Some("") => market.outputsize,
        Some(raw) => match raw.parse::<u32>() {
            Ok(size) if size > 0 => size,
            _ => return SignalEnvelope::error(format!("Invalid outputsize parameter: {}", raw)),
        },
    };

    let indicators = &state.config.indicators;
    let policy_kind = match query.policy.as_deref().map(str::trim) {
        None | Some("") => indicators.policy,
        Some(raw) => match raw.parse::<PolicyKind>() {
            Ok(kind) => kind,
            Err(e) => return SignalEnvelope::error(e),
        },
    };
    let policy = policy_kind.build(indicators.thresholds);

    let request = SeriesRequest {
        symbol: symbol.trim().to_string(),
        interval: query.interval.unwrap_or_else(|| market.interval.clone()),
        outputsize,
        apikey,
    };

    match evaluate_pair(&state.client, &request, indicators, policy.as_ref()).await {
        Ok(report) => {
            tracing::info!(
                pair = %report.symbol,
                signal = %report.signal.kind,
                policy = report.policy,
                "Signal evaluated on demand"
            );
            state.record_signal(&report).await;
            Json(SignalEnvelope::Ok(Box::new(report)))
        }
        Err(e) => {
            tracing::warn!(pair = %request.symbol, "Signal request failed: {}", e);
            SignalEnvelope::error(e.to_string())
        }
    }
}
