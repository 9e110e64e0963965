use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::models::{SignalRecord, SignalReport};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub pair: Option<String>,
    pub limit: Option<usize>,
}

/// Latest report for every watched pair
pub async fn get_signals(State(state): State<AppState>) -> Json<Vec<SignalReport>> {
    Json(state.latest_reports().await)
}

/// Recorded signals, newest first
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<SignalRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Json(state.history(query.pair.as_deref(), limit).await)
}
