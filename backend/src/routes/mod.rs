use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub mod history;
pub mod indicators;
pub mod signal;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/signals", get(history::get_signals))
        .route("/history", get(history::get_history))
        .route("/indicators", get(indicators::get_indicators));

    Router::new()
        .route("/signal", get(signal::get_signal))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
