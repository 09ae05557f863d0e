use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::history::{daily_prices, DailyPrice};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/btc_history", get(btc_history))
}

/// GET /btc_history — daily prices for the configured asset over the
/// configured window, straight from upstream (never store-backed).
///
/// Upstream trouble degrades to an empty array, never an error.
async fn btc_history(State(state): State<Arc<AppState>>) -> Json<Vec<DailyPrice>> {
    let payload = match state
        .upstream
        .market_chart(&state.config.history_asset, state.config.history_days)
        .await
    {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("history feed fetch failed: {e}");
            return Json(Vec::new());
        }
    };
    Json(daily_prices(&payload))
}
