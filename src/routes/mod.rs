pub mod chart;
pub mod export;
pub mod history;
pub mod live;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Assemble the API router.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(live::routes())
        .merge(chart::routes())
        .merge(history::routes())
        .merge(export::routes())
}
