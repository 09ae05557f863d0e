use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;
use crate::store::SnapshotRow;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/data", get(live_data))
}

/// GET /data — the most recent capture batch.
///
/// A pure cache read: the background loop owns the upstream fetch, so a
/// request here never races it into duplicate appends. Empty until the
/// first capture succeeds.
async fn live_data(State(state): State<Arc<AppState>>) -> Json<Vec<SnapshotRow>> {
    Json(state.last_snapshot.read().await.clone())
}
