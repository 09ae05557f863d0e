use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::deck::{build_report_deck, DECK_CONTENT_TYPE, DECK_FILENAME};
use crate::error::WatchError;
use crate::state::AppState;
use crate::views::latest_snapshot;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/pptx", get(pptx_export))
}

/// GET /pptx — the latest snapshot as a one-slide deck, served as a
/// download.
async fn pptx_export(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, WatchError> {
    let rows = state.store.scan()?;
    let (latest, report) = latest_snapshot(&rows)?;
    let deck = build_report_deck(latest, &report)?;
    let headers = [
        (header::CONTENT_TYPE, DECK_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{DECK_FILENAME}\""),
        ),
    ];
    Ok((headers, deck))
}
