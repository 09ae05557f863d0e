use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::chart::render_volatility_png;
use crate::error::WatchError;
use crate::state::AppState;
use crate::views::volatility_series;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chart/{symbol}", get(volatility_chart))
}

/// GET /chart/{symbol} — rolling-volatility line chart, PNG.
async fn volatility_chart(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, WatchError> {
    let rows = state.store.scan_by_symbol(&symbol)?;
    let series = volatility_series(&rows, &symbol)?;
    let png = render_volatility_png(&series)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
