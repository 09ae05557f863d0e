use chrono::{Local, NaiveDateTime, Timelike};

use crate::state::AppState;
use crate::store::SnapshotRow;
use crate::upstream::MarketQuote;

/// Local wall clock, truncated to second precision (the granularity of
/// the history log's time column).
pub fn now_wall_clock() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Shape upstream quotes into history rows: one shared capture timestamp
/// for the batch, upper-cased tickers, missing numerics defaulting to 0.
pub fn normalize(quotes: &[MarketQuote], time: NaiveDateTime) -> Vec<SnapshotRow> {
    quotes
        .iter()
        .map(|q| SnapshotRow {
            time,
            name: q.name.clone(),
            symbol: q.symbol.to_uppercase(),
            price: q.current_price.unwrap_or(0.0),
            change: q.price_change_percentage_24h.unwrap_or(0.0),
            volume: q.total_volume.unwrap_or(0.0),
        })
        .collect()
}

/// Fetch one market snapshot and record it.
///
/// On success the last-snapshot cache is replaced and the batch appended
/// to the history log. On upstream failure the cache is returned unchanged
/// (possibly empty) and nothing is written; the next scheduled cycle is
/// the only retry.
pub async fn capture(state: &AppState) -> Vec<SnapshotRow> {
    let quotes = match state.upstream.markets(state.config.top_n).await {
        Ok(quotes) => quotes,
        Err(e) => {
            tracing::warn!("market fetch failed, keeping last snapshot: {e}");
            return state.last_snapshot.read().await.clone();
        }
    };

    let rows = normalize(&quotes, now_wall_clock());
    *state.last_snapshot.write().await = rows.clone();
    if let Err(e) = state.store.append(&rows) {
        tracing::error!("history append failed: {e}");
    }
    rows
}
