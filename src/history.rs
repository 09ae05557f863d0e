use chrono::DateTime;
use serde::Serialize;

use crate::upstream::ChartPayload;

/// One point of the daily price-history feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPrice {
    pub date: String,
    pub price: f64,
}

/// Flatten a market-chart payload into calendar-date points.
///
/// Epoch-millisecond timestamps become UTC `YYYY-MM-DD` strings (time of
/// day discarded) and prices are rounded to two decimals. Points landing
/// on the same date pass through as delivered, no dedup.
pub fn daily_prices(payload: &ChartPayload) -> Vec<DailyPrice> {
    payload
        .prices
        .iter()
        .filter_map(|&(ts_ms, price)| {
            let at = DateTime::from_timestamp_millis(ts_ms as i64)?;
            Some(DailyPrice {
                date: at.date_naive().format("%Y-%m-%d").to_string(),
                price: (price * 100.0).round() / 100.0,
            })
        })
        .collect()
}
