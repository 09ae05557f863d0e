use chrono::NaiveDateTime;

use crate::error::WatchError;
use crate::store::SnapshotRow;

/// Trailing window, in observations, for the rolling volatility.
pub const VOL_WINDOW: usize = 10;

/// Annualization convention: √252 trading days.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// One point of the volatility series. `vol` is `None` inside the warmup
/// region (the first `VOL_WINDOW - 1` rows).
#[derive(Debug, Clone, PartialEq)]
pub struct VolPoint {
    pub time: NaiveDateTime,
    pub vol: Option<f64>,
}

/// Latest-snapshot projection: a `SnapshotRow` minus its timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub volume: f64,
}

/// Rolling annualized volatility for one symbol.
///
/// Rows are matched case-insensitively and sorted ascending by capture
/// time. Simple returns `p[i]/p[i-1] - 1` feed a trailing sample standard
/// deviation over the last `VOL_WINDOW` rows, annualized by √252. The
/// output has one entry per matched row; entries before row index
/// `VOL_WINDOW - 1` are undefined.
pub fn volatility_series(rows: &[SnapshotRow], symbol: &str) -> Result<Vec<VolPoint>, WatchError> {
    let mut picked: Vec<&SnapshotRow> = rows
        .iter()
        .filter(|r| r.symbol.eq_ignore_ascii_case(symbol))
        .collect();
    if picked.is_empty() {
        return Err(WatchError::NoData(format!(
            "no data for symbol {}",
            symbol.to_uppercase()
        )));
    }
    picked.sort_by_key(|r| r.time);

    let annualize = TRADING_DAYS_PER_YEAR.sqrt();
    let mut returns: Vec<f64> = Vec::with_capacity(picked.len().saturating_sub(1));
    let mut out = Vec::with_capacity(picked.len());
    for (i, row) in picked.iter().enumerate() {
        if i > 0 {
            returns.push(row.price / picked[i - 1].price - 1.0);
        }
        // The window at row i spans rows [i-9, i]; its first return belongs
        // to the second row of that span (row 0 has no return at all).
        let vol = if i + 1 >= VOL_WINDOW {
            let first_row = (i + 1 - VOL_WINDOW).max(1);
            Some(sample_std(&returns[first_row - 1..i]) * annualize)
        } else {
            None
        };
        out.push(VolPoint {
            time: row.time,
            vol,
        });
    }
    Ok(out)
}

/// Sample standard deviation (ddof = 1). Zero for fewer than two values.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// All rows sharing the maximum capture time, projected for reporting.
pub fn latest_snapshot(
    rows: &[SnapshotRow],
) -> Result<(NaiveDateTime, Vec<ReportRow>), WatchError> {
    let latest = rows
        .iter()
        .map(|r| r.time)
        .max()
        .ok_or_else(|| WatchError::NoData("no data yet".to_string()))?;
    let picked = rows
        .iter()
        .filter(|r| r.time == latest)
        .map(|r| ReportRow {
            name: r.name.clone(),
            symbol: r.symbol.clone(),
            price: r.price,
            change: r.change,
            volume: r.volume,
        })
        .collect();
    Ok((latest, picked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TIME_FORMAT;

    fn row(time: &str, symbol: &str, price: f64) -> SnapshotRow {
        SnapshotRow {
            time: NaiveDateTime::parse_from_str(time, TIME_FORMAT).unwrap(),
            name: format!("{symbol} asset"),
            symbol: symbol.to_string(),
            price,
            change: 0.0,
            volume: 100.0,
        }
    }

    fn btc_rows(prices: &[f64]) -> Vec<SnapshotRow> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| row(&format!("2026-08-08 10:{:02}:00", i), "BTC", p))
            .collect()
    }

    #[test]
    fn volatility_unknown_symbol_is_no_data() {
        let rows = btc_rows(&[100.0, 101.0]);
        assert!(matches!(
            volatility_series(&rows, "DOGE"),
            Err(WatchError::NoData(_))
        ));
    }

    #[test]
    fn volatility_symbol_match_is_case_insensitive() {
        let rows = btc_rows(&[100.0, 101.0, 99.0]);
        let series = volatility_series(&rows, "btc").unwrap();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn volatility_windowing_over_twelve_rows() {
        // 12 consecutive captures: one output entry per row, the first 9
        // undefined, the remaining 3 defined and non-negative.
        let prices = [
            100.0, 101.0, 99.0, 102.0, 98.0, 103.0, 97.0, 104.0, 96.0, 105.0, 95.0, 106.0,
        ];
        let series = volatility_series(&btc_rows(&prices), "BTC").unwrap();
        assert_eq!(series.len(), 12);
        for point in &series[..9] {
            assert_eq!(point.vol, None);
        }
        for point in &series[9..] {
            let v = point.vol.expect("defined after warmup");
            assert!(v >= 0.0);
        }
    }

    #[test]
    fn constant_growth_has_zero_volatility() {
        // Identical return every step ⇒ the sample std of every window is 0.
        let mut prices = vec![100.0];
        for _ in 0..11 {
            let last = *prices.last().unwrap();
            prices.push(last * 1.01);
        }
        let series = volatility_series(&btc_rows(&prices), "BTC").unwrap();
        for point in &series[9..] {
            assert!(point.vol.unwrap().abs() < 1e-9);
        }
    }

    #[test]
    fn alternating_returns_match_hand_computed_std() {
        // Returns alternate +1% / -1%; a full 10-return window has mean 0
        // and sample variance 10·(0.01)² / 9.
        let mut prices = vec![100.0];
        for i in 0..11 {
            let r = if i % 2 == 0 { 0.01 } else { -0.01 };
            let last = *prices.last().unwrap();
            prices.push(last * (1.0 + r));
        }
        let series = volatility_series(&btc_rows(&prices), "BTC").unwrap();
        let expected = (10.0 * 0.01_f64.powi(2) / 9.0).sqrt() * 252.0_f64.sqrt();
        let got = series[10].vol.unwrap();
        assert!((got - expected).abs() < 1e-6, "got {got}, expected {expected}");
    }

    #[test]
    fn volatility_sorts_rows_before_differencing() {
        let mut rows = btc_rows(&[100.0, 110.0, 121.0]);
        rows.reverse();
        let series = volatility_series(&rows, "BTC").unwrap();
        assert!(series[0].time < series[1].time && series[1].time < series[2].time);
    }

    #[test]
    fn latest_snapshot_empty_is_no_data() {
        assert!(matches!(latest_snapshot(&[]), Err(WatchError::NoData(_))));
    }

    #[test]
    fn latest_snapshot_picks_rows_at_max_time() {
        let rows = vec![
            row("2026-08-08 10:00:00", "BTC", 65000.0),
            row("2026-08-08 10:00:00", "ETH", 3200.0),
            row("2026-08-08 10:00:30", "BTC", 65100.0),
            row("2026-08-08 10:00:30", "ETH", 3210.0),
        ];
        let (latest, picked) = latest_snapshot(&rows).unwrap();
        assert_eq!(
            latest,
            NaiveDateTime::parse_from_str("2026-08-08 10:00:30", TIME_FORMAT).unwrap()
        );
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].symbol, "BTC");
        assert_eq!(picked[0].price, 65100.0);
    }

    #[test]
    fn latest_snapshot_single_asset_capture_wins() {
        // Two assets at t1, then one later capture holding only BTC: the
        // latest snapshot is exactly that single row.
        let rows = vec![
            row("2026-08-08 10:00:00", "BTC", 65000.0),
            row("2026-08-08 10:00:00", "ETH", 3200.0),
            row("2026-08-08 10:00:30", "BTC", 65100.0),
        ];
        let (_, picked) = latest_snapshot(&rows).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].symbol, "BTC");
    }
}
