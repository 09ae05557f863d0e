use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::WatchError;

/// Format of the `time` column in the history log.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

mod wall_clock {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format(super::TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, super::TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// One asset's state at one capture instant. Column order matches the
/// persisted log: `time,name,symbol,price,change,volume`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    /// Local wall clock at capture time, second precision, shared by every
    /// row of one capture batch.
    #[serde(with = "wall_clock")]
    pub time: NaiveDateTime,
    pub name: String,
    /// Upper-cased ticker, unique within a batch.
    pub symbol: String,
    pub price: f64,
    /// 24 h percent change; 0.0 when upstream omitted it.
    pub change: f64,
    pub volume: f64,
}

/// Append-only history log backed by a single CSV file.
///
/// The capture loop is the sole writer; derived views and the deck export
/// read by full scan. Rows are never mutated or deleted here; operators
/// rotate the file externally if they care about size.
pub struct HistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a capture batch, creating the file (and its header) on first
    /// use. The batch is flushed and fsynced before this returns, so a
    /// crash after an observed success cannot lose it.
    pub fn append(&self, rows: &[SnapshotRow]) -> Result<(), WatchError> {
        if rows.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().unwrap();

        let write_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| WatchError::Store(e.to_string()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush().map_err(|e| WatchError::Store(e.to_string()))?;
        let file = writer
            .into_inner()
            .map_err(|e| WatchError::Store(e.to_string()))?;
        file.sync_all().map_err(|e| WatchError::Store(e.to_string()))?;
        Ok(())
    }

    /// Read every persisted row, in append (= chronological) order.
    pub fn scan(&self) -> Result<Vec<SnapshotRow>, WatchError> {
        if !self.path.exists() {
            return Err(WatchError::NoData("no data yet".to_string()));
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Ok(rows)
    }

    /// Rows for one symbol (case-insensitive), ascending by capture time.
    /// Empty when the file exists but holds nothing for the symbol.
    pub fn scan_by_symbol(&self, symbol: &str) -> Result<Vec<SnapshotRow>, WatchError> {
        let mut rows: Vec<SnapshotRow> = self
            .scan()?
            .into_iter()
            .filter(|r| r.symbol.eq_ignore_ascii_case(symbol))
            .collect();
        rows.sort_by_key(|r| r.time);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: &str, symbol: &str, price: f64) -> SnapshotRow {
        SnapshotRow {
            time: NaiveDateTime::parse_from_str(time, TIME_FORMAT).unwrap(),
            name: format!("{symbol} asset"),
            symbol: symbol.to_string(),
            price,
            change: -1.25,
            volume: 1_000_000.0,
        }
    }

    fn temp_store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));
        (dir, store)
    }

    #[test]
    fn append_then_scan_round_trips() {
        let (_dir, store) = temp_store();
        let batch = vec![
            row("2026-08-08 10:00:00", "BTC", 65000.0),
            row("2026-08-08 10:00:00", "ETH", 3200.5),
        ];
        store.append(&batch).unwrap();
        assert_eq!(store.scan().unwrap(), batch);
    }

    #[test]
    fn appends_grow_without_touching_prior_rows() {
        let (_dir, store) = temp_store();
        let first = vec![
            row("2026-08-08 10:00:00", "BTC", 65000.0),
            row("2026-08-08 10:00:00", "ETH", 3200.0),
        ];
        let second = vec![
            row("2026-08-08 10:00:30", "BTC", 65100.0),
            row("2026-08-08 10:00:30", "ETH", 3190.0),
        ];
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let all = store.scan().unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(&all[..2], &first[..]);
        assert_eq!(&all[2..], &second[..]);
    }

    #[test]
    fn header_written_exactly_once() {
        let (_dir, store) = temp_store();
        store.append(&[row("2026-08-08 10:00:00", "BTC", 1.0)]).unwrap();
        store.append(&[row("2026-08-08 10:00:30", "BTC", 2.0)]).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let headers = raw
            .lines()
            .filter(|l| l.starts_with("time,name,symbol,price,change,volume"))
            .count();
        assert_eq!(headers, 1);
        assert_eq!(raw.lines().count(), 3);
    }

    #[test]
    fn time_column_uses_wall_clock_format() {
        let (_dir, store) = temp_store();
        store.append(&[row("2026-08-08 10:05:07", "BTC", 1.0)]).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("2026-08-08 10:05:07"));
    }

    #[test]
    fn scan_missing_file_is_no_data() {
        let (_dir, store) = temp_store();
        assert!(matches!(store.scan(), Err(WatchError::NoData(_))));
        assert!(matches!(
            store.scan_by_symbol("BTC"),
            Err(WatchError::NoData(_))
        ));
    }

    #[test]
    fn scan_by_symbol_filters_case_insensitively_and_sorts() {
        let (_dir, store) = temp_store();
        store
            .append(&[
                row("2026-08-08 10:00:30", "BTC", 65100.0),
                row("2026-08-08 10:00:30", "ETH", 3190.0),
            ])
            .unwrap();
        // Out-of-order append does not happen in production (the clock is
        // monotonic), but the reader contract sorts regardless.
        store.append(&[row("2026-08-08 10:00:00", "BTC", 65000.0)]).unwrap();

        let btc = store.scan_by_symbol("btc").unwrap();
        assert_eq!(btc.len(), 2);
        assert!(btc[0].time < btc[1].time);
        assert!(btc.iter().all(|r| r.symbol == "BTC"));

        assert!(store.scan_by_symbol("DOGE").unwrap().is_empty());
    }
}
