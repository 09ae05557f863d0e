use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::WatchConfig;
use crate::store::{HistoryStore, SnapshotRow};
use crate::upstream::MarketDataClient;

/// Shared application state, passed to all route handlers via
/// `axum::extract::State` and to the background capture loop.
pub struct AppState {
    pub config: WatchConfig,
    pub upstream: MarketDataClient,
    pub store: HistoryStore,

    /// Most recent successfully fetched batch; empty until the first
    /// success, and the fallback served while upstream is down.
    pub last_snapshot: RwLock<Vec<SnapshotRow>>,
}

impl AppState {
    pub fn new(config: WatchConfig) -> Arc<Self> {
        let upstream = MarketDataClient::new(
            &config.upstream_url,
            Duration::from_secs(config.request_timeout_secs),
        );
        let store = HistoryStore::new(&config.data_file);
        Arc::new(Self {
            config,
            upstream,
            store,
            last_snapshot: RwLock::new(Vec::new()),
        })
    }
}
