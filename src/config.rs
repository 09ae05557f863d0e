use std::env;
use std::path::PathBuf;

/// Service configuration derived from environment variables.
///
/// Every variable has a default so the binary runs with an empty
/// environment; unparseable values silently fall back to the default.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub bind: String,
    pub port: u16,

    /// Append-only history log (CSV). Created on the first successful fetch.
    pub data_file: PathBuf,
    /// Directory holding the dashboard page and other static assets.
    pub static_dir: PathBuf,

    /// How many assets (by market cap) each capture requests.
    pub top_n: u32,
    /// Seconds between background captures.
    pub fetch_interval_secs: u64,

    /// Base URL of the market-data provider API.
    pub upstream_url: String,
    /// Per-request network timeout, seconds.
    pub request_timeout_secs: u64,

    /// Asset id for the daily price-history feed.
    pub history_asset: String,
    pub history_days: u32,
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_path(name: &str, default: &str) -> PathBuf {
    PathBuf::from(env_str(name, default))
}

impl WatchConfig {
    pub fn from_env() -> Self {
        Self {
            bind: env_str("COINWATCH_BIND", "127.0.0.1"),
            port: env_u16("COINWATCH_PORT", 8099),
            data_file: env_path("COINWATCH_DATA_FILE", "crypto_data.csv"),
            static_dir: env_path("COINWATCH_STATIC_DIR", "static"),
            top_n: env_u32("COINWATCH_TOP_N", 5),
            fetch_interval_secs: env_u64("COINWATCH_FETCH_INTERVAL_SECS", 30),
            upstream_url: env_str("COINWATCH_UPSTREAM_URL", "https://api.coingecko.com/api/v3"),
            request_timeout_secs: env_u64("COINWATCH_REQUEST_TIMEOUT_SECS", 10),
            history_asset: env_str("COINWATCH_HISTORY_ASSET", "bitcoin"),
            history_days: env_u32("COINWATCH_HISTORY_DAYS", 7),
        }
    }
}
