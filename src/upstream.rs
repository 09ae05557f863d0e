use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Failure talking to the market-data provider.
///
/// Callers choose the degradation policy: the capture loop falls back to
/// the last snapshot, the history feed to an empty series. Nothing here is
/// ever surfaced as an HTTP error.
#[derive(Debug)]
pub enum UpstreamError {
    Request(String),
    Status(StatusCode),
    Decode(String),
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request(msg) => write!(f, "request failed: {msg}"),
            Self::Status(code) => write!(f, "unexpected status: {code}"),
            Self::Decode(msg) => write!(f, "bad payload: {msg}"),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// One asset from the markets-listing endpoint. Optional numeric fields are
/// routinely null upstream (freshly listed coins); defaulting happens at
/// normalization, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketQuote {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
}

/// Market-chart endpoint payload: `{"prices": [[ts_ms, price], ...]}`.
#[derive(Debug, Default, Deserialize)]
pub struct ChartPayload {
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
}

/// HTTP client for the market-data provider, with a bounded timeout on
/// every request.
pub struct MarketDataClient {
    http: Client,
    base_url: String,
}

impl MarketDataClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = Client::builder()
            .user_agent("coinwatch-hub")
            .timeout(timeout)
            .build()
            .expect("build http client");
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Current top-N assets by market capitalization, quoted in USD.
    pub async fn markets(&self, top_n: u32) -> Result<Vec<MarketQuote>, UpstreamError> {
        let url = format!("{}/coins/markets", self.base_url);
        let per_page = top_n.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(UpstreamError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }

    /// Daily price history for one asset over the last `days` days.
    pub async fn market_chart(&self, asset: &str, days: u32) -> Result<ChartPayload, UpstreamError> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, asset);
        let days = days.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("days", days.as_str()),
                ("interval", "daily"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(UpstreamError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }
}
