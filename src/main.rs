use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use coinwatch::capture;
use coinwatch::config::WatchConfig;
use coinwatch::routes;
use coinwatch::state::AppState;

#[tokio::main]
async fn main() {
    // Initialise tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = WatchConfig::from_env();
    let bind = cfg.bind.clone();
    let port = cfg.port;
    let static_dir = cfg.static_dir.clone();

    let state = AppState::new(cfg);

    // Start the background market-snapshot loop.
    spawn_capture_loop(Arc::clone(&state));

    // Static file serving: the dashboard page lives in static/.
    let app = Router::new()
        .merge(routes::api_router())
        .route("/health", axum::routing::get(health))
        .fallback_service(ServeDir::new(&static_dir).append_index_html_on_directories(true))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .expect("invalid bind address");

    tracing::info!("coinwatch hub listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("serve");
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, gracefully stopping…");
}

/// Background task: capture a market snapshot on a fixed interval.
///
/// This loop is the sole writer of the history log and the sole caller of
/// `capture`; request handlers only ever read the cache and the log.
fn spawn_capture_loop(state: Arc<AppState>) {
    let every = Duration::from_secs(state.config.fetch_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let rows = capture::capture(&state).await;
            tracing::debug!(rows = rows.len(), "capture cycle complete");
        }
    });
}
