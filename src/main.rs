use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use chart_hub::config::HubConfig;
use chart_hub::db::samples;
use chart_hub::error::FeedError;
use chart_hub::poller::Poller;
use chart_hub::state::AppState;
use chart_hub::ws;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = HubConfig::from_env();
    let bind = cfg.bind.clone();
    let port = cfg.port;
    let poll_interval = Duration::from_secs(cfg.poll_interval_s);

    let state = AppState::new(cfg);

    // Background poll loop: new rows → indicators → fan-out.
    match &state.pool {
        Some(pool) => {
            let poller = Poller::new(pool.clone(), state.feed.clone());
            tokio::spawn(poller.run(poll_interval));
        }
        None => tracing::warn!("price db missing, streaming disabled"),
    }

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/history", get(api_history))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{bind}:{port}")
        .parse()
        .expect("invalid bind address");

    tracing::info!("chart hub listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn root() -> &'static str {
    "Chart Hub API Running"
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    200
}

/// Most recent rows, ascending and unenriched, for seeding a fresh chart.
async fn api_history(
    State(state): State<Arc<AppState>>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<serde_json::Value>, FeedError> {
    let pool = state
        .pool
        .as_ref()
        .ok_or_else(|| FeedError::Db("price db not available".to_string()))?;
    let conn = pool.get()?;
    let rows = samples::fetch_latest(&conn, q.limit.min(1000))?;

    let out: Vec<serde_json::Value> = rows
        .iter()
        .map(|r| {
            json!({
                "time": r.time,
                "open_price": r.open_price,
                "high_price": r.high_price,
                "low_price": r.low_price,
                "close_price": r.close_price,
            })
        })
        .collect();
    Ok(Json(json!({ "rows": out })))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received, stopping");
}
