pub mod broadcast;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::StreamExt;
use futures::SinkExt;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::db::pool::DbPool;
use crate::db::samples;
use crate::error::FeedError;
use crate::indicators;
use crate::message;
use crate::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let guard = state.feed.register();
    tracing::info!("viewer connected ({} live)", state.feed.viewer_count());

    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the snapshot query so a row broadcast while the
    // snapshot is being built is not lost to this viewer.
    let mut rx = state.feed.subscribe();

    // One-shot snapshot of the latest row so the chart has something to
    // render immediately.
    let snapshot = match &state.pool {
        Some(pool) => snapshot_payload(pool),
        None => Err(FeedError::Db("price db not available".to_string())),
    };
    let text = match snapshot {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("snapshot query failed: {e}");
            message::query_error_payload()
        }
    };
    if sender.send(Message::Text(text.into())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = rx.recv() => {
                match update {
                    Ok(payload) => {
                        if sender.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("viewer lagging, dropped {skipped} updates");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Viewers only listen; anything else they send is ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    drop(guard);
    tracing::info!("viewer disconnected ({} live)", state.feed.viewer_count());
}

/// Build the snapshot sent to a newly-accepted connection: the latest row,
/// enriched over the trailing window, or the no-data payload when the table
/// is empty.
pub fn snapshot_payload(pool: &DbPool) -> Result<String, FeedError> {
    let conn = pool.get()?;
    let rows = samples::fetch_latest(&conn, indicators::WINDOW as u32)?;
    match rows.last() {
        None => Ok(message::no_data_payload()),
        Some(latest) => {
            let closes: Vec<f64> = rows.iter().map(|r| r.close_price).collect();
            let enriched = indicators::annotate(latest, &closes);
            Ok(serde_json::to_string(&enriched)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::open_memory_pool;
    use crate::db::samples::test_support::{create_table, insert_row};
    use serde_json::Value;

    fn seeded_pool(n: i64) -> DbPool {
        let pool = open_memory_pool();
        {
            let conn = pool.get().unwrap();
            create_table(&conn);
            for t in 1..=n {
                insert_row(&conn, t, t as f64);
            }
        }
        pool
    }

    #[test]
    fn empty_table_yields_the_no_data_payload() {
        let pool = seeded_pool(0);
        let text = snapshot_payload(&pool).unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["error"], "No data available");
    }

    #[test]
    fn nineteen_rows_yield_a_bare_sample() {
        let pool = seeded_pool(19);
        let text = snapshot_payload(&pool).unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["time"], 19);
        assert_eq!(v["close_price"], 19.0);
        assert!(v.get("sma_20").is_none());
        assert!(v.get("error").is_none());
    }

    #[test]
    fn twenty_rows_yield_an_enriched_sample() {
        let pool = seeded_pool(20);
        let text = snapshot_payload(&pool).unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["time"], 20);
        assert_eq!(v["sma_20"], 10.5);
        assert_eq!(v["bb_middle"], 10.5);
        assert!(v.get("macd").is_some());
        assert!(v.get("rsi").is_some());
    }

    #[test]
    fn snapshot_windows_over_the_latest_twenty_only() {
        let pool = seeded_pool(25);
        let text = snapshot_payload(&pool).unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["time"], 25);
        // closes 6..=25 → mean 15.5
        assert_eq!(v["sma_20"], 15.5);
    }
}
