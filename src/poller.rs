use std::time::Duration;

use crate::db::pool::DbPool;
use crate::db::samples::{self, PriceSample};
use crate::error::FeedError;
use crate::indicators::{self, RingBuf};
use crate::ws::broadcast::FeedHub;

/// Watermark separating already-broadcast rows from pending ones.
///
/// Advanced only by the poll loop, strictly increasing, never persisted: a
/// process restart starts from `None` and replays the table to whoever is
/// connected on the next tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor(Option<i64>);

impl Cursor {
    pub fn new() -> Self {
        Self(None)
    }

    pub fn current(&self) -> Option<i64> {
        self.0
    }

    /// Advance to `time`.  The poll loop only ever calls this with times
    /// taken in order from an ascending query, so `time` is strictly greater
    /// than the current watermark.
    pub fn advance(&mut self, time: i64) {
        debug_assert!(self.0.map_or(true, |cur| time > cur));
        self.0 = Some(time);
    }
}

/// Timer-driven drain of unseen rows: query, enrich, broadcast, advance.
///
/// The interval loop awaits each drain inline, so a drain that outlives the
/// poll interval delays the next tick instead of overlapping it — two ticks
/// can never broadcast the same row range.
pub struct Poller {
    pool: DbPool,
    feed: FeedHub,
    cursor: Cursor,
    window: RingBuf,
}

impl Poller {
    pub fn new(pool: DbPool, feed: FeedHub) -> Self {
        Self {
            pool,
            feed,
            cursor: Cursor::new(),
            window: RingBuf::new(indicators::WINDOW),
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// One tick: fetch rows past the cursor (the whole table when no cursor
    /// exists yet) and broadcast each in ascending time order.
    ///
    /// Returns the number of rows broadcast.  On error the cursor is left
    /// where the last successful row put it, so the next tick re-fetches
    /// anything unconfirmed — at-least-once, never at-most-once.
    pub fn drain(&mut self) -> Result<usize, FeedError> {
        let conn = self.pool.get()?;
        let rows = match self.cursor.current() {
            Some(t) => samples::fetch_after(&conn, t)?,
            None => samples::fetch_all(&conn)?,
        };
        drop(conn);

        let mut sent = 0;
        for row in &rows {
            self.broadcast_row(row)?;
            sent += 1;
        }
        Ok(sent)
    }

    /// Enrich one row with the window ending at that row, publish it, then
    /// advance the cursor.  Individual viewer send failures are absorbed by
    /// the fan-out channel and never reach this path.
    fn broadcast_row(&mut self, row: &PriceSample) -> Result<(), FeedError> {
        self.window.push(row.close_price);
        let closes = self.window.to_vec();
        let enriched = indicators::annotate(row, &closes);
        // Serialize once; every viewer gets the identical payload.
        let payload = serde_json::to_string(&enriched)?;
        let reached = self.feed.publish(payload);
        self.cursor.advance(row.time);
        tracing::debug!(time = row.time, viewers = reached, "broadcast row");
        Ok(())
    }

    /// Run forever on a fixed cadence.  Query failures are logged and the
    /// tick is skipped; the next tick retries from the unchanged cursor.
    pub async fn run(mut self, poll_interval: Duration) {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match self.drain() {
                Ok(0) => {}
                Ok(n) => tracing::debug!("tick broadcast {n} rows"),
                Err(e) => tracing::warn!("tick failed, will retry: {e}"),
            }
        }
    }
}
