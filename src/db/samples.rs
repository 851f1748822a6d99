use rusqlite::{params, Connection};

use crate::error::FeedError;

/// One OHLC row from `stocks_real_time`.  Written by the ingest job,
/// read-only here.  `time` is a unix timestamp in seconds, unique and
/// strictly increasing across the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSample {
    pub time: i64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
}

const COLUMNS: &str = "time, open_price, high_price, low_price, close_price";

fn row_to_sample(row: &rusqlite::Row<'_>) -> rusqlite::Result<PriceSample> {
    Ok(PriceSample {
        time: row.get(0)?,
        open_price: row.get(1)?,
        high_price: row.get(2)?,
        low_price: row.get(3)?,
        close_price: row.get(4)?,
    })
}

/// Fetch the most recent `limit` samples in chronological order.
///
/// The query runs newest-first so the LIMIT picks the tail of the table,
/// then the result is reversed to oldest-first for windowed computation.
pub fn fetch_latest(conn: &Connection, limit: u32) -> Result<Vec<PriceSample>, FeedError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM stocks_real_time ORDER BY time DESC LIMIT ?"
    ))?;
    let mut samples: Vec<PriceSample> = stmt
        .query_map(params![limit], row_to_sample)?
        .collect::<Result<Vec<_>, _>>()?;
    samples.reverse();
    Ok(samples)
}

/// Fetch every sample strictly after `time`, oldest first.
pub fn fetch_after(conn: &Connection, time: i64) -> Result<Vec<PriceSample>, FeedError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM stocks_real_time WHERE time > ? ORDER BY time ASC"
    ))?;
    let samples = stmt
        .query_map(params![time], row_to_sample)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(samples)
}

/// Fetch the whole table, oldest first.  Used on the first tick after a
/// restart, when no cursor exists yet.
pub fn fetch_all(conn: &Connection) -> Result<Vec<PriceSample>, FeedError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM stocks_real_time ORDER BY time ASC"
    ))?;
    let samples = stmt
        .query_map([], row_to_sample)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(samples)
}
