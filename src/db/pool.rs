use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Create a read-only SQLite connection pool for the price-sample database.
///
/// Returns `None` if the file does not exist (non-fatal — the ingest job
/// that writes `stocks_real_time` may not have produced it yet).
pub fn open_ro_pool(path: &Path, max_size: u32) -> Option<DbPool> {
    if !path.exists() {
        tracing::warn!("price db not found: {}", path.display());
        return None;
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_NO_MUTEX
        | OpenFlags::SQLITE_OPEN_URI;
    let manager = SqliteConnectionManager::file(path).with_flags(flags);
    match Pool::builder().max_size(max_size).build(manager) {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::error!("failed to create db pool for {}: {e}", path.display());
            None
        }
    }
}

/// In-memory pool, used by the test suites: capped at one connection so
/// every `get()` sees the same database.
pub fn open_memory_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory();
    Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("in-memory pool")
}
