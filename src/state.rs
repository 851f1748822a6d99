use std::sync::Arc;

use crate::config::HubConfig;
use crate::db::pool::{open_ro_pool, DbPool};
use crate::ws::broadcast::FeedHub;

/// Shared application state, passed to handlers via `axum::extract::State`.
pub struct AppState {
    pub config: HubConfig,
    pub feed: FeedHub,

    /// Read-only pool over the price db; `None` when the file does not
    /// exist yet, in which case viewers get an error payload on connect.
    pub pool: Option<DbPool>,
}

impl AppState {
    pub fn new(config: HubConfig) -> Arc<Self> {
        let pool = open_ro_pool(&config.db_path, 4);
        Arc::new(Self {
            config,
            feed: FeedHub::new(),
            pool,
        })
    }
}
