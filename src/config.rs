use std::env;
use std::path::PathBuf;

/// Hub configuration derived from environment variables.
///
/// `PORT` is honored as a fallback for `CHART_HUB_PORT` so the hub can run
/// behind the same process managers as the chart frontend expects.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub bind: String,
    pub port: u16,

    /// Path to the SQLite file holding the `stocks_real_time` table.
    pub db_path: PathBuf,

    /// Seconds between poll-loop ticks.
    pub poll_interval_s: u64,
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

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_path(name: &str, default: &str) -> PathBuf {
    PathBuf::from(env_str(name, default))
}

impl HubConfig {
    pub fn from_env() -> Self {
        Self {
            bind: env_str("CHART_HUB_BIND", "0.0.0.0"),
            port: env_u16("CHART_HUB_PORT", env_u16("PORT", 5000)),
            db_path: env_path("CHART_HUB_DB", "stocks.db"),
            poll_interval_s: env_u64("CHART_HUB_POLL_INTERVAL_S", 60).max(1),
        }
    }
}
