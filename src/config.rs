//! Tracker configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`). Unset or unparsable values fall back to defaults.

use std::net::SocketAddr;
use std::time::Duration;

/// Top-level tracker configuration.
///
/// Loaded once at startup via [`TrackerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// SQLite connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// URL of the server directory listing.
    pub server_list_url: String,

    /// Timeout in seconds for one listing request.
    pub fetch_timeout_secs: u64,

    /// Seconds between poll cycles.
    pub update_interval_secs: u64,

    /// Minimum seconds between archived snapshots.
    pub snapshot_interval_secs: u64,

    /// Chat webhook for event notifications. Notifications are disabled
    /// when unset.
    pub webhook_url: Option<String>,

    /// Chat webhook for per-subscriber alerts. Alerts are disabled when
    /// unset.
    pub alert_webhook_url: Option<String>,

    /// Display name used for webhook messages.
    pub webhook_username: String,

    /// Pause in milliseconds after each dispatched event.
    pub notify_delay_ms: u64,

    /// Whether events of the first poll cycle are dispatched.
    pub notify_on_first_cycle: bool,
}

impl TrackerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as a
    /// [`SocketAddr`], or if `UPDATE_INTERVAL_SECS` is zero.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://minestalker.db?mode=rwc".to_string());
        let database_max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 5);
        let database_connect_timeout_secs = parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5);

        let server_list_url = std::env::var("SERVER_LIST_URL")
            .unwrap_or_else(|_| "https://servers.minetest.net/list".to_string());
        let fetch_timeout_secs = parse_env("FETCH_TIMEOUT_SECS", 10);

        let update_interval_secs = parse_env("UPDATE_INTERVAL_SECS", 60);
        if update_interval_secs == 0 {
            return Err("UPDATE_INTERVAL_SECS must be greater than zero".into());
        }
        let snapshot_interval_secs = parse_env("SNAPSHOT_INTERVAL_SECS", 300);

        let webhook_url = std::env::var("WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let alert_webhook_url = std::env::var("ALERT_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let webhook_username =
            std::env::var("WEBHOOK_USERNAME").unwrap_or_else(|_| "MineStalker".to_string());
        let notify_delay_ms = parse_env("NOTIFY_DELAY_MS", 100);
        let notify_on_first_cycle = parse_env_bool("NOTIFY_ON_FIRST_CYCLE", false);

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections,
            database_connect_timeout_secs,
            server_list_url,
            fetch_timeout_secs,
            update_interval_secs,
            snapshot_interval_secs,
            webhook_url,
            alert_webhook_url,
            webhook_username,
            notify_delay_ms,
            notify_on_first_cycle,
        })
    }

    /// Poll cycle period.
    #[must_use]
    pub const fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    /// Snapshot archive gate.
    #[must_use]
    pub const fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_secs)
    }

    /// Listing request timeout.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Database acquire timeout.
    #[must_use]
    pub const fn database_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.database_connect_timeout_secs)
    }

    /// Pause after each dispatched event.
    #[must_use]
    pub const fn notify_delay(&self) -> Duration {
        Duration::from_millis(self.notify_delay_ms)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    parse_bool(std::env::var(key).ok().as_deref()).unwrap_or(default)
}

fn parse_bool(value: Option<&str>) -> Option<bool> {
    let value = value?.trim();
    if value == "1" || value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value == "0" || value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
