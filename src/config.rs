//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::domain::ShardId;
use crate::host::HostSettings;
use crate::moderation::MessageRetention;

/// Top-level service configuration.
///
/// Loaded once at startup via [`HostServiceConfig::from_env`].
#[derive(Debug, Clone)]
pub struct HostServiceConfig {
    /// Socket address the admin API binds to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Directory holding one `<tenant-id>.json` record per tenant.
    pub hosts_root: PathBuf,

    /// Identifier of the shard this process serves.
    pub shard_id: ShardId,

    /// Pending events each host may queue before new ones are rejected.
    pub host_queue_capacity: usize,

    /// Days of messages deleted on ban (0..=7).
    pub ban_delete_message_days: u8,

    /// Command prefix used when a tenant has none configured.
    pub default_prefix: String,
}

impl HostServiceConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is missing or invalid.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let hosts_root = std::env::var("HOSTS_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/hosts"));

        let shard_id = ShardId::new(parse_env("SHARD_ID", 0));
        let host_queue_capacity = parse_env("HOST_QUEUE_CAPACITY", 1_024);
        let ban_delete_message_days =
            MessageRetention::days(parse_env("BAN_DELETE_MESSAGE_DAYS", 0)).get();

        let default_prefix = std::env::var("COMMAND_PREFIX_DEFAULT")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| "_".to_string());

        Ok(Self {
            listen_addr,
            hosts_root,
            shard_id,
            host_queue_capacity,
            ban_delete_message_days,
            default_prefix,
        })
    }

    /// Host settings derived from this configuration.
    #[must_use]
    pub fn host_settings(&self) -> HostSettings {
        HostSettings {
            default_prefix: self.default_prefix.clone(),
            ban_retention: MessageRetention::days(self.ban_delete_message_days),
        }
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
