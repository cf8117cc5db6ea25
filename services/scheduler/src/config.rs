//! Service configuration (env-driven).

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use classroom_reconcile::DEFAULT_RECONCILE_INTERVAL;

/// Longest accepted pass interval; larger values are clamped down to it.
pub const MAX_RECONCILE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address.
    pub listen_addr: SocketAddr,

    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Time between reconciliation passes.
    pub reconcile_interval: Duration,

    /// Optional JSON file with the initial sessions and rooms.
    pub inventory_path: Option<PathBuf>,

    /// How long to wait for the worker and server on shutdown.
    pub shutdown_timeout: Duration,
}

impl Config {
    /// Load configuration from `CLASSROOM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let listen_addr = lookup("CLASSROOM_LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .context("CLASSROOM_LISTEN_ADDR must be a socket address (host:port).")?;

        let log_level = lookup("CLASSROOM_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let reconcile_interval = lookup("CLASSROOM_RECONCILE_INTERVAL_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("CLASSROOM_RECONCILE_INTERVAL_SECS must be an integer (seconds).")?
            .map(|secs| secs.clamp(1, MAX_RECONCILE_INTERVAL.as_secs()))
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RECONCILE_INTERVAL);

        let inventory_path = lookup("CLASSROOM_INVENTORY_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let shutdown_timeout_secs: u64 = lookup("CLASSROOM_SHUTDOWN_TIMEOUT_SECS")
            .map(|v| v.parse())
            .transpose()
            .context("CLASSROOM_SHUTDOWN_TIMEOUT_SECS must be an integer (seconds).")?
            .unwrap_or(10);

        Ok(Self {
            listen_addr,
            log_level,
            reconcile_interval,
            inventory_path,
            shutdown_timeout: Duration::from_secs(shutdown_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.reconcile_interval, Duration::from_secs(60));
        assert!(config.inventory_path.is_none());
        assert_eq!(config.shutdown_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CLASSROOM_LISTEN_ADDR", "0.0.0.0:9000"),
            ("CLASSROOM_RECONCILE_INTERVAL_SECS", "15"),
            ("CLASSROOM_INVENTORY_PATH", "/etc/classroom/inventory.json"),
        ])
        .unwrap();
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.reconcile_interval, Duration::from_secs(15));
        assert_eq!(
            config.inventory_path,
            Some(PathBuf::from("/etc/classroom/inventory.json"))
        );
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = load(&[("CLASSROOM_RECONCILE_INTERVAL_SECS", "0")]).unwrap();
        assert_eq!(config.reconcile_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_huge_interval_is_clamped() {
        let huge = u64::MAX.to_string();
        let config = load(&[("CLASSROOM_RECONCILE_INTERVAL_SECS", huge.as_str())]).unwrap();
        assert_eq!(config.reconcile_interval, MAX_RECONCILE_INTERVAL);
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(load(&[("CLASSROOM_LISTEN_ADDR", "nowhere")]).is_err());
        assert!(load(&[("CLASSROOM_RECONCILE_INTERVAL_SECS", "soon")]).is_err());
    }
}
