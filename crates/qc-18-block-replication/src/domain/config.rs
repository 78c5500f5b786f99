//! Replication configuration.

use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::env;

/// Configuration for the block replication service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationConfig {
    /// When false, `create_block_replica` is a no-op.
    pub enabled: bool,

    /// Queue depth for bounded subscribers created by the service.
    pub channel_capacity: usize,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            log_level: "info".to_string(),
        }
    }
}

impl ReplicationConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_REPLICATION_ENABLED`: Produce replicas (default: true)
    /// - `QC_REPLICATION_CHANNEL_CAPACITY`: Bounded subscriber depth (default: 1000)
    /// - `QC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparseable values fall back
    /// to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default)
        };

        Self {
            enabled: flag("QC_REPLICATION_ENABLED", defaults.enabled),

            channel_capacity: lookup("QC_REPLICATION_CHANNEL_CAPACITY")
                .and_then(|v| v.parse().ok())
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.channel_capacity),

            log_level: lookup("QC_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}
