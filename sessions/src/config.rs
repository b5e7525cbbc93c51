use sepolia_domain::{ChainId, SEPOLIA};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for the synchronizer and the provider it derives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// A committed chain different from this one raises a warning.
    pub expected_chain: ChainId,
    pub receipt_poll_ms: u64,
    pub confirmation_timeout_secs: u64,
    /// Only used by [`crate::HttpExtension::spawn_watcher`].
    pub watcher_poll_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            expected_chain: SEPOLIA,
            receipt_poll_ms: 500,
            confirmation_timeout_secs: 120,
            watcher_poll_ms: 1000,
        }
    }
}

impl SyncConfig {
    pub const fn receipt_poll(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub const fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub const fn watcher_poll(&self) -> Duration {
        Duration::from_millis(self.watcher_poll_ms)
    }
}
