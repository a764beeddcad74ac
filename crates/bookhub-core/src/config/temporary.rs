//! Temporary credential configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Settings for the forgot-password temporary credential flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporaryCredentialConfig {
    /// Lifetime of an issued temporary password in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Number of characters in a generated temporary password.
    #[serde(default = "default_length")]
    pub length: usize,
    /// Interval between background sweeps of expired entries, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl TemporaryCredentialConfig {
    /// The TTL as a `chrono` duration.
    ///
    /// Zero and values outside chrono's range are configuration errors.
    pub fn ttl(&self) -> Result<chrono::Duration, AppError> {
        super::positive_duration(
            "temporary_credential.ttl_seconds",
            self.ttl_seconds,
            chrono::Duration::try_seconds,
        )
    }

    /// The sweep interval as a std duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }
}

impl Default for TemporaryCredentialConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            length: default_length(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_ttl() -> u64 {
    5 * 60
}

fn default_length() -> usize {
    8
}

fn default_sweep_interval() -> u64 {
    60
}
