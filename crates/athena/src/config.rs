use std::time::Duration;

use serde::{Deserialize, Serialize};

use scifi_core::{AwsCredentials, Config};

/// Exponential-backoff settings for completion polling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollSettings {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_factor: f64,
    /// Upper bound (exclusive) of the random-ish jitter added to each sleep.
    pub jitter_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: 200,
            max_delay_ms: 2000,
            backoff_factor: 1.5,
            jitter_ms: 100,
        }
    }
}

impl PollSettings {
    /// Delay to use after `current_ms`, capped at `max_delay_ms`.
    pub fn next_delay_ms(&self, current_ms: u64) -> u64 {
        ((current_ms as f64 * self.backoff_factor) as u64).min(self.max_delay_ms)
    }
}

/// Client-side settings for the Athena connection.
///
/// Derived from the top-level [`Config`]: the region is taken from the
/// pipeline parameters, the key pair (if any) from the connection profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthenaConfig {
    /// AWS region for Athena queries.
    pub region: String,
    /// Data catalog used for metadata lookups.
    pub catalog: String,
    /// Completion wait in seconds; 0 waits until the query finishes.
    pub timeout_seconds: u32,
    /// Custom endpoint (LocalStack and friends).
    pub endpoint_url: Option<String>,
    pub poll: PollSettings,
    #[serde(skip)]
    pub credentials: Option<AwsCredentials>,
}

impl AthenaConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            region: config.params.region.clone(),
            catalog: config.catalog.clone(),
            timeout_seconds: config.timeout_seconds,
            endpoint_url: config.endpoint_url.clone(),
            poll: PollSettings::default(),
            credentials: config.credentials.clone(),
        }
    }

    /// `None` when the wait is unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds as u64))
    }

    /// `true` when an explicit key pair replaces the default provider chain.
    pub fn uses_static_credentials(&self) -> bool {
        self.credentials.is_some()
    }
}

// ── Tests ────────────────────────────────────────────────────────
