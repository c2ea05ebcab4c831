//! Ledger configuration

use serde::{Deserialize, Serialize};

/// Configuration for the audit ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Hash-chain every event and verify the chain on demand
    #[serde(default = "default_true")]
    pub enable_crypto_verification: bool,

    /// Record data lineage through the provenance graph
    #[serde(default = "default_true")]
    pub enable_provenance_tracking: bool,

    /// Maximum number of events retained in memory (oldest evicted first)
    #[serde(default = "default_max_log_size")]
    pub max_log_size: usize,

    /// Age in days after which events are pruned by the retention policy
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Optional endpoint receiving every event as a JSON POST
    #[serde(default)]
    pub central_endpoint: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            enable_crypto_verification: true,
            enable_provenance_tracking: true,
            max_log_size: default_max_log_size(),
            retention_days: default_retention_days(),
            central_endpoint: None,
        }
    }
}

impl LedgerConfig {
    /// Set the in-memory cap
    pub fn with_max_log_size(mut self, max_log_size: usize) -> Self {
        self.max_log_size = max_log_size;
        self
    }

    /// Set the retention period
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    /// Set the central endpoint
    pub fn with_central_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.central_endpoint = Some(endpoint.into());
        self
    }

    /// Disable hash chaining
    pub fn without_crypto_verification(mut self) -> Self {
        self.enable_crypto_verification = false;
        self
    }
}

fn default_true() -> bool {
    true
}

fn default_max_log_size() -> usize {
    10_000
}

fn default_retention_days() -> u32 {
    90
}
