//! Error types for audit-ledger

use audit_store::StoreError;
use thiserror::Error;

/// Errors surfaced by ledger operations.
///
/// Integrity findings are never errors; they are reported as data by
/// [`crate::Ledger::verify`].
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Canonical serialization failed while hashing or encoding an event
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistence collaborator failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Network sink failure
    #[error("Sink error: {0}")]
    Sink(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
