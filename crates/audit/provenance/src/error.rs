use audit_ledger::LedgerError;

/// Provenance errors
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

pub type ProvenanceResult<T> = Result<T, ProvenanceError>;
