use audit_ledger::LedgerError;

/// Commitment, proof and attestation errors.
///
/// Integrity failures are never errors: a proof that fails its checks is a
/// successful verification with `verified == false`.
#[derive(Debug, thiserror::Error)]
pub enum ZkpError {
    #[error("Input commitment not found: {0}")]
    CommitmentNotFound(String),

    #[error("Proof not found: {0}")]
    ProofNotFound(String),

    #[error("{0} is disabled")]
    Disabled(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

pub type ZkpResult<T> = Result<T, ZkpError>;
