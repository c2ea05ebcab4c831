//! Hash commitments over JSON payloads

use crate::error::ZkpResult;
use audit_crypto::{generate_id, generate_nonce, HashPrimitive};
use audit_ledger::{EventCategory, EventFields, Ledger};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Descriptive context stored with a commitment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommitmentMetadata {
    pub data_type: Option<String>,
    pub operation: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

/// A stored commitment.
///
/// The nonce lives next to the commitment value, so anyone who can read the
/// store can open it. The commitment binds but does not hide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commitment {
    pub commitment_id: String,
    pub commitment_value: String,
    pub timestamp: DateTime<Utc>,
    pub nonce: String,
    pub data_hash: String,
    pub metadata: CommitmentMetadata,
}

/// What `commit` hands back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentReceipt {
    pub commitment_id: String,
    pub commitment_value: String,
    pub timestamp: DateTime<Utc>,
}

pub struct CommitmentStore {
    ledger: Arc<Ledger>,
    hasher: Arc<dyn HashPrimitive>,
    commitments: RwLock<HashMap<String, Commitment>>,
}

impl CommitmentStore {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        let hasher = ledger.hasher();
        Self {
            ledger,
            hasher,
            commitments: RwLock::new(HashMap::new()),
        }
    }

    /// Commit to `payload`: `commitmentValue = H(json ‖ nonce)`, `dataHash = H(json)`.
    pub async fn commit(
        &self,
        payload: &Value,
        metadata: CommitmentMetadata,
    ) -> ZkpResult<CommitmentReceipt> {
        let serialized = serde_json::to_string(payload)?;
        let nonce = generate_nonce();

        let commitment = Commitment {
            commitment_id: generate_id("commit"),
            commitment_value: self.hasher.combine(&serialized, &nonce),
            timestamp: Utc::now(),
            nonce,
            data_hash: self.hasher.digest_str(&serialized),
            metadata,
        };
        let receipt = CommitmentReceipt {
            commitment_id: commitment.commitment_id.clone(),
            commitment_value: commitment.commitment_value.clone(),
            timestamp: commitment.timestamp,
        };

        let fields = EventFields::new("zkp_commitment_created")
            .action("create_commitment")
            .resource(commitment.commitment_id.as_str())
            .maybe_user(commitment.metadata.user_id.clone())
            .maybe_session(commitment.metadata.session_id.clone())
            .metadata(json!({
                "commitmentId": commitment.commitment_id,
                "dataType": commitment.metadata.data_type,
            }));

        self.commitments
            .write()
            .insert(commitment.commitment_id.clone(), commitment);
        self.ledger.append(EventCategory::Security, fields).await?;

        debug!(commitment_id = %receipt.commitment_id, "commitment created");
        Ok(receipt)
    }

    /// Stored commitment by id
    pub fn get(&self, commitment_id: &str) -> Option<Commitment> {
        self.commitments.read().get(commitment_id).cloned()
    }

    /// Whether any stored commitment has this value
    pub fn exists(&self, commitment_value: &str) -> bool {
        self.commitments
            .read()
            .values()
            .any(|c| c.commitment_value == commitment_value)
    }

    pub fn len(&self) -> usize {
        self.commitments.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commitments.read().is_empty()
    }
}
