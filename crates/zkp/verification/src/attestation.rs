//! End-to-end attestation: commit, prove, verify, summarize

use crate::commitment::{CommitmentMetadata, CommitmentStore};
use crate::config::ZkpConfig;
use crate::error::ZkpResult;
use crate::proof::{ComputationRequest, ProofEngine};
use crate::verify::VerificationEngine;
use audit_crypto::generate_id;
use audit_ledger::{EventCategory, EventFields, Ledger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// A computation to attest, as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputationDescriptor {
    pub input_data: Value,
    pub output_data: Value,
    pub function: String,
    pub parameters: Value,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub computation_type: Option<String>,
    pub data_type: Option<String>,
    pub operation: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

/// Shape of a computation's output with every value withheld
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputSummary {
    #[serde(rename_all = "camelCase")]
    Structured {
        fields: Vec<String>,
        field_count: usize,
        has_numerical_data: bool,
        has_text_data: bool,
    },
    Scalar {
        #[serde(rename = "type")]
        value_type: String,
    },
}

impl OutputSummary {
    /// Summarize top-level members of an object or array; name the type of anything else.
    pub fn of(output: &Value) -> Self {
        let members: Vec<(String, &Value)> = match output {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            Value::Null => return Self::scalar("null"),
            Value::Bool(_) => return Self::scalar("boolean"),
            Value::Number(_) => return Self::scalar("number"),
            Value::String(_) => return Self::scalar("string"),
        };

        Self::Structured {
            field_count: members.len(),
            has_numerical_data: members.iter().any(|(_, v)| v.is_number()),
            has_text_data: members.iter().any(|(_, v)| v.is_string()),
            fields: members.into_iter().map(|(k, _)| k).collect(),
        }
    }

    fn scalar(value_type: &str) -> Self {
        Self::Scalar {
            value_type: value_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestedComputation {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub computation_type: Option<String>,
    pub output_summary: OutputSummary,
}

/// Shareable statement that a computation was verified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub attestation_id: String,
    pub timestamp: DateTime<Utc>,
    pub commitment_id: String,
    pub proof_id: String,
    pub verification_id: String,
    pub verified: bool,
    pub computation: AttestedComputation,
    pub message: String,
}

/// Drives commitment, proof and verification for one computation
pub struct AttestationCoordinator {
    ledger: Arc<Ledger>,
    commitments: Arc<CommitmentStore>,
    proofs: Arc<ProofEngine>,
    verifier: VerificationEngine,
}

impl AttestationCoordinator {
    pub fn new(ledger: Arc<Ledger>, config: ZkpConfig) -> Self {
        let commitments = Arc::new(CommitmentStore::new(Arc::clone(&ledger)));
        let proofs = Arc::new(ProofEngine::new(
            Arc::clone(&ledger),
            Arc::clone(&commitments),
            config.clone(),
        ));
        let verifier = VerificationEngine::new(Arc::clone(&ledger), Arc::clone(&proofs), config);
        Self {
            ledger,
            commitments,
            proofs,
            verifier,
        }
    }

    pub fn commitments(&self) -> &CommitmentStore {
        &self.commitments
    }

    pub fn proofs(&self) -> &ProofEngine {
        &self.proofs
    }

    pub fn verifier(&self) -> &VerificationEngine {
        &self.verifier
    }

    /// Attest a computation. Any failing stage aborts the whole attestation.
    pub async fn attest(&self, computation: ComputationDescriptor) -> ZkpResult<Attestation> {
        let commitment = self
            .commitments
            .commit(
                &computation.input_data,
                CommitmentMetadata {
                    data_type: computation.data_type.clone(),
                    operation: computation.operation.clone(),
                    user_id: computation.user_id.clone(),
                    session_id: computation.session_id.clone(),
                },
            )
            .await?;

        let proof = self
            .proofs
            .prove_computation(ComputationRequest {
                input_commitment_id: commitment.commitment_id.clone(),
                output_data: computation.output_data.clone(),
                computation_function: computation.function.clone(),
                parameters: computation.parameters.clone(),
                user_id: computation.user_id.clone(),
                session_id: computation.session_id.clone(),
                name: computation.name.clone(),
                computation_type: computation.computation_type.clone(),
            })
            .await?;

        let verification = self.verifier.verify(&proof.proof_id, None).await?;

        let attestation = Attestation {
            attestation_id: generate_id("attest"),
            timestamp: Utc::now(),
            commitment_id: commitment.commitment_id,
            proof_id: proof.proof_id,
            verification_id: verification.verification_id,
            verified: verification.verified,
            computation: AttestedComputation {
                name: computation.name,
                computation_type: computation.computation_type,
                output_summary: OutputSummary::of(&computation.output_data),
            },
            message: if verification.verified {
                "Computation verified successfully without exposing private data".to_string()
            } else {
                "Computation verification failed".to_string()
            },
        };

        self.ledger
            .append(
                EventCategory::Computation,
                EventFields::new("zkp_attestation_generated")
                    .action("generate_attestation")
                    .resource(attestation.attestation_id.as_str())
                    .maybe_user(computation.user_id)
                    .maybe_session(computation.session_id)
                    .metadata(serde_json::to_value(&attestation)?),
            )
            .await?;

        info!(
            attestation_id = %attestation.attestation_id,
            verified = attestation.verified,
            "attestation generated"
        );
        Ok(attestation)
    }
}
