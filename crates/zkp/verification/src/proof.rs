//! Computation proofs

use crate::commitment::CommitmentStore;
use crate::config::ZkpConfig;
use crate::error::{ZkpError, ZkpResult};
use crate::merkle::merkle_root;
use crate::range::{generate_range_proofs, RangeProof};
use audit_crypto::{canonical_timestamp, generate_id, generate_nonce, HashPrimitive};
use audit_ledger::{EventCategory, EventFields, Ledger};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Proof kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofType {
    ComputationIntegrity,
    DataPrivacy,
    ModelExecution,
    ParameterCorrectness,
    RangeProof,
    MembershipProof,
}

impl ProofType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComputationIntegrity => "computation_integrity",
            Self::DataPrivacy => "data_privacy",
            Self::ModelExecution => "model_execution",
            Self::ParameterCorrectness => "parameter_correctness",
            Self::RangeProof => "range_proof",
            Self::MembershipProof => "membership_proof",
        }
    }
}

impl fmt::Display for ProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a proof. Only verification moves it off `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Failed,
    Invalid,
}

/// Fields a verifier sees and may compare against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicInputs {
    pub input_commitment: String,
    pub output_hash: String,
    pub function_id: String,
    pub parameter_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationStep {
    pub step: u32,
    pub operation: String,
    pub hash: String,
}

/// Step descriptors plus the Merkle root over their hashes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationSteps {
    pub steps: Vec<ComputationStep>,
    pub merkle_root: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// The fixed pipeline every computation proof describes
const PIPELINE: [&str; 4] = [
    "load_data",
    "validate_input",
    "execute_computation",
    "generate_output",
];

impl ComputationSteps {
    fn build(hasher: &dyn HashPrimitive) -> Self {
        let steps: Vec<ComputationStep> = PIPELINE
            .iter()
            .zip(1u32..)
            .map(|(operation, step)| ComputationStep {
                step,
                operation: operation.to_string(),
                hash: hasher.digest_str(&format!("step{step}")),
            })
            .collect();
        let hashes: Vec<String> = steps.iter().map(|s| s.hash.clone()).collect();

        Self {
            merkle_root: merkle_root(hasher, &hashes),
            steps,
            timestamp: Utc::now(),
        }
    }

    /// The stored root matches a root rebuilt from the step hashes
    pub fn verify(&self, hasher: &dyn HashPrimitive) -> bool {
        let hashes: Vec<String> = self.steps.iter().map(|s| s.hash.clone()).collect();
        merkle_root(hasher, &hashes) == self.merkle_root
    }
}

/// Commitment to the private witness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessCommitment {
    #[serde(default)]
    pub commitment: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl WitnessCommitment {
    pub fn is_complete(&self) -> bool {
        !self.commitment.is_empty() && self.timestamp.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofComponents {
    pub computation_steps: ComputationSteps,
    pub range_proofs: Vec<RangeProof>,
    pub witness_commitment: WitnessCommitment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofMetadata {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub computation_name: Option<String>,
    pub computation_type: Option<String>,
}

/// A stored proof. `status` is the only field that changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    pub proof_id: String,
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    pub timestamp: DateTime<Utc>,
    pub timestamp_ms: i64,
    pub public_inputs: PublicInputs,
    pub proof_components: ProofComponents,
    pub metadata: ProofMetadata,
    pub status: VerificationStatus,
    pub signature: String,
}

impl Proof {
    /// Verifier-facing view: no metadata, no status
    pub fn export(&self) -> ExportedProof {
        ExportedProof {
            proof_id: self.proof_id.clone(),
            proof_type: self.proof_type,
            timestamp: self.timestamp,
            public_inputs: self.public_inputs.clone(),
            proof_components: self.proof_components.clone(),
            signature: self.signature.clone(),
        }
    }
}

/// A proof as transported to a verifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedProof {
    pub proof_id: String,
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    pub timestamp: DateTime<Utc>,
    pub public_inputs: PublicInputs,
    pub proof_components: ProofComponents,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofReceipt {
    pub proof_id: String,
    pub proof: ExportedProof,
    pub status: VerificationStatus,
}

/// Inputs to `ProofEngine::prove_computation`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputationRequest {
    pub input_commitment_id: String,
    pub output_data: Value,
    pub computation_function: String,
    pub parameters: Value,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub computation_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedFields<'a> {
    proof_id: &'a str,
    #[serde(rename = "type")]
    proof_type: ProofType,
    timestamp: String,
    public_inputs: &'a PublicInputs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Witness<'a> {
    input_commitment_id: &'a str,
    computation_function: &'a str,
    parameters: &'a Value,
}

/// `H({proofId, type, timestamp, publicInputs})`
pub fn sign(
    hasher: &dyn HashPrimitive,
    proof_id: &str,
    proof_type: ProofType,
    timestamp: &DateTime<Utc>,
    public_inputs: &PublicInputs,
) -> ZkpResult<String> {
    let signed = SignedFields {
        proof_id,
        proof_type,
        timestamp: canonical_timestamp(timestamp),
        public_inputs,
    };
    Ok(hasher.digest_str(&serde_json::to_string(&signed)?))
}

/// Builds and stores computation proofs
pub struct ProofEngine {
    ledger: Arc<Ledger>,
    hasher: Arc<dyn HashPrimitive>,
    commitments: Arc<CommitmentStore>,
    config: ZkpConfig,
    proofs: RwLock<HashMap<String, Proof>>,
}

impl ProofEngine {
    pub fn new(ledger: Arc<Ledger>, commitments: Arc<CommitmentStore>, config: ZkpConfig) -> Self {
        let hasher = ledger.hasher();
        Self {
            ledger,
            hasher,
            commitments,
            config,
            proofs: RwLock::new(HashMap::new()),
        }
    }

    /// Prove that `request.output_data` came from the committed input.
    pub async fn prove_computation(&self, request: ComputationRequest) -> ZkpResult<ProofReceipt> {
        if !self.config.enable_proof_generation {
            return Err(ZkpError::Disabled("proof generation"));
        }

        let input = self
            .commitments
            .get(&request.input_commitment_id)
            .ok_or_else(|| ZkpError::CommitmentNotFound(request.input_commitment_id.clone()))?;

        let h = self.hasher.as_ref();
        let proof_id = generate_id("proof");
        let timestamp = Utc::now();

        let public_inputs = PublicInputs {
            input_commitment: input.commitment_value,
            output_hash: h.digest_str(&serde_json::to_string(&request.output_data)?),
            function_id: h.digest_str(&request.computation_function),
            parameter_hash: h.digest_str(&serde_json::to_string(&request.parameters)?),
        };

        let witness = serde_json::to_string(&Witness {
            input_commitment_id: &request.input_commitment_id,
            computation_function: &request.computation_function,
            parameters: &request.parameters,
        })?;
        let proof_components = ProofComponents {
            computation_steps: ComputationSteps::build(h),
            range_proofs: generate_range_proofs(h, &request.output_data),
            witness_commitment: WitnessCommitment {
                commitment: h.combine(&witness, &generate_nonce()),
                timestamp: Some(Utc::now()),
            },
        };

        let signature = sign(h, &proof_id, ProofType::ComputationIntegrity, &timestamp, &public_inputs)?;
        let proof = Proof {
            proof_id: proof_id.clone(),
            proof_type: ProofType::ComputationIntegrity,
            timestamp,
            timestamp_ms: audit_crypto::timestamp_millis(&timestamp),
            public_inputs,
            proof_components,
            metadata: ProofMetadata {
                user_id: request.user_id.clone(),
                session_id: request.session_id.clone(),
                computation_name: request.name.clone(),
                computation_type: request.computation_type.clone(),
            },
            status: VerificationStatus::Pending,
            signature,
        };
        let exported = proof.export();

        self.proofs.write().insert(proof_id.clone(), proof);

        self.ledger
            .append(
                EventCategory::Computation,
                EventFields::new("zkp_proof_generated")
                    .action("generate_proof")
                    .resource(proof_id.as_str())
                    .maybe_user(request.user_id)
                    .maybe_session(request.session_id)
                    .metadata(json!({
                        "proofId": proof_id,
                        "proofType": ProofType::ComputationIntegrity,
                        "computationType": request.computation_type,
                    })),
            )
            .await?;

        debug!(
            proof_id = %proof_id,
            range_proofs = exported.proof_components.range_proofs.len(),
            "computation proof generated"
        );

        Ok(ProofReceipt {
            proof_id,
            proof: exported,
            status: VerificationStatus::Pending,
        })
    }

    /// Register a proof produced elsewhere, replacing any proof with the same id.
    pub fn import(&self, exported: ExportedProof) -> String {
        let proof = Proof {
            proof_id: exported.proof_id.clone(),
            proof_type: exported.proof_type,
            timestamp: exported.timestamp,
            timestamp_ms: audit_crypto::timestamp_millis(&exported.timestamp),
            public_inputs: exported.public_inputs,
            proof_components: exported.proof_components,
            metadata: ProofMetadata::default(),
            status: VerificationStatus::Pending,
            signature: exported.signature,
        };
        let proof_id = proof.proof_id.clone();
        if self.proofs.write().insert(proof_id.clone(), proof).is_some() {
            info!(proof_id = %proof_id, "replaced stored proof with imported copy");
        }
        proof_id
    }

    pub fn get(&self, proof_id: &str) -> Option<Proof> {
        self.proofs.read().get(proof_id).cloned()
    }

    /// Proofs whose last verification succeeded
    pub fn verified_proofs(&self) -> Vec<Proof> {
        self.proofs
            .read()
            .values()
            .filter(|p| p.status == VerificationStatus::Verified)
            .cloned()
            .collect()
    }

    pub(crate) fn set_status(&self, proof_id: &str, status: VerificationStatus) {
        if let Some(proof) = self.proofs.write().get_mut(proof_id) {
            proof.status = status;
        }
    }

    pub(crate) fn hasher(&self) -> &dyn HashPrimitive {
        self.hasher.as_ref()
    }

    pub(crate) fn commitments(&self) -> &CommitmentStore {
        &self.commitments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::CommitmentMetadata;
    use audit_crypto::Sha256Hash;

    async fn engine() -> (Arc<Ledger>, ProofEngine, String) {
        let ledger = Arc::new(Ledger::default());
        let commitments = Arc::new(CommitmentStore::new(Arc::clone(&ledger)));
        let receipt = commitments
            .commit(&json!({"p": 250}), CommitmentMetadata::default())
            .await
            .unwrap();
        let engine = ProofEngine::new(Arc::clone(&ledger), commitments, ZkpConfig::default());
        (ledger, engine, receipt.commitment_id)
    }

    fn request(commitment_id: &str) -> ComputationRequest {
        ComputationRequest {
            input_commitment_id: commitment_id.to_string(),
            output_data: json!({"status": "stable", "rSquared": 0.42}),
            computation_function: "linear_regression".into(),
            parameters: json!({"window": 30}),
            user_id: Some("alice".into()),
            name: Some("Pressure trend".into()),
            computation_type: Some("regression".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_proof_structure() {
        let (_, engine, commitment_id) = engine().await;
        let receipt = engine.prove_computation(request(&commitment_id)).await.unwrap();
        let h = Sha256Hash;

        assert_eq!(receipt.status, VerificationStatus::Pending);
        let proof = receipt.proof;
        assert_eq!(proof.proof_type, ProofType::ComputationIntegrity);
        assert_eq!(proof.public_inputs.function_id, h.digest_str("linear_regression"));
        assert_eq!(
            proof.public_inputs.output_hash,
            h.digest_str(r#"{"rSquared":0.42,"status":"stable"}"#)
        );
        assert_eq!(proof.public_inputs.parameter_hash, h.digest_str(r#"{"window":30}"#));

        let steps = &proof.proof_components.computation_steps;
        assert_eq!(steps.steps.len(), 4);
        assert_eq!(steps.steps[2].operation, "execute_computation");
        assert_eq!(steps.steps[0].hash, h.digest_str("step1"));
        assert!(steps.verify(&h));

        assert_eq!(proof.proof_components.range_proofs.len(), 1);
        assert_eq!(proof.proof_components.range_proofs[0].key, "rSquared");
        assert!(proof.proof_components.witness_commitment.is_complete());

        let expected = sign(&h, &proof.proof_id, proof.proof_type, &proof.timestamp, &proof.public_inputs).unwrap();
        assert_eq!(proof.signature, expected);
    }

    #[tokio::test]
    async fn test_unknown_commitment_is_rejected() {
        let (ledger, engine, _) = engine().await;
        let before = ledger.len();

        let result = engine.prove_computation(request("commit_missing")).await;
        assert!(matches!(result, Err(ZkpError::CommitmentNotFound(id)) if id == "commit_missing"));
        assert_eq!(ledger.len(), before);
    }

    #[tokio::test]
    async fn test_generation_can_be_disabled() {
        let ledger = Arc::new(Ledger::default());
        let commitments = Arc::new(CommitmentStore::new(Arc::clone(&ledger)));
        let config = ZkpConfig {
            enable_proof_generation: false,
            ..Default::default()
        };
        let engine = ProofEngine::new(ledger, commitments, config);
        assert!(matches!(
            engine.prove_computation(request("any")).await,
            Err(ZkpError::Disabled(_))
        ));
    }

    #[tokio::test]
    async fn test_generation_is_logged_and_stored() {
        let (ledger, engine, commitment_id) = engine().await;
        let receipt = engine.prove_computation(request(&commitment_id)).await.unwrap();

        let stored = engine.get(&receipt.proof_id).unwrap();
        assert_eq!(stored.metadata.computation_name.as_deref(), Some("Pressure trend"));
        assert_eq!(stored.export(), receipt.proof);

        let last = ledger.recent_events(1).pop().unwrap();
        assert_eq!(last.event_type, "zkp_proof_generated");
        assert_eq!(last.category, EventCategory::Computation);
        assert_eq!(last.resource.as_deref(), Some(receipt.proof_id.as_str()));
        assert_eq!(last.metadata["proofType"], "computation_integrity");
        assert!(engine.verified_proofs().is_empty());
    }

    #[tokio::test]
    async fn test_import_replaces_and_resets_status() {
        let (_, engine, commitment_id) = engine().await;
        let receipt = engine.prove_computation(request(&commitment_id)).await.unwrap();
        engine.set_status(&receipt.proof_id, VerificationStatus::Verified);
        assert_eq!(engine.verified_proofs().len(), 1);

        let mut copy = receipt.proof.clone();
        copy.public_inputs.output_hash = "0".repeat(64);
        let id = engine.import(copy);

        let stored = engine.get(&id).unwrap();
        assert_eq!(stored.status, VerificationStatus::Pending);
        assert_eq!(stored.public_inputs.output_hash, "0".repeat(64));
        assert!(engine.verified_proofs().is_empty());
    }

    #[test]
    fn test_enum_wire_names() {
        let json = serde_json::to_value(VerificationStatus::Failed).unwrap();
        assert_eq!(json, "failed");
        assert_eq!(ProofType::MembershipProof.to_string(), "membership_proof");
    }
}
