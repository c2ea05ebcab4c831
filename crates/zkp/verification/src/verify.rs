//! Proof verification

use crate::config::ZkpConfig;
use crate::error::{ZkpError, ZkpResult};
use crate::proof::{sign, ProofEngine, PublicInputs, VerificationStatus};
use crate::range::verify_range_proofs;
use audit_crypto::generate_id;
use audit_ledger::{EventCategory, EventFields, Ledger};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of each independent check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationChecks {
    pub signature_valid: bool,
    pub commitment_valid: bool,
    pub computation_valid: bool,
    pub range_proofs_valid: bool,
    pub witness_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_inputs_match: Option<bool>,
}

impl VerificationChecks {
    /// Every executed check passed
    pub fn all_passed(&self) -> bool {
        self.signature_valid
            && self.commitment_valid
            && self.computation_valid
            && self.range_proofs_valid
            && self.witness_valid
            && self.public_inputs_match.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verification_id: String,
    pub proof_id: String,
    pub timestamp: DateTime<Utc>,
    pub checks: VerificationChecks,
    pub verified: bool,
    pub message: String,
}

/// Re-checks stored proofs against the commitment store
pub struct VerificationEngine {
    ledger: Arc<Ledger>,
    proofs: Arc<ProofEngine>,
    config: ZkpConfig,
    results: RwLock<HashMap<String, VerificationResult>>,
}

impl VerificationEngine {
    pub fn new(ledger: Arc<Ledger>, proofs: Arc<ProofEngine>, config: ZkpConfig) -> Self {
        Self {
            ledger,
            proofs,
            config,
            results: RwLock::new(HashMap::new()),
        }
    }

    /// Run every check on `proof_id` and record the outcome on the proof.
    ///
    /// A proof that fails is still `Ok`; only an unknown id is an error.
    /// When `expected` is given, the stored public inputs must equal it.
    pub async fn verify(
        &self,
        proof_id: &str,
        expected: Option<&PublicInputs>,
    ) -> ZkpResult<VerificationResult> {
        if !self.config.enable_proof_verification {
            return Err(ZkpError::Disabled("proof verification"));
        }

        let proof = self
            .proofs
            .get(proof_id)
            .ok_or_else(|| ZkpError::ProofNotFound(proof_id.to_string()))?;
        let h = self.proofs.hasher();

        let signature_valid = match sign(
            h,
            &proof.proof_id,
            proof.proof_type,
            &proof.timestamp,
            &proof.public_inputs,
        ) {
            Ok(expected) => expected == proof.signature,
            Err(e) => {
                warn!(proof_id, error = %e, "failed to recompute proof signature");
                false
            }
        };

        let components = &proof.proof_components;
        let checks = VerificationChecks {
            signature_valid,
            commitment_valid: self
                .proofs
                .commitments()
                .exists(&proof.public_inputs.input_commitment),
            computation_valid: components.computation_steps.verify(h),
            range_proofs_valid: verify_range_proofs(&components.range_proofs),
            witness_valid: components.witness_commitment.is_complete(),
            public_inputs_match: expected.map(|inputs| *inputs == proof.public_inputs),
        };
        let verified = checks.all_passed();

        let result = VerificationResult {
            verification_id: generate_id("verify"),
            proof_id: proof_id.to_string(),
            timestamp: Utc::now(),
            checks,
            verified,
            message: if verified {
                "Proof verified successfully".to_string()
            } else {
                "Proof verification failed".to_string()
            },
        };

        self.proofs.set_status(
            proof_id,
            if verified {
                VerificationStatus::Verified
            } else {
                VerificationStatus::Failed
            },
        );
        self.results
            .write()
            .insert(result.verification_id.clone(), result.clone());

        self.ledger
            .append(
                EventCategory::Security,
                EventFields::new("zkp_proof_verified")
                    .action("verify_proof")
                    .resource(proof_id)
                    .metadata(json!({
                        "verificationId": result.verification_id,
                        "verified": verified,
                        "checks": checks,
                    })),
            )
            .await?;

        if verified {
            info!(proof_id, verification_id = %result.verification_id, "proof verified");
        } else {
            warn!(proof_id, verification_id = %result.verification_id, ?checks, "proof verification failed");
        }
        Ok(result)
    }

    /// Stored verification result by id
    pub fn get(&self, verification_id: &str) -> Option<VerificationResult> {
        self.results.read().get(verification_id).cloned()
    }
}
