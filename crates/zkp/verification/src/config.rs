//! Proof pipeline configuration

use serde::{Deserialize, Serialize};

/// Switches for the proof pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkpConfig {
    /// Allow `ProofEngine::prove_computation`
    #[serde(default = "default_true")]
    pub enable_proof_generation: bool,

    /// Allow `VerificationEngine::verify`
    #[serde(default = "default_true")]
    pub enable_proof_verification: bool,
}

impl Default for ZkpConfig {
    fn default() -> Self {
        Self {
            enable_proof_generation: true,
            enable_proof_verification: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_enabled() {
        let config: ZkpConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ZkpConfig::default());

        let config: ZkpConfig =
            serde_json::from_str(r#"{"enable_proof_verification": false}"#).unwrap();
        assert!(config.enable_proof_generation);
        assert!(!config.enable_proof_verification);
    }
}
