//! Range-proof placeholders over numeric outputs.
//!
//! Each numeric leaf gets three digests (`value_lower`, `value_upper`, and the
//! value itself). No bound is encoded; verification only checks that the
//! three commitments are present.

use crate::proof::ProofType;
use audit_crypto::HashPrimitive;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Commitments for one numeric output field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeProof {
    pub key: String,
    pub proof_type: ProofType,
    #[serde(default)]
    pub lower_bound_commitment: String,
    #[serde(default)]
    pub upper_bound_commitment: String,
    #[serde(default)]
    pub value_commitment: String,
    pub timestamp: DateTime<Utc>,
}

impl RangeProof {
    /// All three commitments are present
    pub fn is_complete(&self) -> bool {
        !self.lower_bound_commitment.is_empty()
            && !self.upper_bound_commitment.is_empty()
            && !self.value_commitment.is_empty()
    }
}

/// Numeric leaves of `data` keyed by dot path.
///
/// Object members contribute their key, array elements their index, so
/// `{"a": {"b": [1, 2]}}` yields `a.b.0` and `a.b.1`. Top-level scalars have
/// no path and yield nothing.
pub fn extract_numeric_values(data: &Value) -> Vec<(String, Number)> {
    let mut out = Vec::new();
    walk(data, None, &mut out);
    out
}

fn walk(value: &Value, prefix: Option<&str>, out: &mut Vec<(String, Number)>) {
    let join = |key: &str| match prefix {
        Some(prefix) => format!("{prefix}.{key}"),
        None => key.to_string(),
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                visit(child, join(key), out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                visit(child, join(&index.to_string()), out);
            }
        }
        _ => {}
    }
}

fn visit(child: &Value, path: String, out: &mut Vec<(String, Number)>) {
    match child {
        Value::Number(n) => out.push((path, n.clone())),
        Value::Object(_) | Value::Array(_) => walk(child, Some(&path), out),
        _ => {}
    }
}

/// Build one range proof per numeric leaf of `output`
pub fn generate_range_proofs(hasher: &dyn HashPrimitive, output: &Value) -> Vec<RangeProof> {
    let timestamp = Utc::now();
    extract_numeric_values(output)
        .into_iter()
        .map(|(key, value)| {
            let value = number_text(&value);
            RangeProof {
                key,
                proof_type: ProofType::RangeProof,
                lower_bound_commitment: hasher.digest_str(&format!("{value}_lower")),
                upper_bound_commitment: hasher.digest_str(&format!("{value}_upper")),
                value_commitment: hasher.digest_str(&value),
                timestamp,
            }
        })
        .collect()
}

/// Text committed for a number: integral floats print without a fraction
/// (`1.0` is `"1"`, `-0.0` is `"0"`) up to 1e21, where exponent notation takes
/// over; everything else uses the JSON form.
fn number_text(value: &Number) -> String {
    match value.as_f64() {
        Some(f) if value.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => value.to_string(),
    }
}

/// Every entry carries all three commitments
pub fn verify_range_proofs(proofs: &[RangeProof]) -> bool {
    proofs.iter().all(RangeProof::is_complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_crypto::Sha256Hash;
    use serde_json::json;

    fn keys(data: &Value) -> Vec<String> {
        extract_numeric_values(data).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_nested_paths() {
        let data = json!({
            "status": "stable",
            "rSquared": 0.42,
            "pressure": {"max": 250, "min": 10, "unit": "psi"},
            "ok": true,
            "note": null
        });
        assert_eq!(keys(&data), vec!["pressure.max", "pressure.min", "rSquared"]);
    }

    #[test]
    fn test_arrays_use_index_segments() {
        let data = json!({"samples": [1.5, "x", [2, 3]], "runs": [{"t": 4}]});
        assert_eq!(
            keys(&data),
            vec!["runs.0.t", "samples.0", "samples.2.0", "samples.2.1"]
        );
        assert_eq!(keys(&json!([7, 8])), vec!["0", "1"]);
    }

    #[test]
    fn test_scalars_have_no_leaves() {
        assert!(keys(&json!(42)).is_empty());
        assert!(keys(&json!("text")).is_empty());
        assert!(keys(&Value::Null).is_empty());
    }

    #[test]
    fn test_commitments_use_number_text() {
        let h = Sha256Hash;
        let proofs = generate_range_proofs(&h, &json!({"rSquared": 0.42, "p": 250}));

        assert_eq!(proofs.len(), 2);
        assert_eq!(proofs[0].key, "p");
        assert_eq!(proofs[0].value_commitment, h.digest_str("250"));
        assert_eq!(proofs[0].lower_bound_commitment, h.digest_str("250_lower"));
        assert_eq!(proofs[1].upper_bound_commitment, h.digest_str("0.42_upper"));
        assert!(proofs.iter().all(|p| p.proof_type == ProofType::RangeProof));
        assert!(verify_range_proofs(&proofs));
    }

    #[test]
    fn test_integral_floats_commit_like_integers() {
        let h = Sha256Hash;
        let proofs = generate_range_proofs(&h, &json!({"a": 1.0, "b": -0.0, "c": 2.5, "d": 1e20}));

        assert_eq!(proofs[0].value_commitment, h.digest_str("1"));
        assert_eq!(proofs[1].value_commitment, h.digest_str("0"));
        assert_eq!(proofs[2].value_commitment, h.digest_str("2.5"));
        assert_eq!(proofs[3].value_commitment, h.digest_str("100000000000000000000"));

        let as_int = generate_range_proofs(&h, &json!({"a": 1}));
        assert_eq!(as_int[0].value_commitment, proofs[0].value_commitment);
    }

    #[test]
    fn test_missing_commitment_fails_verification() {
        let mut proofs = generate_range_proofs(&Sha256Hash, &json!({"a": 1, "b": 2}));
        proofs[1].upper_bound_commitment.clear();
        assert!(!verify_range_proofs(&proofs));
        assert!(verify_range_proofs(&[]));
    }
}
