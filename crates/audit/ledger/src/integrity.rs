//! Hash-chain construction and verification

use crate::error::LedgerResult;
use crate::event::{AuditEvent, EventCategory};
use audit_crypto::{canonical_timestamp, HashPrimitive};
use serde::{Deserialize, Serialize};

/// Error label for an event whose stored hash differs from its recomputed digest.
pub const HASH_MISMATCH: &str = "Hash mismatch";

/// Error label for an event whose `previousHash` differs from its predecessor's hash.
pub const CHAIN_BROKEN: &str = "Chain broken";

/// The hashed subset of an event, in canonical field order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalEvent<'a> {
    event_id: &'a str,
    category: EventCategory,
    timestamp: String,
    #[serde(rename = "type")]
    event_type: &'a str,
    user_id: Option<&'a str>,
    session_id: Option<&'a str>,
    action: Option<&'a str>,
    resource: Option<&'a str>,
}

/// Digest of an event's canonical fields. `hash` and `previousHash` are not covered.
pub fn compute_event_hash(hasher: &dyn HashPrimitive, event: &AuditEvent) -> LedgerResult<String> {
    let canonical = CanonicalEvent {
        event_id: &event.event_id,
        category: event.category,
        timestamp: canonical_timestamp(&event.timestamp),
        event_type: &event.event_type,
        user_id: event.user_id.as_deref(),
        session_id: event.session_id.as_deref(),
        action: event.action.as_deref(),
        resource: event.resource.as_deref(),
    };
    let json = serde_json::to_string(&canonical)?;
    Ok(hasher.digest_str(&json))
}

/// Tail pointer of the chain, owned by the single ledger writer.
#[derive(Debug, Default)]
pub struct ChainHead {
    last_hash: Option<String>,
    sequence: u64,
}

impl ChainHead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from an existing tail
    pub fn from_state(last_hash: Option<String>, sequence: u64) -> Self {
        Self {
            last_hash,
            sequence,
        }
    }

    /// The `previousHash` for the next event
    pub fn previous_hash(&self) -> Option<String> {
        self.last_hash.clone()
    }

    /// Sequence number the next event will carry
    pub fn next_sequence(&self) -> u64 {
        self.sequence + 1
    }

    /// Move the tail onto a freshly appended event
    pub fn advance(&mut self, event: &AuditEvent) {
        self.last_hash = event.hash.clone();
        self.sequence += 1;
    }

    /// Point the tail at a different hash (used after pruning)
    pub fn reset_tail(&mut self, last_hash: Option<String>) {
        self.last_hash = last_hash;
    }

    /// Current tail hash
    pub fn head_hash(&self) -> Option<&String> {
        self.last_hash.as_ref()
    }

    /// Total events appended through this head
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// One integrity discrepancy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainError {
    pub event_id: String,
    pub error: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

/// Result of a full-chain verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainVerification {
    pub verified: bool,
    pub total_events: usize,
    pub errors: Vec<ChainError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Verifies hash chains of audit events
pub struct IntegrityVerifier;

impl IntegrityVerifier {
    /// Whether an event's stored hash equals its recomputed digest
    pub fn verify_event(hasher: &dyn HashPrimitive, event: &AuditEvent) -> LedgerResult<bool> {
        let computed = compute_event_hash(hasher, event)?;
        Ok(event.hash.as_deref() == Some(computed.as_str()))
    }

    /// Walk the whole chain once, collecting every discrepancy.
    pub fn verify_chain(
        hasher: &dyn HashPrimitive,
        events: &[AuditEvent],
    ) -> LedgerResult<ChainVerification> {
        let mut errors = Vec::new();

        for (i, event) in events.iter().enumerate() {
            let expected = compute_event_hash(hasher, event)?;
            if event.hash.as_deref() != Some(expected.as_str()) {
                errors.push(ChainError {
                    event_id: event.event_id.clone(),
                    error: HASH_MISMATCH.to_string(),
                    expected: Some(expected),
                    actual: event.hash.clone(),
                });
            }

            if i > 0 {
                let previous = &events[i - 1];
                if event.previous_hash != previous.hash {
                    errors.push(ChainError {
                        event_id: event.event_id.clone(),
                        error: CHAIN_BROKEN.to_string(),
                        expected: previous.hash.clone(),
                        actual: event.previous_hash.clone(),
                    });
                }
            }
        }

        Ok(ChainVerification {
            verified: errors.is_empty(),
            total_events: events.len(),
            errors,
            message: None,
        })
    }
}
