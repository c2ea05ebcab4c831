//! Provenance record types

use crate::error::ProvenanceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Data operations that produce provenance records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Transform,
    Export,
    Import,
    Share,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Transform => "transform",
            Self::Export => "export",
            Self::Import => "import",
            Self::Share => "share",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = ProvenanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "transform" => Ok(Self::Transform),
            "export" => Ok(Self::Export),
            "import" => Ok(Self::Import),
            "share" => Ok(Self::Share),
            other => Err(ProvenanceError::UnknownOperation(other.to_string())),
        }
    }
}

/// Caller-supplied context for a provenance record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvenanceInput {
    pub parent_data_ids: Vec<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub transformations: Vec<Value>,
    pub computation_hash: Option<String>,
    pub metadata: Option<Value>,
}

impl ProvenanceInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent(mut self, data_id: impl Into<String>) -> Self {
        self.parent_data_ids.push(data_id.into());
        self
    }

    pub fn parents<I, S>(mut self, data_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parent_data_ids.extend(data_ids.into_iter().map(Into::into));
        self
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn transformation(mut self, step: Value) -> Self {
        self.transformations.push(step);
        self
    }

    pub fn computation_hash(mut self, hash: impl Into<String>) -> Self {
        self.computation_hash = Some(hash.into());
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// One registered parent as seen from its child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationStep {
    pub data_id: String,
    pub operation: Operation,
    pub timestamp: DateTime<Utc>,
}

/// Flattened ancestry computed when a record is written.
///
/// Only parents already present in the graph contribute; unregistered parents
/// are skipped. `depth` is zero for roots and one more than the deepest
/// registered parent otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lineage {
    pub data_id: String,
    pub depth: u32,
    pub ancestors: Vec<String>,
    pub creation_path: Vec<CreationStep>,
}

impl Lineage {
    pub fn root(data_id: impl Into<String>) -> Self {
        Self {
            data_id: data_id.into(),
            depth: 0,
            ancestors: Vec::new(),
            creation_path: Vec::new(),
        }
    }

    /// Fold a registered parent into this lineage
    pub fn absorb(&mut self, parent: &ProvenanceRecord) {
        self.ancestors.push(parent.data_id.clone());
        self.creation_path.push(CreationStep {
            data_id: parent.data_id.clone(),
            operation: parent.operation,
            timestamp: parent.timestamp,
        });
        self.depth = self.depth.max(parent.lineage.depth + 1);
    }
}

/// How one data artifact came to be
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceRecord {
    pub provenance_id: String,
    pub data_id: String,
    pub operation: Operation,
    pub timestamp: DateTime<Utc>,
    pub timestamp_ms: i64,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub parent_data_ids: Vec<String>,
    #[serde(default)]
    pub transformations: Vec<Value>,
    pub computation_hash: Option<String>,
    #[serde(default)]
    pub metadata: Value,
    pub lineage: Lineage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// The hashed subset of a record
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CanonicalRecord<'a> {
    pub provenance_id: &'a str,
    pub data_id: &'a str,
    pub operation: Operation,
    pub timestamp: String,
    pub parent_data_ids: &'a [String],
    pub user_id: Option<&'a str>,
}

impl<'a> CanonicalRecord<'a> {
    pub(crate) fn of(record: &'a ProvenanceRecord) -> Self {
        Self {
            provenance_id: &record.provenance_id,
            data_id: &record.data_id,
            operation: record.operation,
            timestamp: audit_crypto::canonical_timestamp(&record.timestamp),
            parent_data_ids: &record.parent_data_ids,
            user_id: record.user_id.as_deref(),
        }
    }
}
