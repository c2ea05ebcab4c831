//! Audit event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Auth,
    Access,
    Data,
    Computation,
    Security,
    Compliance,
    UserActivity,
    System,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Access => "access",
            Self::Data => "data",
            Self::Computation => "computation",
            Self::Security => "security",
            Self::Compliance => "compliance",
            Self::UserActivity => "user_activity",
            Self::System => "system",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth" => Ok(Self::Auth),
            "access" => Ok(Self::Access),
            "data" => Ok(Self::Data),
            "computation" => Ok(Self::Computation),
            "security" => Ok(Self::Security),
            "compliance" => Ok(Self::Compliance),
            "user_activity" => Ok(Self::UserActivity),
            "system" => Ok(Self::System),
            other => Err(format!("unknown event category: {other}")),
        }
    }
}

/// Event severity levels
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// A hash-linked ledger entry.
///
/// `hash` covers `eventId`, `category`, `timestamp`, `type`, `userId`,
/// `sessionId`, `action` and `resource`. `previousHash` is the `hash` of the
/// event appended immediately before this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub event_id: String,
    pub category: EventCategory,
    pub timestamp: DateTime<Utc>,
    pub timestamp_ms: i64,
    pub severity: Severity,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub action: Option<String>,
    pub resource: Option<String>,
    #[serde(default = "empty_metadata")]
    pub metadata: Value,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub previous_hash: Option<String>,
}

fn empty_metadata() -> Value {
    Value::Object(Default::default())
}

/// Caller-supplied fields of an event about to be appended.
#[derive(Debug, Clone, Default)]
pub struct EventFields {
    pub severity: Severity,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub event_type: Option<String>,
    pub action: Option<String>,
    pub resource: Option<String>,
    pub metadata: Option<Value>,
}

impl EventFields {
    /// Fields for an event of the given type
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: Some(event_type.into()),
            ..Default::default()
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn maybe_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn maybe_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Build an unsealed event (no hash, no link).
    pub(crate) fn into_event(
        self,
        event_id: String,
        category: EventCategory,
        timestamp: DateTime<Utc>,
    ) -> AuditEvent {
        AuditEvent {
            event_id,
            category,
            timestamp,
            timestamp_ms: timestamp.timestamp_millis(),
            severity: self.severity,
            user_id: self.user_id,
            session_id: self.session_id,
            event_type: self.event_type.unwrap_or_else(|| "unknown".to_string()),
            action: self.action,
            resource: self.resource,
            metadata: self.metadata.unwrap_or_else(empty_metadata),
            hash: None,
            previous_hash: None,
        }
    }
}
