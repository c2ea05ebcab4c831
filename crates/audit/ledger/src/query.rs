//! Audit query support

use crate::event::{AuditEvent, EventCategory, Severity};
use chrono::{DateTime, Utc};

/// Filter over ledger events. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Filter by category
    pub category: Option<EventCategory>,

    /// Filter by user ID
    pub user_id: Option<String>,

    /// Filter by session ID
    pub session_id: Option<String>,

    /// Filter by time range start (inclusive)
    pub start_time: Option<DateTime<Utc>>,

    /// Filter by time range end (inclusive)
    pub end_time: Option<DateTime<Utc>>,

    /// Filter by severity
    pub severity: Option<Severity>,

    /// Filter by event type
    pub event_type: Option<String>,
}

impl AuditQuery {
    /// Create a new query builder
    pub fn builder() -> AuditQueryBuilder {
        AuditQueryBuilder::default()
    }

    /// Check if an event matches this query
    pub fn matches(&self, event: &AuditEvent) -> bool {
        if let Some(category) = self.category {
            if event.category != category {
                return false;
            }
        }

        if let Some(ref user_id) = self.user_id {
            if event.user_id.as_ref() != Some(user_id) {
                return false;
            }
        }

        if let Some(ref session_id) = self.session_id {
            if event.session_id.as_ref() != Some(session_id) {
                return false;
            }
        }

        if let Some(start) = self.start_time {
            if event.timestamp_ms < start.timestamp_millis() {
                return false;
            }
        }

        if let Some(end) = self.end_time {
            if event.timestamp_ms > end.timestamp_millis() {
                return false;
            }
        }

        if let Some(severity) = self.severity {
            if event.severity != severity {
                return false;
            }
        }

        if let Some(ref event_type) = self.event_type {
            if &event.event_type != event_type {
                return false;
            }
        }

        true
    }

    /// Matching events in their original order
    pub fn apply<'a>(&self, events: impl IntoIterator<Item = &'a AuditEvent>) -> Vec<AuditEvent> {
        events
            .into_iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect()
    }
}

/// Builder for audit queries
#[derive(Debug, Default)]
pub struct AuditQueryBuilder {
    query: AuditQuery,
}

impl AuditQueryBuilder {
    pub fn category(mut self, category: EventCategory) -> Self {
        self.query.category = Some(category);
        self
    }

    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        self.query.user_id = Some(id.into());
        self
    }

    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.query.session_id = Some(id.into());
        self
    }

    pub fn start_time(mut self, time: DateTime<Utc>) -> Self {
        self.query.start_time = Some(time);
        self
    }

    pub fn end_time(mut self, time: DateTime<Utc>) -> Self {
        self.query.end_time = Some(time);
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.query.severity = Some(severity);
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.query.event_type = Some(event_type.into());
        self
    }

    /// Build the query
    pub fn build(self) -> AuditQuery {
        self.query
    }
}
