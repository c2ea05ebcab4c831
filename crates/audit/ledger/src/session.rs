//! Per-session activity tracking

use crate::event::{AuditEvent, EventCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One event as seen from its session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub category: EventCategory,
    #[serde(rename = "type")]
    pub event_type: String,
    pub action: Option<String>,
    pub resource: Option<String>,
}

/// Running summary of a session's retained events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionActivity {
    pub session_id: String,
    pub activities: VecDeque<SessionActivityEntry>,
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub event_count: u64,
}

impl SessionActivity {
    pub fn new(session_id: impl Into<String>, started: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            activities: VecDeque::new(),
            start_time: started,
            last_activity: started,
            event_count: 0,
        }
    }

    /// Fold one event into the summary
    pub fn record(&mut self, event: &AuditEvent) {
        self.activities.push_back(SessionActivityEntry {
            timestamp: event.timestamp,
            category: event.category,
            event_type: event.event_type.clone(),
            action: event.action.clone(),
            resource: event.resource.clone(),
        });
        self.last_activity = event.timestamp;
        self.event_count += 1;
    }

    /// Drop the oldest entry once its event leaves the ledger. Returns
    /// whether the session has no entries left.
    pub fn forget_oldest(&mut self) -> bool {
        if self.activities.pop_front().is_some() {
            self.event_count = self.event_count.saturating_sub(1);
        }
        if let Some(front) = self.activities.front() {
            self.start_time = front.timestamp;
        }
        self.activities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventFields;

    #[test]
    fn test_record_updates_counters() {
        let first = EventFields::new("login")
            .session("s1")
            .into_event("e1".into(), EventCategory::Auth, Utc::now());
        let second = EventFields::new("view")
            .session("s1")
            .resource("dashboard")
            .into_event("e2".into(), EventCategory::Access, Utc::now());

        let mut activity = SessionActivity::new("s1", first.timestamp);
        activity.record(&first);
        activity.record(&second);

        assert_eq!(activity.event_count, 2);
        assert_eq!(activity.activities.len(), 2);
        assert_eq!(activity.activities[1].resource.as_deref(), Some("dashboard"));
        assert_eq!(activity.last_activity, second.timestamp);

        assert!(!activity.forget_oldest());
        assert_eq!(activity.event_count, 1);
        assert_eq!(activity.activities[0].event_type, "view");
        assert!(activity.forget_oldest());
        assert_eq!(activity.event_count, 0);
    }
}
