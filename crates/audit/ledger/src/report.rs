//! Read-side aggregations over audit events

use crate::event::AuditEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// First and last timestamp of a report's events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Event counts grouped along each audit dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub total_events: usize,
    pub time_range: TimeRange,
    pub by_category: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
    pub by_user: BTreeMap<String, usize>,
    pub by_session: BTreeMap<String, usize>,
    pub top_actions: BTreeMap<String, usize>,
    pub top_resources: BTreeMap<String, usize>,
}

impl AnalyticsReport {
    /// Aggregate events given in append order
    pub fn from_events(events: &[AuditEvent]) -> Self {
        let mut report = Self {
            total_events: events.len(),
            time_range: TimeRange {
                start: events.first().map(|e| e.timestamp),
                end: events.last().map(|e| e.timestamp),
            },
            ..Default::default()
        };

        for event in events {
            bump(&mut report.by_category, event.category.as_str());
            bump(&mut report.by_severity, event.severity.as_str());
            if let Some(ref user) = event.user_id {
                bump(&mut report.by_user, user);
            }
            if let Some(ref session) = event.session_id {
                bump(&mut report.by_session, session);
            }
            if let Some(ref action) = event.action {
                bump(&mut report.top_actions, action);
            }
            if let Some(ref resource) = event.resource {
                bump(&mut report.top_resources, resource);
            }
        }

        report
    }
}

fn bump(counts: &mut BTreeMap<String, usize>, key: &str) {
    *counts.entry(key.to_string()).or_insert(0) += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventCategory, EventFields, Severity};

    #[test]
    fn test_counts_every_dimension() {
        let events = vec![
            EventFields::new("login")
                .user("alice")
                .session("s1")
                .action("sign_in")
                .into_event("e1".into(), EventCategory::Auth, Utc::now()),
            EventFields::new("read")
                .user("alice")
                .resource("well-7")
                .into_event("e2".into(), EventCategory::Data, Utc::now()),
            EventFields::new("alert")
                .severity(Severity::Critical)
                .action("sign_in")
                .into_event("e3".into(), EventCategory::Auth, Utc::now()),
        ];

        let report = AnalyticsReport::from_events(&events);
        assert_eq!(report.total_events, 3);
        assert_eq!(report.by_category["auth"], 2);
        assert_eq!(report.by_category["data"], 1);
        assert_eq!(report.by_severity["info"], 2);
        assert_eq!(report.by_severity["critical"], 1);
        assert_eq!(report.by_user["alice"], 2);
        assert_eq!(report.by_session["s1"], 1);
        assert_eq!(report.top_actions["sign_in"], 2);
        assert_eq!(report.top_resources["well-7"], 1);
        assert_eq!(report.time_range.start, Some(events[0].timestamp));
        assert_eq!(report.time_range.end, Some(events[2].timestamp));
    }

    #[test]
    fn test_empty_report() {
        let report = AnalyticsReport::from_events(&[]);
        assert_eq!(report.total_events, 0);
        assert_eq!(report.time_range, TimeRange::default());
        assert!(report.by_category.is_empty());
    }
}
