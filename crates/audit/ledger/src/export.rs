//! JSON and CSV export of audit events

use crate::error::LedgerResult;
use crate::event::AuditEvent;
use serde::{Deserialize, Serialize};

/// CSV header row. Column order is relied on by downstream consumers.
pub const CSV_HEADERS: [&str; 9] = [
    "Event ID",
    "Timestamp",
    "Category",
    "Type",
    "User ID",
    "Session ID",
    "Action",
    "Resource",
    "Severity",
];

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unsupported export format: {other}")),
        }
    }
}

/// Render events in the requested format
pub fn render(events: &[AuditEvent], format: ExportFormat) -> LedgerResult<String> {
    match format {
        ExportFormat::Json => to_json(events),
        ExportFormat::Csv => Ok(to_csv(events)),
    }
}

/// Pretty-printed JSON array
pub fn to_json(events: &[AuditEvent]) -> LedgerResult<String> {
    Ok(serde_json::to_string_pretty(events)?)
}

/// Quoted CSV, one row per event
pub fn to_csv(events: &[AuditEvent]) -> String {
    let header = CSV_HEADERS.iter().map(|h| quote(h)).collect::<Vec<_>>().join(",");

    let rows = events.iter().map(|e| {
        let timestamp = audit_crypto::canonical_timestamp(&e.timestamp);
        [
            e.event_id.as_str(),
            timestamp.as_str(),
            e.category.as_str(),
            e.event_type.as_str(),
            e.user_id.as_deref().unwrap_or(""),
            e.session_id.as_deref().unwrap_or(""),
            e.action.as_deref().unwrap_or(""),
            e.resource.as_deref().unwrap_or(""),
            e.severity.as_str(),
        ]
        .iter()
        .map(|cell| quote(cell))
        .collect::<Vec<_>>()
        .join(",")
    });

    std::iter::once(header).chain(rows).collect::<Vec<_>>().join("\n")
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventCategory, EventFields};
    use chrono::{DateTime, Utc};

    fn fixed_event() -> AuditEvent {
        let at = DateTime::parse_from_rfc3339("2024-05-01T08:00:00.250Z")
            .unwrap()
            .with_timezone(&Utc);
        EventFields::new("zkp_proof_generated")
            .user("alice")
            .action("generate_proof")
            .resource("proof_1")
            .into_event("evt_1".into(), EventCategory::Computation, at)
    }

    #[test]
    fn test_csv_layout() {
        let csv = to_csv(&[fixed_event()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            r#""Event ID","Timestamp","Category","Type","User ID","Session ID","Action","Resource","Severity""#
        );
        assert_eq!(
            lines[1],
            r#""evt_1","2024-05-01T08:00:00.250Z","computation","zkp_proof_generated","alice","","generate_proof","proof_1","info""#
        );
    }

    #[test]
    fn test_csv_escapes_quotes() {
        let mut event = fixed_event();
        event.action = Some(r#"say "hi""#.into());
        let csv = to_csv(&[event]);
        assert!(csv.contains(r#""say ""hi""""#));
    }

    #[test]
    fn test_csv_without_events_is_header_only() {
        assert_eq!(to_csv(&[]).lines().count(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let json = render(&[fixed_event()], ExportFormat::Json).unwrap();
        let parsed: Vec<AuditEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![fixed_event()]);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
