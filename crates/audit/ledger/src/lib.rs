//! Tamper-evident audit ledger.
//!
//! Every logged action becomes an [`AuditEvent`] whose `hash` covers its
//! canonical fields and whose `previousHash` links it to the event before it.
//! Retroactive edits are detected by [`Ledger::verify`], which walks the whole
//! chain and reports every discrepancy instead of stopping at the first.
//!
//! ## Features
//!
//! - **Append**: single-writer appends with best-effort persistence
//! - **Verify**: itemized hash-mismatch / chain-broken findings
//! - **Query / Export**: filtered reads, JSON and CSV dumps
//! - **Analytics**: counts by category, severity, user, session, action, resource
//! - **Retention**: FIFO size cap plus age-based pruning
//! - **Sessions**: per-session activity summaries

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod integrity;
mod ledger;
pub mod query;
pub mod report;
pub mod session;
pub mod sink;

pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use event::{AuditEvent, EventCategory, EventFields, Severity};
pub use export::ExportFormat;
pub use integrity::{ChainError, ChainHead, ChainVerification, IntegrityVerifier};
pub use ledger::Ledger;
pub use query::{AuditQuery, AuditQueryBuilder};
pub use report::{AnalyticsReport, TimeRange};
pub use session::{SessionActivity, SessionActivityEntry};
pub use sink::{EventSink, HttpEventSink, MemoryEventSink};
