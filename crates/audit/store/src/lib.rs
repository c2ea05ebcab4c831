//! Persistence collaborator for the audit ledger.
//!
//! The core treats storage as an ordered key-value store partitioned into
//! named collections:
//! - `put` inserts or replaces a record (a replaced key keeps its position)
//! - `get` reads one record by key
//! - `scan` iterates a collection in insertion order
//! - `remove` / `remove_many` delete records by key
//!
//! Write failures are non-fatal for callers (degraded durability); read
//! failures are reported so callers can treat them as "not found".

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod error;
pub mod file;
pub mod memory;
mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;
pub use traits::RecordStore;

/// Collection holding hash-chained audit events, keyed by event id.
pub const AUDIT_LOG: &str = "audit_log";

/// Collection holding provenance records, keyed by data id.
pub const PROVENANCE: &str = "provenance";
