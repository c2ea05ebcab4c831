//! Data provenance tracking.
//!
//! A [`ProvenanceGraph`] keeps one [`ProvenanceRecord`] per data id. Records
//! name their parents, so the graph can answer "where did this come from"
//! either as a flat [`Lineage`] (computed at record time) or as a nested
//! [`ProvenanceNode`] tree (computed on demand, cycle-safe, cut off after
//! [`MAX_TREE_DEPTH`] generations).

#![deny(unsafe_code)]

mod error;
mod graph;
pub mod record;
pub mod tree;

pub use error::{ProvenanceError, ProvenanceResult};
pub use graph::{ProvenanceGraph, ProvenanceView};
pub use record::{CreationStep, Lineage, Operation, ProvenanceInput, ProvenanceRecord};
pub use tree::{ProvenanceNode, MAX_TREE_DEPTH};
