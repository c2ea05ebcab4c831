//! Nested provenance trees

use crate::record::{Operation, ProvenanceRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Generations expanded below the root before a branch is cut off.
pub const MAX_TREE_DEPTH: usize = 256;

/// A record together with the trees of its registered parents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceNode {
    pub data_id: String,
    pub operation: Operation,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    pub metadata: Value,
    pub children: Vec<ProvenanceNode>,
    /// Set when the node has parents that were not expanded because the
    /// tree reached [`MAX_TREE_DEPTH`].
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl ProvenanceNode {
    fn leaf(record: &ProvenanceRecord) -> Self {
        Self {
            data_id: record.data_id.clone(),
            operation: record.operation,
            timestamp: record.timestamp,
            user_id: record.user_id.clone(),
            metadata: record.metadata.clone(),
            children: Vec::new(),
            truncated: false,
        }
    }

    /// Number of nodes in this tree, including the root
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }
}

impl Drop for ProvenanceNode {
    fn drop(&mut self) {
        // Flatten the subtree so nested drops never recurse.
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// A node under construction and the index of the next parent to visit
struct Frame<'a> {
    record: &'a ProvenanceRecord,
    node: ProvenanceNode,
    next_parent: usize,
}

/// Build the tree rooted at `data_id`.
///
/// `visited` is shared across the whole descent: a data id already expanded
/// anywhere in the tree is not expanded again, which terminates cycles and
/// visits each record at most once. The walk keeps its own stack, so long
/// chains cost heap rather than call depth.
pub(crate) fn build(
    records: &HashMap<String, ProvenanceRecord>,
    data_id: &str,
    visited: &mut HashSet<String>,
) -> Option<ProvenanceNode> {
    if !visited.insert(data_id.to_string()) {
        return None;
    }
    let root = records.get(data_id)?;

    let mut stack = vec![Frame {
        record: root,
        node: ProvenanceNode::leaf(root),
        next_parent: 0,
    }];

    loop {
        // The root sits at depth 0, so the stack length is the depth of the
        // child about to be pushed.
        let depth = stack.len();
        let Some(frame) = stack.last_mut() else {
            return None;
        };
        let record = frame.record;
        if let Some(parent) = record.parent_data_ids.get(frame.next_parent) {
            frame.next_parent += 1;
            if depth > MAX_TREE_DEPTH {
                frame.node.truncated = true;
                continue;
            }
            if !visited.insert(parent.clone()) {
                continue;
            }
            if let Some(parent_record) = records.get(parent) {
                stack.push(Frame {
                    record: parent_record,
                    node: ProvenanceNode::leaf(parent_record),
                    next_parent: 0,
                });
            }
            continue;
        }

        let finished = stack.pop()?.node;
        match stack.last_mut() {
            Some(owner) => owner.node.children.push(finished),
            None => return Some(finished),
        }
    }
}
