//! Snapshot flattening
//!
//! Turns the two-part snapshot representation into one ordered entry list:
//! node references first, in stored order, then immediate entries in stored
//! order. Nothing is de-duplicated; consumers resolve names first-match-wins.

use std::sync::Arc;

use super::{Node, SnapshotRecord};
use crate::attribute::{Attribute, Value};

/// A resolved snapshot entry
#[derive(Debug, Clone)]
pub enum Entry {
    /// Reference to a context tree node, carrying its parent chain
    Reference(Arc<Node>),
    /// Attribute/value pair stored directly with the snapshot
    Immediate(Attribute, Value),
}

impl Entry {
    /// Text value this entry holds for the attribute called `name`
    ///
    /// A node reference joins every matching node on its chain root-to-leaf
    /// with `/`, so nested regions read as a path.
    pub fn text_for(&self, name: &str) -> Option<String> {
        match self {
            Entry::Immediate(attr, value) => (attr.name() == name).then(|| value.to_text(attr.ty())),
            Entry::Reference(leaf) => {
                let mut parts: Vec<String> = leaf
                    .path()
                    .filter(|node| node.attribute().name() == name)
                    .map(|node| node.value().to_text(node.attribute().ty()))
                    .collect();

                if parts.is_empty() {
                    return None;
                }

                parts.reverse();
                Some(parts.join("/"))
            }
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Entry::Reference(a), Entry::Reference(b)) => Arc::ptr_eq(a, b),
            (Entry::Immediate(a, x), Entry::Immediate(b, y)) => a == b && x == y,
            _ => false,
        }
    }
}

/// Flatten a snapshot into its ordered entry list
pub fn flatten(record: &SnapshotRecord) -> Vec<Entry> {
    let sizes = record.sizes();
    let mut entries = Vec::with_capacity(sizes.n_nodes + sizes.n_immediate);

    entries.extend(record.node_entries().iter().cloned().map(Entry::Reference));
    entries.extend(
        record
            .immediate_entries()
            .iter()
            .map(|(attr, value)| Entry::Immediate(attr.clone(), value.clone())),
    );

    entries
}

impl SnapshotRecord {
    pub fn flatten(&self) -> Vec<Entry> {
        flatten(self)
    }
}
