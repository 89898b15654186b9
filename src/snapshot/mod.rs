//! Context tree and snapshot records
//!
//! A snapshot is two parallel lists: references into the shared context tree
//! (each node carries one attribute/value pair and a parent link) and a flat
//! list of immediate attribute/value pairs that are not part of the tree.

pub mod flatten;
pub mod tree;

use std::sync::Arc;

use crate::attribute::{AttrId, Attribute, Value};

pub use flatten::Entry;
pub use tree::{ContextTree, Node};

/// Entry counts of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sizes {
    pub n_nodes: usize,
    pub n_immediate: usize,
}

/// Point-in-time capture of the active attribute values
#[derive(Debug, Clone, Default)]
pub struct SnapshotRecord {
    nodes: Vec<Arc<Node>>,
    immediate: Vec<(Attribute, Value)>,
}

impl SnapshotRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_node(&mut self, node: Arc<Node>) {
        self.nodes.push(node);
    }

    pub fn push_immediate(&mut self, attr: Attribute, value: impl Into<Value>) {
        self.immediate.push((attr, value.into()));
    }

    pub fn with_node(mut self, node: Arc<Node>) -> Self {
        self.push_node(node);
        self
    }

    pub fn with_immediate(mut self, attr: Attribute, value: impl Into<Value>) -> Self {
        self.push_immediate(attr, value);
        self
    }

    pub fn sizes(&self) -> Sizes {
        Sizes {
            n_nodes: self.nodes.len(),
            n_immediate: self.immediate.len(),
        }
    }

    pub fn node_entries(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn immediate_entries(&self) -> &[(Attribute, Value)] {
        &self.immediate
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.immediate.is_empty()
    }

    /// Find the entry holding a value for `attr`
    ///
    /// Immediate entries are checked before the node chains; for a node
    /// reference the innermost node carrying the attribute is returned.
    pub fn get(&self, attr: &Attribute) -> Option<Entry> {
        if let Some((a, v)) = self.immediate.iter().find(|(a, _)| a == attr) {
            return Some(Entry::Immediate(a.clone(), v.clone()));
        }

        self.nodes
            .iter()
            .find_map(|leaf| leaf.path().find(|node| node.attribute() == attr).cloned())
            .map(Entry::Reference)
    }
}

/// Event metadata describing what raised a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerInfo {
    pub begin_event: Option<AttrId>,
    pub set_event: Option<AttrId>,
    pub end_event: Option<AttrId>,
}

impl TriggerInfo {
    pub fn begin(id: AttrId) -> Self {
        Self {
            begin_event: Some(id),
            ..Self::default()
        }
    }

    pub fn set(id: AttrId) -> Self {
        Self {
            set_event: Some(id),
            ..Self::default()
        }
    }

    pub fn end(id: AttrId) -> Self {
        Self {
            end_event: Some(id),
            ..Self::default()
        }
    }

    /// The attribute whose event decides reportability; end wins over set
    pub fn event_attribute(&self) -> Option<AttrId> {
        self.end_event.or(self.set_event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttrProperties, AttrType};

    fn attr(id: u64, name: &str) -> Attribute {
        Attribute::new(AttrId(id), name, AttrType::String, AttrProperties::DEFAULT)
    }

    #[test]
    fn test_get_prefers_immediate() {
        let tree = ContextTree::new();
        let region = attr(0, "region");
        let node = tree.get_child(None, &region, &Value::from("tree"));
        let record = SnapshotRecord::new()
            .with_node(node)
            .with_immediate(region.clone(), "immediate");

        match record.get(&region) {
            Some(Entry::Immediate(_, v)) => assert_eq!(v, Value::from("immediate")),
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn test_get_walks_parent_chain() {
        let tree = ContextTree::new();
        let function = attr(0, "function");
        let phase = attr(1, "phase");
        let root = tree.get_child(None, &phase, &Value::from("solve"));
        let leaf = tree.get_child(Some(&root), &function, &Value::from("main"));
        let record = SnapshotRecord::new().with_node(leaf);

        match record.get(&phase) {
            Some(Entry::Reference(node)) => assert_eq!(node.value(), &Value::from("solve")),
            other => panic!("unexpected entry: {:?}", other),
        }
        assert!(record.get(&attr(7, "missing")).is_none());
    }

    #[test]
    fn test_sizes() {
        let record = SnapshotRecord::new().with_immediate(attr(0, "a"), 1u64);
        assert_eq!(
            record.sizes(),
            Sizes {
                n_nodes: 0,
                n_immediate: 1
            }
        );
        assert!(SnapshotRecord::new().is_empty());
    }

    #[test]
    fn test_trigger_info_end_takes_precedence() {
        let info = TriggerInfo {
            begin_event: None,
            set_event: Some(AttrId(1)),
            end_event: Some(AttrId(2)),
        };
        assert_eq!(info.event_attribute(), Some(AttrId(2)));
        assert_eq!(TriggerInfo::set(AttrId(4)).event_attribute(), Some(AttrId(4)));
        assert_eq!(TriggerInfo::begin(AttrId(4)).event_attribute(), None);
    }
}
