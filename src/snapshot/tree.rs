//! Shared context tree

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::attribute::{Attribute, Value};

/// One attribute/value pair in the context tree
///
/// Nodes are immutable once created and shared between snapshots.
#[derive(Debug)]
pub struct Node {
    id: u64,
    attribute: Attribute,
    value: Value,
    parent: Option<Arc<Node>>,
}

impl Node {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn parent(&self) -> Option<&Arc<Node>> {
        self.parent.as_ref()
    }

    /// Iterate from this node up to the root
    pub fn path(self: &Arc<Self>) -> impl Iterator<Item = &Arc<Node>> {
        std::iter::successors(Some(self), |node| node.parent.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NodeKey {
    parent: Option<u64>,
    attribute: u64,
    value: String,
}

/// Interning store for context tree nodes
#[derive(Default)]
pub struct ContextTree {
    nodes: Mutex<HashMap<NodeKey, Arc<Node>>>,
}

impl ContextTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the child of `parent` holding `attr=value`, creating it if needed
    pub fn get_child(&self, parent: Option<&Arc<Node>>, attr: &Attribute, value: &Value) -> Arc<Node> {
        let key = NodeKey {
            parent: parent.map(|p| p.id),
            attribute: attr.id().0,
            value: format!("{:?}", value),
        };

        let mut nodes = self.nodes.lock();
        let next_id = nodes.len() as u64;

        nodes
            .entry(key)
            .or_insert_with(|| {
                Arc::new(Node {
                    id: next_id,
                    attribute: attr.clone(),
                    value: value.clone(),
                    parent: parent.cloned(),
                })
            })
            .clone()
    }

    /// Return the leaf node for a root-to-leaf path, or `None` for an empty path
    pub fn get_path<'a, I>(&self, path: I) -> Option<Arc<Node>>
    where
        I: IntoIterator<Item = (&'a Attribute, &'a Value)>,
    {
        path.into_iter()
            .fold(None, |parent, (attr, value)| Some(self.get_child(parent.as_ref(), attr, value)))
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
