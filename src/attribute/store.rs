//! Attribute store seam and an in-memory implementation

use parking_lot::RwLock;
use std::collections::HashMap;

use super::{AttrId, AttrProperties, AttrType, Attribute};

/// Attribute create/query API provided by the instrumentation runtime
pub trait AttributeStore: Send + Sync {
    /// Create an attribute, or return the existing one with the same name
    fn create_attribute(&self, name: &str, ty: AttrType, properties: AttrProperties) -> Attribute;
    fn find_attribute(&self, name: &str) -> Option<Attribute>;
    fn attribute(&self, id: AttrId) -> Option<Attribute>;
}

#[derive(Default)]
struct Tables {
    by_name: HashMap<String, Attribute>,
    by_id: Vec<Attribute>,
}

/// Thread-safe attribute database with sequential ids
#[derive(Default)]
pub struct AttributeDb {
    tables: RwLock<Tables>,
}

impl AttributeDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an attribute, reporting whether it did not exist before
    pub fn create(&self, name: &str, ty: AttrType, properties: AttrProperties) -> (Attribute, bool) {
        let mut tables = self.tables.write();

        if let Some(existing) = tables.by_name.get(name) {
            return (existing.clone(), false);
        }

        let attr = Attribute::new(AttrId(tables.by_id.len() as u64), name, ty, properties);
        tables.by_name.insert(name.to_string(), attr.clone());
        tables.by_id.push(attr.clone());

        log::debug!("Created attribute {} ({})", name, attr.id());
        (attr, true)
    }

    pub fn len(&self) -> usize {
        self.tables.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttributeStore for AttributeDb {
    fn create_attribute(&self, name: &str, ty: AttrType, properties: AttrProperties) -> Attribute {
        self.create(name, ty, properties).0
    }

    fn find_attribute(&self, name: &str) -> Option<Attribute> {
        self.tables.read().by_name.get(name).cloned()
    }

    fn attribute(&self, id: AttrId) -> Option<Attribute> {
        self.tables.read().by_id.get(id.0 as usize).cloned()
    }
}
