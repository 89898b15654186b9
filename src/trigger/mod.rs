//! Trigger attributes
//!
//! The trigger list names the attributes whose set/end events cause a
//! snapshot to be exported. Attribute ids are only known once the host
//! creates the attributes, so the registry is filled in as they appear.

use indexmap::IndexSet;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::attribute::{AttrId, Attribute, AttributeStore};
use crate::snapshot::TriggerInfo;

/// Ordered set of trigger attribute names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSpec {
    names: IndexSet<String>,
}

impl TriggerSpec {
    /// Parse a colon-separated name list; empty items are skipped, first occurrence wins
    pub fn parse(list: &str) -> Self {
        let names = list
            .split(':')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Live trigger attributes keyed by id
///
/// Only grows. Written from attribute-creation events, read on every snapshot.
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    spec: TriggerSpec,
    attrs: RwLock<HashMap<AttrId, Attribute>>,
}

impl TriggerRegistry {
    pub fn new(spec: TriggerSpec) -> Self {
        Self {
            spec,
            attrs: RwLock::new(HashMap::new()),
        }
    }

    pub fn spec(&self) -> &TriggerSpec {
        &self.spec
    }

    /// Record a newly created attribute if it is a trigger; returns whether it was inserted
    pub fn on_attribute_created(&self, attr: &Attribute) -> bool {
        if attr.skip_events() || !self.spec.contains(attr.name()) {
            return false;
        }

        let mut attrs = self.attrs.write();
        if attrs.contains_key(&attr.id()) {
            return false;
        }

        attrs.insert(attr.id(), attr.clone());
        log::debug!("Registered trigger attribute {} ({})", attr.name(), attr.id());
        true
    }

    /// Pick up trigger attributes that existed before the registry was subscribed
    pub fn backfill(&self, store: &dyn AttributeStore) -> usize {
        let found: Vec<Attribute> = self.spec.names().filter_map(|name| store.find_attribute(name)).collect();

        found.iter().filter(|attr| self.on_attribute_created(attr)).count()
    }

    /// Look up the attribute named by the snapshot's end (or else set) event
    pub fn match_trigger(&self, info: &TriggerInfo) -> Option<Attribute> {
        let id = info.event_attribute()?;
        self.attrs.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.attrs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
