//! Event subscription
//!
//! The instrumentation runtime raises three kinds of events that services
//! subscribe to with closures. Subscriptions live as long as the table.

use crate::attribute::{Attribute, AttributeStore};
use crate::snapshot::{SnapshotRecord, TriggerInfo};

pub type CreateAttributeFn = Box<dyn Fn(&Attribute) + Send + Sync>;
pub type PostInitFn = Box<dyn Fn(&dyn AttributeStore) + Send + Sync>;
pub type ProcessSnapshotFn = Box<dyn Fn(Option<&TriggerInfo>, &SnapshotRecord) + Send + Sync>;

#[derive(Default)]
pub struct Events {
    create_attribute: Vec<CreateAttributeFn>,
    post_init: Vec<PostInitFn>,
    process_snapshot: Vec<ProcessSnapshotFn>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_create_attribute<F>(&mut self, f: F)
    where
        F: Fn(&Attribute) + Send + Sync + 'static,
    {
        self.create_attribute.push(Box::new(f));
    }

    pub fn connect_post_init<F>(&mut self, f: F)
    where
        F: Fn(&dyn AttributeStore) + Send + Sync + 'static,
    {
        self.post_init.push(Box::new(f));
    }

    pub fn connect_process_snapshot<F>(&mut self, f: F)
    where
        F: Fn(Option<&TriggerInfo>, &SnapshotRecord) + Send + Sync + 'static,
    {
        self.process_snapshot.push(Box::new(f));
    }

    pub fn attribute_created(&self, attr: &Attribute) {
        for f in &self.create_attribute {
            f(attr);
        }
    }

    pub fn post_init(&self, store: &dyn AttributeStore) {
        for f in &self.post_init {
            f(store);
        }
    }

    pub fn snapshot(&self, trigger: Option<&TriggerInfo>, record: &SnapshotRecord) {
        for f in &self.process_snapshot {
            f(trigger, record);
        }
    }
}
