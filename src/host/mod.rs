//! In-process instrumentation host
//!
//! A small runtime that owns the attribute store, the context tree and the
//! event table, and turns begin/set/end calls into snapshot events. It is
//! what `netout replay` drives, and what the integration tests use to feed
//! the pipeline the way a real instrumented program would.

pub mod replay;

use parking_lot::Mutex;
use std::time::Instant;

use crate::attribute::{AttrProperties, AttrType, Attribute, AttributeDb, AttributeStore, Value};
use crate::events::Events;
use crate::format::compile::DURATION_ATTRIBUTE;
use crate::snapshot::{ContextTree, SnapshotRecord, TriggerInfo};

pub use replay::{HostEvent, ReplaySummary, replay};

struct Frame {
    attr: Attribute,
    value: Value,
    started: Instant,
}

/// Currently open attribute values
#[derive(Default)]
struct Blackboard {
    /// Tree-stored values, outermost first
    path: Vec<Frame>,
    /// Values stored with each snapshot
    immediate: Vec<Frame>,
}

impl Blackboard {
    fn frames_for(&mut self, attr: &Attribute) -> &mut Vec<Frame> {
        if attr.store_as_value() { &mut self.immediate } else { &mut self.path }
    }

    fn innermost(&self, attr: &Attribute) -> Option<usize> {
        let list = if attr.store_as_value() { &self.immediate } else { &self.path };
        list.iter().rposition(|f| &f.attr == attr)
    }
}

pub struct Host {
    db: AttributeDb,
    tree: ContextTree,
    events: Events,
    blackboard: Mutex<Blackboard>,
    duration_attr: Attribute,
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    pub fn new() -> Self {
        let db = AttributeDb::new();
        let duration_attr = db.create_attribute(
            DURATION_ATTRIBUTE,
            AttrType::Uint,
            AttrProperties::AS_VALUE | AttrProperties::SKIP_EVENTS,
        );

        Self {
            db,
            tree: ContextTree::new(),
            events: Events::new(),
            blackboard: Mutex::new(Blackboard::default()),
            duration_attr,
        }
    }

    /// Event table for services to subscribe to before [`Host::init`]
    pub fn events_mut(&mut self) -> &mut Events {
        &mut self.events
    }

    pub fn store(&self) -> &AttributeDb {
        &self.db
    }

    /// Finish initialization; raises the post-init event
    pub fn init(&self) {
        self.events.post_init(&self.db);
    }

    /// Create an attribute, raising the creation event the first time
    pub fn create_attribute(&self, name: &str, ty: AttrType, properties: AttrProperties) -> Attribute {
        let (attr, created) = self.db.create(name, ty, properties);
        if created {
            self.events.attribute_created(&attr);
        }
        attr
    }

    /// Open a value for `name`, creating the attribute on first use
    pub fn begin(&self, name: &str, value: Value, properties: AttrProperties) -> Attribute {
        let attr = self.create_attribute(name, value.inferred_type(), properties);

        let record = {
            let mut board = self.blackboard.lock();
            board.frames_for(&attr).push(Frame {
                attr: attr.clone(),
                value,
                started: Instant::now(),
            });
            self.capture(&board, None)
        };

        self.raise(&attr, TriggerInfo::begin(attr.id()), &record);
        attr
    }

    /// Replace the innermost value for `name`, or open one if none is active
    pub fn set(&self, name: &str, value: Value, properties: AttrProperties) -> Attribute {
        let attr = self.create_attribute(name, value.inferred_type(), properties);

        let record = {
            let mut board = self.blackboard.lock();
            match board.innermost(&attr) {
                Some(i) => board.frames_for(&attr)[i].value = value,
                None => board.frames_for(&attr).push(Frame {
                    attr: attr.clone(),
                    value,
                    started: Instant::now(),
                }),
            }
            self.capture(&board, None)
        };

        self.raise(&attr, TriggerInfo::set(attr.id()), &record);
        attr
    }

    /// Close the innermost value for `name`
    ///
    /// The end snapshot still contains the closing value plus its inclusive
    /// duration in microseconds, measured unless `duration` is given.
    /// Returns false when nothing was open for `name`.
    pub fn end(&self, name: &str, duration: Option<u64>) -> bool {
        let Some(attr) = self.db.find_attribute(name) else {
            log::warn!("end() for unknown attribute {}", name);
            return false;
        };

        let record = {
            let mut board = self.blackboard.lock();
            let Some(i) = board.innermost(&attr) else {
                log::warn!("end() for {} without matching begin()", name);
                return false;
            };

            let started = board.frames_for(&attr)[i].started;
            let elapsed = duration.unwrap_or_else(|| started.elapsed().as_micros() as u64);
            let record = self.capture(&board, Some(elapsed));
            board.frames_for(&attr).remove(i);
            record
        };

        self.raise(&attr, TriggerInfo::end(attr.id()), &record);
        true
    }

    /// Snapshot of the current values without raising an event
    pub fn snapshot(&self) -> SnapshotRecord {
        self.capture(&self.blackboard.lock(), None)
    }

    fn capture(&self, board: &Blackboard, duration: Option<u64>) -> SnapshotRecord {
        let mut record = SnapshotRecord::new();

        if let Some(leaf) = self.tree.get_path(board.path.iter().map(|f| (&f.attr, &f.value))) {
            record.push_node(leaf);
        }
        for frame in &board.immediate {
            record.push_immediate(frame.attr.clone(), frame.value.clone());
        }
        if let Some(us) = duration {
            record.push_immediate(self.duration_attr.clone(), us);
        }

        record
    }

    fn raise(&self, attr: &Attribute, trigger: TriggerInfo, record: &SnapshotRecord) {
        if !attr.skip_events() {
            self.events.snapshot(Some(&trigger), record);
        }
    }
}
