//! The netout service
//!
//! Ties the pieces together: trigger registry → flattener → template →
//! sink. Every failure is handled here; nothing propagates to the host.

mod stats;

use std::sync::Arc;

use crate::attribute::{Attribute, AttributeStore};
use crate::config::Config;
use crate::events::Events;
use crate::format::FormatTemplate;
use crate::sink::{DeliveryError, Sink};
use crate::snapshot::{SnapshotRecord, TriggerInfo};
use crate::trigger::{TriggerRegistry, TriggerSpec};

pub use stats::PipelineStats;

/// What happened to one snapshot event
#[derive(Debug)]
pub enum SnapshotOutcome {
    /// No trigger attribute matched; nothing was rendered
    Skipped,
    Delivered,
    Failed(DeliveryError),
}

impl SnapshotOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SnapshotOutcome::Delivered)
    }
}

/// Attribute-triggered snapshot exporter
pub struct NetOut {
    registry: TriggerRegistry,
    template: FormatTemplate,
    sink: Sink,
    counters: stats::Counters,
}

impl NetOut {
    /// Build the service and open the configured sink
    pub fn new(config: &Config) -> Self {
        Self::with_sink(config, Sink::open(&config.sink_config()))
    }

    /// Build the service around an already opened sink
    pub fn with_sink(config: &Config, sink: Sink) -> Self {
        let spec = TriggerSpec::parse(&config.trigger);
        let template = FormatTemplate::from_config(&config.formatstring, &spec);

        if spec.is_empty() {
            log::info!("No trigger attributes configured, no records will be written");
        }
        log::info!(
            "Registered netout service: {} trigger attribute(s), {} sink",
            spec.len(),
            sink.name()
        );

        Self {
            registry: TriggerRegistry::new(spec),
            template,
            sink,
            counters: stats::Counters::default(),
        }
    }

    /// Subscribe the service to the runtime's events
    pub fn register(self: &Arc<Self>, events: &mut Events) {
        let this = Arc::clone(self);
        events.connect_create_attribute(move |attr| this.on_attribute_created(attr));

        let this = Arc::clone(self);
        events.connect_post_init(move |store| this.on_post_init(store));

        let this = Arc::clone(self);
        events.connect_process_snapshot(move |trigger, record| {
            this.process_snapshot(trigger, record);
        });
    }

    pub fn on_attribute_created(&self, attr: &Attribute) {
        self.registry.on_attribute_created(attr);
    }

    /// Register trigger attributes created before the service subscribed
    pub fn on_post_init(&self, store: &dyn AttributeStore) {
        let found = self.registry.backfill(store);
        if found > 0 {
            log::debug!("Picked up {} pre-existing trigger attribute(s)", found);
        }
    }

    /// Attribute that makes this snapshot reportable, if any
    pub fn match_trigger(&self, trigger: &TriggerInfo, record: &SnapshotRecord) -> Option<Attribute> {
        let attr = self.registry.match_trigger(trigger)?;
        // A trigger event without the trigger value in the snapshot is not reportable
        record.get(&attr).map(|_| attr)
    }

    /// Render a snapshot into one record line
    pub fn render(&self, record: &SnapshotRecord) -> String {
        self.template.render(&record.flatten())
    }

    /// Handle one snapshot event
    pub fn process_snapshot(&self, trigger: Option<&TriggerInfo>, record: &SnapshotRecord) -> SnapshotOutcome {
        self.counters.snapshot_seen();

        let Some(attr) = trigger.and_then(|t| self.match_trigger(t, record)) else {
            return SnapshotOutcome::Skipped;
        };
        self.counters.matched();

        let line = self.render(record);
        log::trace!("Record for {}: {}", attr.name(), line);

        match self.sink.deliver(&line) {
            Ok(()) => {
                self.counters.delivered();
                SnapshotOutcome::Delivered
            }
            Err(e) => {
                self.counters.failed();
                log::warn!("Failed to deliver record for {}: {}", attr.name(), e);
                SnapshotOutcome::Failed(e)
            }
        }
    }

    pub fn template(&self) -> &FormatTemplate {
        &self.template
    }

    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn stats(&self) -> PipelineStats {
        self.counters.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttrId, AttrProperties, AttrType, AttributeDb};
    use crate::snapshot::ContextTree;
    use parking_lot::Mutex;
    use std::io::{self, Write};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).to_string()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn config(trigger: &str, formatstring: &str) -> Config {
        Config {
            trigger: trigger.to_string(),
            formatstring: formatstring.to_string(),
            ..Config::default()
        }
    }

    fn attr(id: u64, name: &str, ty: AttrType) -> Attribute {
        Attribute::new(AttrId(id), name, ty, AttrProperties::DEFAULT)
    }

    #[test]
    fn test_matched_snapshot_is_rendered_and_delivered() {
        let buf = SharedBuf::default();
        let netout = NetOut::with_sink(
            &config("region", "region=%region% t=%time.inclusive.duration%"),
            Sink::from_writer(buf.clone()),
        );

        let region = attr(0, "region", AttrType::String);
        let duration = attr(1, "time.inclusive.duration", AttrType::Uint);
        netout.on_attribute_created(&region);
        netout.on_attribute_created(&duration);

        let record = SnapshotRecord::new()
            .with_immediate(region.clone(), "init")
            .with_immediate(duration, 120u64);

        let outcome = netout.process_snapshot(Some(&TriggerInfo::end(region.id())), &record);
        assert!(outcome.is_delivered());
        assert_eq!(buf.contents(), "region=init t=120\n");
    }

    #[test]
    fn test_missing_trigger_info_is_skipped() {
        let buf = SharedBuf::default();
        let netout = NetOut::with_sink(&config("region", ""), Sink::from_writer(buf.clone()));
        let region = attr(0, "region", AttrType::String);
        netout.on_attribute_created(&region);

        let record = SnapshotRecord::new().with_immediate(region, "init");
        assert!(matches!(netout.process_snapshot(None, &record), SnapshotOutcome::Skipped));
        assert_eq!(buf.contents(), "");
    }

    #[test]
    fn test_trigger_value_absent_from_snapshot_is_skipped() {
        let buf = SharedBuf::default();
        let netout = NetOut::with_sink(&config("region", ""), Sink::from_writer(buf.clone()));
        let region = attr(0, "region", AttrType::String);
        netout.on_attribute_created(&region);

        let record = SnapshotRecord::new().with_immediate(attr(1, "other", AttrType::String), "x");
        let outcome = netout.process_snapshot(Some(&TriggerInfo::end(region.id())), &record);
        assert!(matches!(outcome, SnapshotOutcome::Skipped));
        assert_eq!(buf.contents(), "");
    }

    #[test]
    fn test_trigger_value_found_in_tree() {
        let buf = SharedBuf::default();
        let netout = NetOut::with_sink(&config("loop", "%loop%"), Sink::from_writer(buf.clone()));
        let tree = ContextTree::new();
        let loop_attr = attr(0, "loop", AttrType::String);
        let function = attr(1, "function", AttrType::String);
        netout.on_attribute_created(&loop_attr);

        let (main, outer) = (crate::attribute::Value::from("main"), crate::attribute::Value::from("outer"));
        let leaf = tree.get_path([(&function, &main), (&loop_attr, &outer)]).unwrap();
        let record = SnapshotRecord::new().with_node(leaf);

        assert!(netout.process_snapshot(Some(&TriggerInfo::set(loop_attr.id())), &record).is_delivered());
        assert_eq!(buf.contents(), "outer\n");
    }

    #[test]
    fn test_failed_delivery_is_counted() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let netout = NetOut::with_sink(&config("a", ""), Sink::from_writer(Closed));
        let a = attr(0, "a", AttrType::Int);
        netout.on_attribute_created(&a);
        let record = SnapshotRecord::new().with_immediate(a.clone(), 1i64);

        for _ in 0..2 {
            let outcome = netout.process_snapshot(Some(&TriggerInfo::end(a.id())), &record);
            assert!(matches!(outcome, SnapshotOutcome::Failed(DeliveryError::Io(_))));
        }

        let stats = netout.stats();
        assert_eq!(stats.snapshots, 2);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.delivered, 0);
    }

    #[test]
    fn test_register_wires_events() {
        let buf = SharedBuf::default();
        let netout = Arc::new(NetOut::with_sink(&config("region", "%region%"), Sink::from_writer(buf.clone())));
        let mut events = Events::new();
        netout.register(&mut events);

        let db = AttributeDb::new();
        let region = db.create_attribute("region", AttrType::String, AttrProperties::DEFAULT);
        events.attribute_created(&region);

        let record = SnapshotRecord::new().with_immediate(region.clone(), "solve");
        events.snapshot(Some(&TriggerInfo::end(region.id())), &record);
        events.snapshot(Some(&TriggerInfo::begin(region.id())), &record);

        assert_eq!(buf.contents(), "solve\n");
        let stats = netout.stats();
        assert_eq!(stats.snapshots, 2);
        assert_eq!(stats.dropped(), 1);
    }

    #[test]
    fn test_post_init_backfills_registry() {
        let netout = NetOut::with_sink(&config("region", ""), Sink::discard());
        let db = AttributeDb::new();
        let region = db.create_attribute("region", AttrType::String, AttrProperties::DEFAULT);

        assert!(netout.registry().is_empty());
        netout.on_post_init(&db);
        assert_eq!(netout.registry().match_trigger(&TriggerInfo::end(region.id())), Some(region));
    }

    #[test]
    fn test_default_template_used_without_formatstring() {
        let netout = NetOut::with_sink(&config("a:b", ""), Sink::discard());
        let widths: Vec<usize> = netout.template().fields().map(|f| f.width).collect();
        assert_eq!(widths, vec![32, 32, 8]);
        assert!(netout.sink().is_discard());
    }
}
