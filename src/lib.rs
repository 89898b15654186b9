//! Attribute-triggered snapshot export
//!
//! When an instrumented program records a snapshot because a trigger
//! attribute was set or ended, netout flattens the snapshot, renders it
//! through a column template and ships the line to a stream or an HTTP
//! collector.

pub mod attribute;
pub mod config;
pub mod events;
pub mod format;
pub mod host;
pub mod pipeline;
pub mod sink;
pub mod snapshot;
pub mod trigger;

pub use config::Config;
pub use pipeline::{NetOut, PipelineStats, SnapshotOutcome};
