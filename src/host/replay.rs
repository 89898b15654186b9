//! Replay of recorded host activity
//!
//! # Format
//!
//! One JSON object per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! {"op": "attribute", "name": "region", "type": "string", "skip_events": false}
//! {"op": "begin", "attr": "region", "value": "init"}
//! {"op": "set", "attr": "iteration", "value": 3, "as_value": true}
//! {"op": "end", "attr": "region", "duration": 120}
//! ```

use eyre::{Context, Result};
use serde::Deserialize;
use std::io::BufRead;

use super::Host;
use crate::attribute::{AttrProperties, AttrType, Value};

/// One recorded host call
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum HostEvent {
    Attribute {
        name: String,
        #[serde(rename = "type", default = "default_type")]
        ty: AttrType,
        #[serde(flatten)]
        flags: Flags,
    },
    Begin {
        attr: String,
        value: Value,
        #[serde(flatten)]
        flags: Flags,
    },
    Set {
        attr: String,
        value: Value,
        #[serde(flatten)]
        flags: Flags,
    },
    End {
        attr: String,
        #[serde(default)]
        duration: Option<u64>,
    },
}

/// Attribute properties as they appear in the replay log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Flags {
    pub skip_events: bool,
    pub as_value: bool,
    pub hidden: bool,
}

impl Flags {
    pub fn properties(&self) -> AttrProperties {
        let mut props = AttrProperties::DEFAULT;
        if self.skip_events {
            props = props | AttrProperties::SKIP_EVENTS;
        }
        if self.as_value {
            props = props | AttrProperties::AS_VALUE;
        }
        if self.hidden {
            props = props | AttrProperties::HIDDEN;
        }
        props
    }
}

fn default_type() -> AttrType {
    AttrType::String
}

impl HostEvent {
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line).context("Invalid host event")
    }

    /// Apply this call to the host
    pub fn apply(&self, host: &Host) -> bool {
        match self {
            HostEvent::Attribute { name, ty, flags } => {
                host.create_attribute(name, *ty, flags.properties());
                true
            }
            HostEvent::Begin { attr, value, flags } => {
                host.begin(attr, value.clone(), flags.properties());
                true
            }
            HostEvent::Set { attr, value, flags } => {
                host.set(attr, value.clone(), flags.properties());
                true
            }
            HostEvent::End { attr, duration } => host.end(attr, *duration),
        }
    }
}

/// Counts of replayed host calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    pub applied: usize,
    /// Calls the host rejected, such as an end without a begin
    pub rejected: usize,
}

/// Feed every event from `reader` into `host`
///
/// Stops at the first line that does not parse.
pub fn replay<R: BufRead>(reader: R, host: &Host) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read replay input")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let event = HostEvent::parse(trimmed).with_context(|| format!("line {}", index + 1))?;
        if event.apply(host) {
            summary.applied += 1;
        } else {
            summary.rejected += 1;
        }
    }

    Ok(summary)
}
