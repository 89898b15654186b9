//! Render a single record from the command line

use eyre::{Result, eyre};

use netout::Config;
use netout::attribute::{AttrProperties, AttributeDb, Value};
use netout::format::FormatTemplate;
use netout::snapshot::SnapshotRecord;
use netout::trigger::TriggerSpec;

pub fn run(format: Option<&str>, trigger: Option<&str>, entries: &[String], config: &Config) -> Result<()> {
    let spec = TriggerSpec::parse(trigger.unwrap_or(&config.trigger));
    let template = FormatTemplate::from_config(format.unwrap_or(&config.formatstring), &spec);

    let record = build_record(entries)?;
    println!("{}", template.render(&record.flatten()));

    Ok(())
}

fn build_record(entries: &[String]) -> Result<SnapshotRecord> {
    let db = AttributeDb::new();
    let mut record = SnapshotRecord::new();

    for entry in entries {
        let (name, raw) = entry
            .split_once('=')
            .ok_or_else(|| eyre!("Expected NAME=VALUE, got '{}'", entry))?;
        let value = parse_value(raw);
        let (attr, _) = db.create(name, value.inferred_type(), AttrProperties::AS_VALUE);
        record.push_immediate(attr, value);
    }

    Ok(record)
}

fn parse_value(raw: &str) -> Value {
    if let Ok(v) = raw.parse::<u64>() {
        Value::Uint(v)
    } else if let Ok(v) = raw.parse::<i64>() {
        Value::Int(v)
    } else if let Ok(v) = raw.parse::<f64>() {
        Value::Double(v)
    } else {
        Value::from(raw)
    }
}
