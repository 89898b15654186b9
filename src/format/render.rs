//! Rendering flattened entries through a compiled template

use super::{Align, Field, FormatTemplate, Segment};
use crate::snapshot::Entry;

impl FormatTemplate {
    /// Render one line; attributes missing from `entries` render empty
    pub fn render(&self, entries: &[Entry]) -> String {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => {
                    let value = resolve(entries, &field.attribute).unwrap_or_default();
                    pad_into(&mut out, &value, field);
                }
            }
        }

        out
    }
}

/// First entry holding a value for `name` wins
fn resolve(entries: &[Entry], name: &str) -> Option<String> {
    entries.iter().find_map(|entry| entry.text_for(name))
}

fn pad_into(out: &mut String, value: &str, field: &Field) {
    let pad = field.width.saturating_sub(value.chars().count());
    match field.align {
        Align::Left => {
            out.push_str(value);
            out.extend(std::iter::repeat_n(' ', pad));
        }
        Align::Right => {
            out.extend(std::iter::repeat_n(' ', pad));
            out.push_str(value);
        }
    }
}
