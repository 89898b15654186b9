//! Template compilation and default template synthesis

use lazy_regex::{regex, regex_captures};

use super::{Align, Field, FormatTemplate, Segment};
use crate::trigger::TriggerSpec;

/// Total line budget the default template is sized for
const LINE_WIDTH: i64 = 80;
/// Columns reserved for the trailing duration field
const DURATION_COLUMNS: i64 = 10;
pub const DURATION_ATTRIBUTE: &str = "time.inclusive.duration";

impl FormatTemplate {
    /// Compile a template string; never fails
    ///
    /// A `%` without a closing partner is kept as literal text, and a
    /// bracketed prefix that is not `[digits]` or `[digitsr]` is read as part
    /// of the attribute name.
    pub fn compile(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;

        for m in regex!(r"%([^%]*)%").captures_iter(template) {
            let (Some(whole), Some(inner)) = (m.get(0), m.get(1)) else {
                continue;
            };

            if whole.start() > last {
                segments.push(Segment::Literal(template[last..whole.start()].to_string()));
            }
            segments.push(Segment::Field(parse_field(inner.as_str())));
            last = whole.end();
        }

        if last < template.len() {
            segments.push(Segment::Literal(template[last..].to_string()));
        }

        Self { segments }
    }

    /// Compile the configured template, or the default one for `spec` when it is empty
    pub fn from_config(formatstring: &str, spec: &TriggerSpec) -> Self {
        if formatstring.is_empty() {
            let synthesized = default_template(spec);
            log::debug!("Using default format string: {}", synthesized);
            Self::compile(&synthesized)
        } else {
            Self::compile(formatstring)
        }
    }
}

fn parse_field(spec: &str) -> Field {
    match regex_captures!(r"^\[(\d*)(r?)\](.*)$"s, spec) {
        Some((_, width, align, name)) => Field {
            attribute: name.to_string(),
            width: width.parse().unwrap_or(0),
            align: if align.is_empty() { Align::Left } else { Align::Right },
        },
        None => Field {
            attribute: spec.to_string(),
            width: 0,
            align: Align::Left,
        },
    }
}

/// Build a one-line template with a column per trigger attribute
///
/// Columns share what is left of an 80-character line after the names and
/// the trailing duration field.
pub fn default_template(spec: &TriggerSpec) -> String {
    if spec.is_empty() {
        return format!("%{}%", DURATION_ATTRIBUTE);
    }

    let k = spec.len() as i64;
    let name_sizes: i64 = spec.names().map(|s| s.len() as i64).sum();
    let width = ((LINE_WIDTH - DURATION_COLUMNS - name_sizes - 2 * k) / k).max(0);

    let mut out: String = spec
        .names()
        .map(|name| format!("{name}=%[{width}]{name}% "))
        .collect();
    out.push_str(&format!("%[8r]{}%", DURATION_ATTRIBUTE));

    out
}
