//! Column template language
//!
//! Templates mix literal text with field specifiers:
//!
//! ```text
//! region=%[12]region% %[8r]time.inclusive.duration%
//! ```
//!
//! `%name%` inserts the value of attribute `name`; `%[w]name%` pads it with
//! spaces on the right to at least `w` characters, `%[wr]name%` pads on the
//! left. Values longer than the width are never truncated.

pub mod compile;
pub mod render;

pub use compile::default_template;

/// Field alignment within its column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

/// A field specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub attribute: String,
    /// Minimum width; 0 means no padding
    pub width: usize,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Field(Field),
}

/// Compiled template; read-only once built
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatTemplate {
    segments: Vec<Segment>,
}

impl FormatTemplate {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(f) => Some(f),
            Segment::Literal(_) => None,
        })
    }
}
