//! Attribute model
//!
//! Attributes are the named, typed dimensions a host records values for.
//! The pipeline only ever looks attributes up; creating them belongs to the
//! attribute store behind the [`AttributeStore`] trait.

pub mod store;
pub mod value;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

pub use store::{AttributeDb, AttributeStore};
pub use value::Value;

/// Stable attribute identifier, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttrId(pub u64);

impl fmt::Display for AttrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    #[default]
    Inv,
    Usr,
    Int,
    Uint,
    String,
    Addr,
    Double,
    Bool,
    Type,
}

impl AttrType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inv" => Some(Self::Inv),
            "usr" => Some(Self::Usr),
            "int" => Some(Self::Int),
            "uint" => Some(Self::Uint),
            "string" | "str" => Some(Self::String),
            "addr" => Some(Self::Addr),
            "double" => Some(Self::Double),
            "bool" => Some(Self::Bool),
            "type" => Some(Self::Type),
            _ => None,
        }
    }
}

/// Attribute property bitset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AttrProperties(pub u32);

impl AttrProperties {
    pub const DEFAULT: Self = Self(0);
    /// Values are stored with the snapshot instead of in the context tree
    pub const AS_VALUE: Self = Self(0x1);
    pub const NESTED: Self = Self(0x2);
    /// Begin/set/end on this attribute do not raise snapshot events
    pub const SKIP_EVENTS: Self = Self(0x8);
    pub const HIDDEN: Self = Self(0x10);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AttrProperties {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug)]
struct AttributeInner {
    id: AttrId,
    name: String,
    ty: AttrType,
    properties: AttrProperties,
}

/// Handle to an attribute owned by the attribute store
///
/// Cloning is cheap; every clone refers to the same attribute record.
#[derive(Debug, Clone)]
pub struct Attribute {
    inner: Arc<AttributeInner>,
}

impl Attribute {
    pub fn new(id: AttrId, name: impl Into<String>, ty: AttrType, properties: AttrProperties) -> Self {
        Self {
            inner: Arc::new(AttributeInner {
                id,
                name: name.into(),
                ty,
                properties,
            }),
        }
    }

    pub fn id(&self) -> AttrId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn ty(&self) -> AttrType {
        self.inner.ty
    }

    pub fn properties(&self) -> AttrProperties {
        self.inner.properties
    }

    pub fn skip_events(&self) -> bool {
        self.inner.properties.contains(AttrProperties::SKIP_EVENTS)
    }

    pub fn store_as_value(&self) -> bool {
        self.inner.properties.contains(AttrProperties::AS_VALUE)
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Attribute {}
