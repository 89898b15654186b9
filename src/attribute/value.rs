//! Typed attribute values

use serde::{Deserialize, Serialize};
use std::fmt;

use super::AttrType;

/// Largest integer magnitude an `f64` holds exactly
const EXACT_F64: u64 = 1 << 53;

/// A single attribute value as recorded by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Uint(u64),
    Int(i64),
    Double(f64),
    Str(String),
}

impl Value {
    /// The attribute type a value of this shape would be declared with
    pub fn inferred_type(&self) -> AttrType {
        match self {
            Value::Bool(_) => AttrType::Bool,
            Value::Uint(_) => AttrType::Uint,
            Value::Int(_) => AttrType::Int,
            Value::Double(_) => AttrType::Double,
            Value::Str(_) => AttrType::String,
        }
    }

    /// Render the value the way the declared attribute type prints it
    pub fn to_text(&self, ty: AttrType) -> String {
        match (ty, self) {
            (AttrType::Addr, Value::Uint(v)) => format!("0x{:x}", v),
            (AttrType::Addr, Value::Int(v)) => format!("0x{:x}", v),
            (AttrType::Bool, Value::Uint(v)) => (*v != 0).to_string(),
            (AttrType::Bool, Value::Int(v)) => (*v != 0).to_string(),
            (AttrType::Double, Value::Uint(v)) if *v <= EXACT_F64 => (*v as f64).to_string(),
            (AttrType::Double, Value::Int(v)) if v.unsigned_abs() <= EXACT_F64 => (*v as f64).to_string(),
            (AttrType::Int, Value::Uint(v)) => match i64::try_from(*v) {
                Ok(i) => i.to_string(),
                Err(_) => self.to_string(),
            },
            (AttrType::Uint, Value::Int(v)) => match u64::try_from(*v) {
                Ok(u) => u.to_string(),
                Err(_) => self.to_string(),
            },
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Uint(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Str(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}
