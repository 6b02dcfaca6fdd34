//! Property value types for graph nodes

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Property value type
///
/// Integers and floats are both "numbers" and compare with each other;
/// every other cross-type pair is incomparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Integer(i) => Some(*i as f64),
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Variant name, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::Null => "Null",
        }
    }

    /// Equality across property types.
    ///
    /// Returns `None` when either side is null. Values of different types are
    /// never equal, except integer/float pairs which compare numerically.
    pub fn loose_eq(&self, other: &PropertyValue) -> Option<bool> {
        match (self, other) {
            (PropertyValue::Null, _) | (_, PropertyValue::Null) => None,
            (PropertyValue::Integer(l), PropertyValue::Integer(r)) => Some(l == r),
            (PropertyValue::String(l), PropertyValue::String(r)) => Some(l == r),
            (PropertyValue::Boolean(l), PropertyValue::Boolean(r)) => Some(l == r),
            (l, r) => match (l.as_number(), r.as_number()) {
                (Some(l), Some(r)) => Some(l == r),
                _ => Some(false),
            },
        }
    }

    /// Ordering between two values of the same type (numbers count as one type).
    ///
    /// Returns `None` for nulls, NaN and mismatched types.
    pub fn loose_cmp(&self, other: &PropertyValue) -> Option<Ordering> {
        match (self, other) {
            (PropertyValue::Integer(l), PropertyValue::Integer(r)) => Some(l.cmp(r)),
            (PropertyValue::String(l), PropertyValue::String(r)) => Some(l.cmp(r)),
            (PropertyValue::Boolean(l), PropertyValue::Boolean(r)) => Some(l.cmp(r)),
            (l, r) => match (l.as_number(), r.as_number()) {
                (Some(l), Some(r)) => l.partial_cmp(&r),
                _ => None,
            },
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "\"{}\"", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Null => write!(f, "null"),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

impl From<usize> for PropertyValue {
    fn from(i: usize) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

/// Property map for storing node properties
pub type PropertyMap = HashMap<String, PropertyValue>;
