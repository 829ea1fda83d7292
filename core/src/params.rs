//! Caller-supplied request options.
//!
//! A `Parameters` value is the option bag for one API call. Values are a
//! closed set of kinds, so validation compares tags instead of inspecting
//! arbitrary runtime types.

use std::collections::HashMap;
use std::fmt;

/// The kind of value a parameter carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Text,
    Integer,
    TextList,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Text => write!(f, "text"),
            ParamKind::Integer => write!(f, "integer"),
            ParamKind::TextList => write!(f, "list of text"),
        }
    }
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    TextList(Vec<String>),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Text(_) => ParamKind::Text,
            ParamValue::Integer(_) => ParamKind::Integer,
            ParamValue::TextList(_) => ParamKind::TextList,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => write!(f, "{s}"),
            ParamValue::Integer(n) => write!(f, "{n}"),
            ParamValue::TextList(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::TextList(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        ParamValue::TextList(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ParamValue {
    fn from(value: [&str; N]) -> Self {
        ParamValue::TextList(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Named option values for one request. Inserting a name twice keeps the
/// last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: HashMap<String, ParamValue>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.values.insert(key.to_string(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
