use std::collections::HashMap;

use crate::error::{WcsError, WcsResult};

/// Read access to header keywords, independent of the file format.
///
/// Implementations are expected to return integer-valued keywords from
/// `get_float` as well, since writers are free to drop the decimal point.
pub trait KeywordProvider {
    fn get_string(&self, key: &str) -> Option<String>;
    fn get_float(&self, key: &str) -> Option<f64>;
    fn get_int(&self, key: &str) -> Option<i64>;

    fn has(&self, key: &str) -> bool {
        self.get_string(key).is_some() || self.get_float(key).is_some()
    }

    fn require_float(&self, key: &str) -> WcsResult<f64> {
        self.get_float(key)
            .ok_or_else(|| WcsError::missing_keyword(key))
    }

    fn require_string(&self, key: &str) -> WcsResult<String> {
        self.get_string(key)
            .ok_or_else(|| WcsError::missing_keyword(key))
    }

    fn require_int(&self, key: &str) -> WcsResult<i64> {
        self.get_int(key)
            .ok_or_else(|| WcsError::missing_keyword(key))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum MapValue {
    Text(String),
    Real(f64),
    Integer(i64),
}

/// In-memory keyword set, mostly for building models in tests and callers
/// that do not hold a file header.
#[derive(Debug, Clone, Default)]
pub struct KeywordMap {
    values: HashMap<String, MapValue>,
}

impl KeywordMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values
            .insert(key.into().to_ascii_uppercase(), MapValue::Text(value.into()));
        self
    }

    pub fn set_float(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.values
            .insert(key.into().to_ascii_uppercase(), MapValue::Real(value));
        self
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.values
            .insert(key.into().to_ascii_uppercase(), MapValue::Integer(value));
        self
    }

    fn lookup(&self, key: &str) -> Option<&MapValue> {
        self.values.get(&key.to_ascii_uppercase())
    }
}

impl KeywordProvider for KeywordMap {
    fn get_string(&self, key: &str) -> Option<String> {
        match self.lookup(key)? {
            MapValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn get_float(&self, key: &str) -> Option<f64> {
        match self.lookup(key)? {
            MapValue::Real(v) => Some(*v),
            MapValue::Integer(v) => Some(*v as f64),
            MapValue::Text(_) => None,
        }
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        match self.lookup(key)? {
            MapValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}
