//! Record and Value types
//!
//! A [`Record`] is a map of named fields to [`Value`]s. Records are never
//! retained by the store; they are encoded to bytes on write and decoded on
//! read. The encoding is self-describing JSON with tagged values so that
//! integers, floats, binary data and timestamps survive a round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum nesting depth accepted for a record (16 levels)
pub const MAX_NESTING_DEPTH: usize = 16;

/// Field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Null,
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// DateTime with UTC timezone
    DateTime(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as f64 (integers are widened)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::DateTime(_) => "datetime",
        }
    }

    /// Get the nesting depth of this value
    pub fn nesting_depth(&self) -> usize {
        match self {
            Value::Array(arr) => 1 + arr.iter().map(|v| v.nesting_depth()).max().unwrap_or(0),
            Value::Object(obj) => 1 + obj.values().map(|v| v.nesting_depth()).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Whether this value or any nested value is a NaN or infinite float
    pub fn has_non_finite(&self) -> bool {
        match self {
            Value::Float(f) => !f.is_finite(),
            Value::Array(arr) => arr.iter().any(Value::has_non_finite),
            Value::Object(obj) => obj.values().any(Value::has_non_finite),
            _ => false,
        }
    }

    /// Convert to an untagged JSON value
    ///
    /// Timestamps become RFC 3339 strings and binary data a byte array.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Binary(b) => serde_json::Value::from(b.clone()),
            Value::Array(arr) => serde_json::Value::Array(arr.iter().map(Value::to_json).collect()),
            Value::Object(obj) => serde_json::Value::Object(
                obj.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

/// A structured record with ordered fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }

    /// Builder-style field insertion
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get field by dotted path (e.g. "user.address.city")
    ///
    /// Numeric path segments index into arrays.
    pub fn get_by_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.fields.get(parts.next()?)?;

        for part in parts {
            current = match current {
                Value::Object(obj) => obj.get(part)?,
                Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Unique id stored under `id_field`
    ///
    /// Strings are used as-is and integers in their decimal form; any other
    /// value, an empty string or a missing field is an error.
    pub fn id(&self, id_field: &str) -> Result<String, RecordError> {
        match self.get_by_path(id_field) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::Int(i)) => Ok(i.to_string()),
            Some(other) => Err(RecordError::InvalidId {
                field: id_field.to_string(),
                found: other.type_name(),
            }),
            None => Err(RecordError::MissingId(id_field.to_string())),
        }
    }

    /// Validate record constraints
    pub fn validate(&self) -> Result<(), RecordError> {
        let depth = self
            .fields
            .values()
            .map(|v| v.nesting_depth())
            .max()
            .unwrap_or(0);

        if depth > MAX_NESTING_DEPTH {
            return Err(RecordError::NestingTooDeep {
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }

        // JSON has no NaN or infinity; such floats would encode as null
        if let Some((field, _)) = self.fields.iter().find(|(_, v)| v.has_non_finite()) {
            return Err(RecordError::NonFiniteFloat(field.clone()));
        }
        Ok(())
    }

    /// Encode into the backend byte format
    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        serde_json::to_vec(self).map_err(|e| RecordError::Serialization(e.to_string()))
    }

    /// Decode from the backend byte format
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        serde_json::from_slice(bytes).map_err(|e| RecordError::Deserialization(e.to_string()))
    }

    /// Build a record from a plain JSON object
    pub fn from_json(json: serde_json::Value) -> Result<Self, RecordError> {
        match json {
            serde_json::Value::Object(obj) => Ok(Self {
                fields: obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            }),
            other => Err(RecordError::NotAnObject(json_type_name(&other))),
        }
    }

    /// Convert to a plain JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Record-related errors
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Record has no id field '{0}'")]
    MissingId(String),

    #[error("Id field '{field}' must be a non-empty string or an integer, found {found}")]
    InvalidId { field: String, found: &'static str },

    #[error("Nesting too deep: {depth} levels (max: {max})")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("Field '{0}' holds a NaN or infinite float")]
    NonFiniteFloat(String),

    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}
