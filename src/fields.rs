//! The flat field mapping exchanged between the signer, the XML codec and the
//! transport. Keys are kept sorted so iteration order is the canonical order.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::WxPayError;

pub type FieldMap = BTreeMap<String, FieldValue>;

/// A scalar field value. Booleans have no variant: the gateway expects
/// operation-specific tokens (e.g. `FORCE_CHECK`) instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Int(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Int(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Int(n.into())
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Int(n.into())
    }
}

/// Read access used when inspecting decoded envelopes.
pub trait FieldMapExt {
    /// Text value of `key`, if present as text.
    fn text(&self, key: &str) -> Option<&str>;

    /// Whether `key` is present with a non-empty value.
    fn has(&self, key: &str) -> bool;
}

impl FieldMapExt for FieldMap {
    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }
}

/// Flatten a serializable request record into a field mapping.
///
/// `null` members are skipped, integers stay integers, everything else must be
/// a string. Booleans and nested values are rejected.
pub fn to_fields<T: Serialize>(record: &T) -> Result<FieldMap, WxPayError> {
    let Value::Object(members) = serde_json::to_value(record)? else {
        return Err(WxPayError::InvalidField {
            field: "<root>".into(),
            reason: "request must serialize to a flat record".into(),
        });
    };

    let mut fields = FieldMap::new();
    for (key, value) in members {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => FieldValue::Text(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Text(n.to_string()),
            },
            Value::Bool(_) => {
                return Err(WxPayError::InvalidField {
                    field: key,
                    reason: "boolean values must be mapped to gateway tokens".into(),
                });
            }
            Value::Array(_) | Value::Object(_) => {
                return Err(WxPayError::InvalidField {
                    field: key,
                    reason: "nested values are not supported".into(),
                });
            }
        };
        fields.insert(key, value);
    }
    Ok(fields)
}
