//! # SQL Values
//!
//! The closed set of scalar values that cross the SQL boundary, both as
//! bound statement parameters and as decoded result cells.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Timestamp rendering: ISO-8601 without zone, fractional seconds only when present
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Calendar date rendering
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time-of-day rendering
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// A single SQL scalar
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Json(Value),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Null and the empty string both count as "no identity".
    pub fn is_blank(&self) -> bool {
        match self {
            SqlValue::Null => true,
            SqlValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Convert a JSON body value into a bindable parameter.
    ///
    /// Nested arrays and objects are kept whole and bound as JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Boolean(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    SqlValue::Unsigned(u)
                } else {
                    n.as_f64().map(SqlValue::Float).unwrap_or(SqlValue::Null)
                }
            }
            Value::String(s) => SqlValue::Text(s.clone()),
            other => SqlValue::Json(other.clone()),
        }
    }

    /// Render this value as JSON using the wire formats of the marshaler.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Null => serializer.serialize_unit(),
            SqlValue::Integer(v) => serializer.serialize_i64(*v),
            SqlValue::Unsigned(v) => serializer.serialize_u64(*v),
            // serde_json writes non-finite floats as null
            SqlValue::Float(v) => serializer.serialize_f64(*v),
            SqlValue::Text(v) => serializer.serialize_str(v),
            SqlValue::Boolean(v) => serializer.serialize_bool(*v),
            SqlValue::Bytes(v) => serializer.serialize_str(&STANDARD.encode(v)),
            SqlValue::Timestamp(v) => serializer.collect_str(&v.format(TIMESTAMP_FORMAT)),
            SqlValue::Date(v) => serializer.collect_str(&v.format(DATE_FORMAT)),
            SqlValue::Time(v) => serializer.collect_str(&v.format(TIME_FORMAT)),
            SqlValue::Json(v) => v.serialize(serializer),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Boolean(value)
    }
}
