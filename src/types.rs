//! Value types for hrana-pool
//!
//! The remote service is SQLite-typed, so values map onto the five SQLite
//! storage classes. Serde representations match the Hrana JSON encoding
//! (`{"type": "text", "value": "..."}`).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// SQL value that can hold any database value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Value {
    /// SQL NULL
    Null,
    /// 64-bit signed integer (INTEGER)
    Integer {
        /// Encoded as a string on the wire to avoid JSON precision loss
        #[serde(with = "integer_string")]
        value: i64,
    },
    /// 64-bit floating point (REAL)
    Float {
        /// The floating point value
        value: f64,
    },
    /// Text string (TEXT)
    Text {
        /// The string value
        value: String,
    },
    /// Binary data (BLOB), base64-encoded on the wire
    Blob {
        /// Raw bytes
        #[serde(rename = "base64", with = "blob_base64")]
        value: Vec<u8>,
    },
}

impl Value {
    /// Check if this value is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the value as an i64, if it is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer { value } => Some(*value),
            _ => None,
        }
    }

    /// Get the value as an f64 (integers widen)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float { value } => Some(*value),
            Self::Integer { value } => Some(*value as f64),
            _ => None,
        }
    }

    /// Get the value as a string slice, if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text { value } => Some(value),
            _ => None,
        }
    }

    /// Get the value as raw bytes, if it is a blob
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Blob { value } => Some(value),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer { value }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer {
            value: value as i64,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float { value }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text {
            value: value.to_string(),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text { value }
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob { value }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Integer {
            value: i64::from(value),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

mod integer_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

mod blob_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

/// A single result row
///
/// Column names are shared across all rows of one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row from shared column names and values
    pub fn new(columns: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Get a value by column index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == name)?;
        self.values.get(index)
    }

    /// Column names for this row
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All values in column order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of executing a single statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column names of the result set
    pub columns: Vec<String>,
    /// Result rows
    pub rows: Vec<Row>,
    /// Number of rows changed by a DML statement
    pub affected_rows: u64,
    /// Rowid of the last inserted row, if the statement was an INSERT
    pub last_insert_rowid: Option<i64>,
}

impl QueryResult {
    /// First row of the result set, if any
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }
}
