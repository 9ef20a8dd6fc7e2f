//! Core value types shared by all serialization formats

use std::collections::HashMap;

/// In-memory representation of a single decoded value.
///
/// Every wire format decodes into this one enum, so callers can switch
/// between binary, container, and JSON streams without touching the code
/// that consumes the values. Records are keyed by wire field name; the
/// field order of the reader schema remains available from the schema
/// itself.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    String(String),
    /// A record value, keyed by wire field name.
    Record(HashMap<String, FieldValue>),
    /// An enum symbol.
    Enum(String),
    Array(Vec<FieldValue>),
    /// A string-keyed map with homogeneous values.
    Map(HashMap<String, FieldValue>),
}

impl FieldValue {
    /// Human-readable name of the value's type family, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Int(_) => "int",
            FieldValue::Long(_) => "long",
            FieldValue::Float(_) => "float",
            FieldValue::Double(_) => "double",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::String(_) => "string",
            FieldValue::Record(_) => "record",
            FieldValue::Enum(_) => "enum",
            FieldValue::Array(_) => "array",
            FieldValue::Map(_) => "map",
        }
    }

    /// Build a record value from `(name, value)` pairs.
    pub fn record<I, K>(fields: I) -> FieldValue
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        FieldValue::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}
