//! Avro JSON encoding
//!
//! Standard Avro JSON rules: unions are encoded as single-key objects
//! naming the resolved branch type (a bare `null` for the null branch),
//! bytes and fixed values are strings of ISO-8859-1 code points, and
//! everything else follows the writer schema's shape. Not to be confused
//! with the schema definition language, which is also JSON.

use std::collections::HashMap;

use apache_avro::types::Value as AvroValue;
use apache_avro::Schema;
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

use super::error::SerializationError;
use super::helpers::{deref_schema, full_name};
use super::resolution::default_value;

/// Encodes a schema-shaped Avro value as an Avro JSON document.
pub fn value_to_json(
    value: &AvroValue,
    schema: &Schema,
    names: &HashMap<String, Schema>,
) -> Result<JsonValue, SerializationError> {
    let schema = deref_schema(schema, names)?;
    match (value, schema) {
        (AvroValue::Null, _) => Ok(JsonValue::Null),
        (AvroValue::Boolean(flag), _) => Ok(JsonValue::Bool(*flag)),
        (AvroValue::Int(number), _) => Ok(JsonValue::Number((*number).into())),
        (AvroValue::Long(number), _) => Ok(JsonValue::Number((*number).into())),
        (AvroValue::Float(number), _) => float_to_json(f64::from(*number)),
        (AvroValue::Double(number), _) => float_to_json(*number),
        (AvroValue::Bytes(bytes), _) | (AvroValue::Fixed(_, bytes), _) => {
            Ok(JsonValue::String(bytes.iter().map(|&byte| byte as char).collect()))
        }
        (AvroValue::String(text), _) => Ok(JsonValue::String(text.clone())),
        (AvroValue::Enum(_, symbol), _) => Ok(JsonValue::String(symbol.clone())),
        (AvroValue::Union(tag, inner), Schema::Union(union_schema)) => {
            let branch = union_schema.variants().get(*tag as usize).ok_or_else(|| {
                SerializationError::encode(format!(
                    "union tag {tag} is out of range for the writer schema"
                ))
            })?;
            if matches!(**inner, AvroValue::Null) {
                return Ok(JsonValue::Null);
            }
            let mut wrapper = JsonMap::with_capacity(1);
            wrapper.insert(
                branch_name(branch),
                value_to_json(inner, branch, names)?,
            );
            Ok(JsonValue::Object(wrapper))
        }
        (AvroValue::Array(items), Schema::Array(array)) => {
            let mut encoded = Vec::with_capacity(items.len());
            for item in items {
                encoded.push(value_to_json(item, &array.items, names)?);
            }
            Ok(JsonValue::Array(encoded))
        }
        (AvroValue::Map(entries), Schema::Map(map)) => {
            let mut encoded = JsonMap::with_capacity(entries.len());
            for (key, entry) in entries {
                encoded.insert(key.clone(), value_to_json(entry, &map.types, names)?);
            }
            Ok(JsonValue::Object(encoded))
        }
        (AvroValue::Record(fields), Schema::Record(record)) => {
            let mut encoded = JsonMap::with_capacity(fields.len());
            for ((name, field), schema_field) in fields.iter().zip(&record.fields) {
                encoded.insert(
                    name.clone(),
                    value_to_json(field, &schema_field.schema, names)?,
                );
            }
            Ok(JsonValue::Object(encoded))
        }
        (value, schema) => Err(SerializationError::encode(format!(
            "value {value:?} does not match writer schema {schema:?}"
        ))),
    }
}

/// Parses an Avro JSON document into a value shaped by `schema`.
pub fn json_to_value(
    document: &JsonValue,
    schema: &Schema,
    names: &HashMap<String, Schema>,
) -> Result<AvroValue, SerializationError> {
    let schema = deref_schema(schema, names)?;
    let mismatch = || {
        SerializationError::decode(format!(
            "JSON document {document} does not match writer schema {schema:?}"
        ))
    };
    match schema {
        Schema::Null => match document {
            JsonValue::Null => Ok(AvroValue::Null),
            _ => Err(mismatch()),
        },
        Schema::Boolean => document.as_bool().map(AvroValue::Boolean).ok_or_else(mismatch),
        Schema::Int => document
            .as_i64()
            .and_then(|number| i32::try_from(number).ok())
            .map(AvroValue::Int)
            .ok_or_else(mismatch),
        Schema::Long => document.as_i64().map(AvroValue::Long).ok_or_else(mismatch),
        Schema::Float => document
            .as_f64()
            .map(|number| AvroValue::Float(number as f32))
            .ok_or_else(mismatch),
        Schema::Double => document.as_f64().map(AvroValue::Double).ok_or_else(mismatch),
        Schema::Bytes => {
            let text = document.as_str().ok_or_else(mismatch)?;
            Ok(AvroValue::Bytes(chars_to_bytes(text)?))
        }
        Schema::String => document
            .as_str()
            .map(|text| AvroValue::String(text.to_string()))
            .ok_or_else(mismatch),
        Schema::Enum(descriptor) => {
            let symbol = document.as_str().ok_or_else(mismatch)?;
            descriptor
                .symbols
                .iter()
                .position(|known| known == symbol)
                .map(|position| AvroValue::Enum(position as u32, symbol.to_string()))
                .ok_or_else(|| {
                    SerializationError::decode(format!(
                        "symbol '{symbol}' is not declared by enum '{}'",
                        descriptor.name.name
                    ))
                })
        }
        Schema::Union(union_schema) => {
            if document.is_null() {
                let position = union_schema
                    .variants()
                    .iter()
                    .position(|branch| matches!(branch, Schema::Null))
                    .ok_or_else(mismatch)?;
                return Ok(AvroValue::Union(position as u32, Box::new(AvroValue::Null)));
            }
            let wrapper = document.as_object().ok_or_else(mismatch)?;
            if wrapper.len() != 1 {
                return Err(SerializationError::decode(format!(
                    "union document must have exactly one key, got {}",
                    wrapper.len()
                )));
            }
            let (key, inner) = wrapper.iter().next().ok_or_else(mismatch)?;
            let (position, branch) = union_schema
                .variants()
                .iter()
                .enumerate()
                .find(|(_, branch)| branch_name(branch) == *key)
                .ok_or_else(|| {
                    SerializationError::decode(format!(
                        "'{key}' names no branch of the writer union"
                    ))
                })?;
            Ok(AvroValue::Union(
                position as u32,
                Box::new(json_to_value(inner, branch, names)?),
            ))
        }
        Schema::Array(array) => {
            let items = document.as_array().ok_or_else(mismatch)?;
            let mut collected = Vec::with_capacity(items.len());
            for item in items {
                collected.push(json_to_value(item, &array.items, names)?);
            }
            Ok(AvroValue::Array(collected))
        }
        Schema::Map(map) => {
            let entries = document.as_object().ok_or_else(mismatch)?;
            let mut collected = HashMap::with_capacity(entries.len());
            for (key, entry) in entries {
                collected.insert(key.clone(), json_to_value(entry, &map.types, names)?);
            }
            Ok(AvroValue::Map(collected))
        }
        Schema::Record(record) => {
            let entries = document.as_object().ok_or_else(mismatch)?;
            let mut collected = Vec::with_capacity(record.fields.len());
            for field in &record.fields {
                let entry = match entries.get(&field.name) {
                    Some(value) => json_to_value(value, &field.schema, names)?,
                    None => match &field.default {
                        Some(default) => default_value(default, &field.schema, names)?,
                        None => {
                            return Err(SerializationError::decode(format!(
                                "document is missing field '{}' of record '{}'",
                                field.name, record.name.name
                            )))
                        }
                    },
                };
                collected.push((field.name.clone(), entry));
            }
            Ok(AvroValue::Record(collected))
        }
        _ => Err(mismatch()),
    }
}

/// The key a schema contributes to a union wrapper object: primitive and
/// composite type names as-is, fullnames for named types.
fn branch_name(schema: &Schema) -> String {
    match schema {
        Schema::Null => "null".to_string(),
        Schema::Boolean => "boolean".to_string(),
        Schema::Int => "int".to_string(),
        Schema::Long => "long".to_string(),
        Schema::Float => "float".to_string(),
        Schema::Double => "double".to_string(),
        Schema::Bytes => "bytes".to_string(),
        Schema::String => "string".to_string(),
        Schema::Array(_) => "array".to_string(),
        Schema::Map(_) => "map".to_string(),
        Schema::Record(record) => full_name(&record.name),
        Schema::Enum(descriptor) => full_name(&descriptor.name),
        Schema::Fixed(fixed) => full_name(&fixed.name),
        Schema::Ref { name } => full_name(name),
        other => format!("{other:?}"),
    }
}

fn float_to_json(number: f64) -> Result<JsonValue, SerializationError> {
    JsonNumber::from_f64(number)
        .map(JsonValue::Number)
        .ok_or_else(|| {
            SerializationError::encode(format!(
                "non-finite float {number} has no JSON representation"
            ))
        })
}

fn chars_to_bytes(text: &str) -> Result<Vec<u8>, SerializationError> {
    text.chars()
        .map(|ch| {
            u8::try_from(ch as u32).map_err(|_| {
                SerializationError::decode(format!(
                    "code point U+{:04X} is outside the byte range",
                    ch as u32
                ))
            })
        })
        .collect()
}
