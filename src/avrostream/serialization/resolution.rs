//! Writer/reader schema resolution
//!
//! Reconciles a value decoded in the shape of its writer schema into the
//! shape the reader schema expects, applying the standard Avro evolution
//! rules: writer-only fields are read and discarded, reader-only fields
//! are populated from their declared defaults, matched fields are coerced
//! within the promotable numeric set, and enums fall back to the reader's
//! default symbol.
//!
//! All three wire formats share this one path: binary and container
//! decoding produce writer-shaped values, JSON parses against the writer
//! schema, and the resolver takes it from there.

use std::collections::HashMap;

use apache_avro::types::Value as AvroValue;
use apache_avro::Schema;
use serde_json::Value as JsonValue;

use super::error::SerializationError;
use super::helpers::{deref_schema, named_schemas};

/// Resolves writer-shaped values into a reader schema.
pub struct SchemaResolver {
    writer_names: HashMap<String, Schema>,
    reader_names: HashMap<String, Schema>,
    identical: bool,
}

impl SchemaResolver {
    pub fn new(writer: &Schema, reader: &Schema) -> Self {
        let identical = writer.canonical_form() == reader.canonical_form();
        if identical {
            log::debug!("writer and reader schemas are identical; resolution is a passthrough");
        }
        SchemaResolver {
            writer_names: named_schemas(writer),
            reader_names: named_schemas(reader),
            identical,
        }
    }

    /// Whether the schema pair is canonically identical.
    pub fn is_passthrough(&self) -> bool {
        self.identical
    }

    /// Resolves `value`, decoded under `writer`, into the shape of
    /// `reader`.
    pub fn resolve(
        &self,
        value: AvroValue,
        writer: &Schema,
        reader: &Schema,
    ) -> Result<AvroValue, SerializationError> {
        if self.identical {
            return Ok(value);
        }
        self.resolve_node(value, writer, reader)
    }

    fn resolve_node(
        &self,
        value: AvroValue,
        writer: &Schema,
        reader: &Schema,
    ) -> Result<AvroValue, SerializationError> {
        let writer = deref_schema(writer, &self.writer_names)?;
        let reader = deref_schema(reader, &self.reader_names)?;

        // Unwrap the writer union first: the value carries the branch tag
        if let Schema::Union(writer_union) = writer {
            return match value {
                AvroValue::Union(tag, inner) => {
                    let branch = writer_union.variants().get(tag as usize).ok_or_else(|| {
                        SerializationError::decode(format!(
                            "union tag {tag} is out of range for the writer schema"
                        ))
                    })?;
                    self.resolve_node(*inner, branch, reader)
                }
                other => Err(SerializationError::decode(format!(
                    "expected a union value for a writer union schema, got {other:?}"
                ))),
            };
        }

        // Then find a home for the value among the reader's branches
        if let Schema::Union(reader_union) = reader {
            for (index, branch) in reader_union.variants().iter().enumerate() {
                if let Ok(resolved) = self.resolve_node(value.clone(), writer, branch) {
                    return Ok(AvroValue::Union(index as u32, Box::new(resolved)));
                }
            }
            return Err(SerializationError::schema_mismatch(
                "writer value matches no reader union branch".to_string(),
            ));
        }

        self.resolve_concrete(value, writer, reader)
    }

    fn resolve_concrete(
        &self,
        value: AvroValue,
        writer: &Schema,
        reader: &Schema,
    ) -> Result<AvroValue, SerializationError> {
        match (writer, reader) {
            (Schema::Record(writer_record), Schema::Record(reader_record)) => {
                let fields = match value {
                    AvroValue::Record(fields) => fields,
                    other => {
                        return Err(SerializationError::decode(format!(
                            "expected a record value, got {other:?}"
                        )))
                    }
                };

                // Index the writer's decoded fields by wire name; fields
                // the reader does not declare are dropped here
                let mut by_name: HashMap<String, AvroValue> = fields.into_iter().collect();

                let mut resolved = Vec::with_capacity(reader_record.fields.len());
                for reader_field in &reader_record.fields {
                    let writer_field = writer_record
                        .fields
                        .iter()
                        .find(|field| field.name == reader_field.name);
                    let entry = match (by_name.remove(&reader_field.name), writer_field) {
                        (Some(field_value), Some(writer_field)) => self.resolve_node(
                            field_value,
                            &writer_field.schema,
                            &reader_field.schema,
                        )?,
                        _ => match &reader_field.default {
                            Some(default) => default_value(
                                default,
                                &reader_field.schema,
                                &self.reader_names,
                            )?,
                            None => {
                                return Err(SerializationError::schema_resolution(format!(
                                    "field '{}' is missing from the writer schema and \
                                     declares no default",
                                    reader_field.name
                                )))
                            }
                        },
                    };
                    resolved.push((reader_field.name.clone(), entry));
                }
                Ok(AvroValue::Record(resolved))
            }
            (Schema::Enum(_), Schema::Enum(reader_enum)) => {
                let symbol = match value {
                    AvroValue::Enum(_, symbol) => symbol,
                    other => {
                        return Err(SerializationError::decode(format!(
                            "expected an enum value, got {other:?}"
                        )))
                    }
                };
                match reader_enum.symbols.iter().position(|known| *known == symbol) {
                    Some(position) => Ok(AvroValue::Enum(position as u32, symbol)),
                    None => match &reader_enum.default {
                        Some(fallback) => {
                            let position = reader_enum
                                .symbols
                                .iter()
                                .position(|known| known == fallback)
                                .ok_or_else(|| {
                                    SerializationError::schema_mismatch(format!(
                                        "enum '{}' declares default '{fallback}' outside its \
                                         own symbols",
                                        reader_enum.name.name
                                    ))
                                })?;
                            log::warn!(
                                "substituting default symbol '{fallback}' for unknown '{symbol}'"
                            );
                            Ok(AvroValue::Enum(position as u32, fallback.clone()))
                        }
                        None => Err(SerializationError::schema_mismatch(format!(
                            "writer symbol '{symbol}' is unknown to enum '{}' and no default \
                             is declared",
                            reader_enum.name.name
                        ))),
                    },
                }
            }
            (Schema::Array(writer_array), Schema::Array(reader_array)) => {
                let items = match value {
                    AvroValue::Array(items) => items,
                    other => {
                        return Err(SerializationError::decode(format!(
                            "expected an array value, got {other:?}"
                        )))
                    }
                };
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    resolved.push(self.resolve_node(
                        item,
                        &writer_array.items,
                        &reader_array.items,
                    )?);
                }
                Ok(AvroValue::Array(resolved))
            }
            (Schema::Map(writer_map), Schema::Map(reader_map)) => {
                let entries = match value {
                    AvroValue::Map(entries) => entries,
                    other => {
                        return Err(SerializationError::decode(format!(
                            "expected a map value, got {other:?}"
                        )))
                    }
                };
                let mut resolved = HashMap::with_capacity(entries.len());
                for (key, entry) in entries {
                    resolved.insert(
                        key,
                        self.resolve_node(entry, &writer_map.types, &reader_map.types)?,
                    );
                }
                Ok(AvroValue::Map(resolved))
            }
            (writer, reader) => promote(value, writer, reader),
        }
    }
}

/// Coerces a primitive within the standard promotable set:
/// int -> long -> float -> double, and string <-> bytes.
fn promote(
    value: AvroValue,
    writer: &Schema,
    reader: &Schema,
) -> Result<AvroValue, SerializationError> {
    let promoted = match (&value, reader) {
        (AvroValue::Null, Schema::Null)
        | (AvroValue::Boolean(_), Schema::Boolean)
        | (AvroValue::Int(_), Schema::Int)
        | (AvroValue::Long(_), Schema::Long)
        | (AvroValue::Float(_), Schema::Float)
        | (AvroValue::Double(_), Schema::Double)
        | (AvroValue::Bytes(_), Schema::Bytes)
        | (AvroValue::String(_), Schema::String) => Some(value.clone()),
        (AvroValue::Int(number), Schema::Long) => Some(AvroValue::Long(i64::from(*number))),
        (AvroValue::Int(number), Schema::Float) => Some(AvroValue::Float(*number as f32)),
        (AvroValue::Int(number), Schema::Double) => Some(AvroValue::Double(f64::from(*number))),
        (AvroValue::Long(number), Schema::Float) => Some(AvroValue::Float(*number as f32)),
        (AvroValue::Long(number), Schema::Double) => Some(AvroValue::Double(*number as f64)),
        (AvroValue::Float(number), Schema::Double) => Some(AvroValue::Double(f64::from(*number))),
        (AvroValue::String(text), Schema::Bytes) => {
            Some(AvroValue::Bytes(text.clone().into_bytes()))
        }
        (AvroValue::Bytes(bytes), Schema::String) => match String::from_utf8(bytes.clone()) {
            Ok(text) => Some(AvroValue::String(text)),
            Err(_) => {
                return Err(SerializationError::decode(
                    "bytes value is not valid UTF-8 and cannot be read as string".to_string(),
                ))
            }
        },
        _ => None,
    };

    promoted.ok_or_else(|| {
        SerializationError::schema_mismatch(format!(
            "writer type {writer:?} is not readable as {reader:?}"
        ))
    })
}

/// Materializes a field default (plain JSON encoding) as a value of
/// `schema`. A union default applies to the union's first branch.
pub fn default_value(
    default: &JsonValue,
    schema: &Schema,
    names: &HashMap<String, Schema>,
) -> Result<AvroValue, SerializationError> {
    let schema = deref_schema(schema, names)?;
    let mismatch = || {
        SerializationError::schema_resolution(format!(
            "default {default} does not fit schema {schema:?}"
        ))
    };
    match schema {
        Schema::Null => match default {
            JsonValue::Null => Ok(AvroValue::Null),
            _ => Err(mismatch()),
        },
        Schema::Boolean => default.as_bool().map(AvroValue::Boolean).ok_or_else(mismatch),
        Schema::Int => default
            .as_i64()
            .and_then(|number| i32::try_from(number).ok())
            .map(AvroValue::Int)
            .ok_or_else(mismatch),
        Schema::Long => default.as_i64().map(AvroValue::Long).ok_or_else(mismatch),
        Schema::Float => default
            .as_f64()
            .map(|number| AvroValue::Float(number as f32))
            .ok_or_else(mismatch),
        Schema::Double => default.as_f64().map(AvroValue::Double).ok_or_else(mismatch),
        Schema::Bytes => default
            .as_str()
            .map(|text| AvroValue::Bytes(text.chars().map(|ch| ch as u8).collect()))
            .ok_or_else(mismatch),
        Schema::String => default
            .as_str()
            .map(|text| AvroValue::String(text.to_string()))
            .ok_or_else(mismatch),
        Schema::Enum(descriptor) => {
            let symbol = default.as_str().ok_or_else(mismatch)?;
            descriptor
                .symbols
                .iter()
                .position(|known| known == symbol)
                .map(|position| AvroValue::Enum(position as u32, symbol.to_string()))
                .ok_or_else(mismatch)
        }
        Schema::Union(union_schema) => {
            // Per the Avro specification, a union default is written in
            // the encoding of the union's first branch
            let first = union_schema.variants().first().ok_or_else(mismatch)?;
            let inner = default_value(default, first, names)?;
            Ok(AvroValue::Union(0, Box::new(inner)))
        }
        Schema::Array(array) => {
            let items = default.as_array().ok_or_else(mismatch)?;
            let mut collected = Vec::with_capacity(items.len());
            for item in items {
                collected.push(default_value(item, &array.items, names)?);
            }
            Ok(AvroValue::Array(collected))
        }
        Schema::Map(map) => {
            let entries = default.as_object().ok_or_else(mismatch)?;
            let mut collected = HashMap::with_capacity(entries.len());
            for (key, entry) in entries {
                collected.insert(key.clone(), default_value(entry, &map.types, names)?);
            }
            Ok(AvroValue::Map(collected))
        }
        Schema::Record(record) => {
            let entries = default.as_object().ok_or_else(mismatch)?;
            let mut collected = Vec::with_capacity(record.fields.len());
            for field in &record.fields {
                let entry = match entries.get(&field.name) {
                    Some(value) => default_value(value, &field.schema, names)?,
                    None => match &field.default {
                        Some(nested) => default_value(nested, &field.schema, names)?,
                        None => return Err(mismatch()),
                    },
                };
                collected.push((field.name.clone(), entry));
            }
            Ok(AvroValue::Record(collected))
        }
        _ => Err(mismatch()),
    }
}
