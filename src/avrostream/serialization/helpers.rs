//! Conversions between [`FieldValue`] and the Avro value model
//!
//! Encoding is schema-guided: the writer schema decides union branch tags,
//! integer widths, and record field order, so a `FieldValue` that does not
//! fit the schema fails here rather than producing bytes that lie about
//! their shape. Decoding is structural; writer-shaped Avro values collapse
//! back into `FieldValue` without consulting a schema.

use std::collections::HashMap;

use apache_avro::schema::{Name, Schema};
use apache_avro::types::Value as AvroValue;

use super::error::SerializationError;
use crate::avrostream::types::FieldValue;

/// Collects every named type (record, enum, fixed) in `schema`, keyed by
/// fullname, so `Schema::Ref` nodes can be chased during conversion.
pub fn named_schemas(schema: &Schema) -> HashMap<String, Schema> {
    let mut names = HashMap::new();
    collect_names(schema, &mut names);
    names
}

fn collect_names(schema: &Schema, names: &mut HashMap<String, Schema>) {
    match schema {
        Schema::Record(record) => {
            if names
                .insert(full_name(&record.name), schema.clone())
                .is_none()
            {
                for field in &record.fields {
                    collect_names(&field.schema, names);
                }
            }
        }
        Schema::Enum(descriptor) => {
            names.insert(full_name(&descriptor.name), schema.clone());
        }
        Schema::Fixed(fixed) => {
            names.insert(full_name(&fixed.name), schema.clone());
        }
        Schema::Union(union_schema) => {
            for branch in union_schema.variants() {
                collect_names(branch, names);
            }
        }
        Schema::Array(array) => collect_names(&array.items, names),
        Schema::Map(map) => collect_names(&map.types, names),
        _ => {}
    }
}

pub fn full_name(name: &Name) -> String {
    match &name.namespace {
        Some(namespace) => format!("{namespace}.{}", name.name),
        None => name.name.clone(),
    }
}

/// Follows `Schema::Ref` nodes to the named definition.
pub fn deref_schema<'a>(
    schema: &'a Schema,
    names: &'a HashMap<String, Schema>,
) -> Result<&'a Schema, SerializationError> {
    match schema {
        Schema::Ref { name } => names.get(&full_name(name)).ok_or_else(|| {
            SerializationError::schema_mismatch(format!(
                "schema references undefined type '{}'",
                full_name(name)
            ))
        }),
        other => Ok(other),
    }
}

/// Converts a `FieldValue` into a schema-shaped Avro value.
pub fn field_to_avro(
    value: &FieldValue,
    schema: &Schema,
    names: &HashMap<String, Schema>,
) -> Result<AvroValue, SerializationError> {
    let schema = deref_schema(schema, names)?;
    match (value, schema) {
        (FieldValue::Null, Schema::Null) => Ok(AvroValue::Null),
        (FieldValue::Boolean(flag), Schema::Boolean) => Ok(AvroValue::Boolean(*flag)),
        (FieldValue::Int(number), Schema::Int) => Ok(AvroValue::Int(*number)),
        (FieldValue::Int(number), Schema::Long) => Ok(AvroValue::Long(i64::from(*number))),
        (FieldValue::Long(number), Schema::Long) => Ok(AvroValue::Long(*number)),
        (FieldValue::Long(number), Schema::Int) => i32::try_from(*number)
            .map(AvroValue::Int)
            .map_err(|_| {
                SerializationError::schema_mismatch(format!(
                    "value {number} does not fit the schema's int width"
                ))
            }),
        (FieldValue::Float(number), Schema::Float) => Ok(AvroValue::Float(*number)),
        (FieldValue::Float(number), Schema::Double) => {
            Ok(AvroValue::Double(f64::from(*number)))
        }
        (FieldValue::Double(number), Schema::Double) => Ok(AvroValue::Double(*number)),
        (FieldValue::Bytes(bytes), Schema::Bytes) => Ok(AvroValue::Bytes(bytes.clone())),
        (FieldValue::String(text), Schema::String) => Ok(AvroValue::String(text.clone())),
        (FieldValue::Enum(symbol), Schema::Enum(descriptor)) => {
            match descriptor.symbols.iter().position(|known| known == symbol) {
                Some(position) => Ok(AvroValue::Enum(position as u32, symbol.clone())),
                None => Err(SerializationError::schema_mismatch(format!(
                    "symbol '{symbol}' is not declared by enum '{}'",
                    descriptor.name.name
                ))),
            }
        }
        (value, Schema::Union(union_schema)) => {
            for (index, branch) in union_schema.variants().iter().enumerate() {
                if let Ok(encoded) = field_to_avro(value, branch, names) {
                    return Ok(AvroValue::Union(index as u32, Box::new(encoded)));
                }
            }
            Err(SerializationError::schema_mismatch(format!(
                "{} value matches no union branch",
                value.type_name()
            )))
        }
        (FieldValue::Array(items), Schema::Array(array)) => {
            let mut encoded = Vec::with_capacity(items.len());
            for item in items {
                encoded.push(field_to_avro(item, &array.items, names)?);
            }
            Ok(AvroValue::Array(encoded))
        }
        (FieldValue::Map(entries), Schema::Map(map)) => {
            let mut encoded = HashMap::with_capacity(entries.len());
            for (key, entry) in entries {
                encoded.insert(key.clone(), field_to_avro(entry, &map.types, names)?);
            }
            Ok(AvroValue::Map(encoded))
        }
        (FieldValue::Record(fields), Schema::Record(record)) => {
            let mut encoded = Vec::with_capacity(record.fields.len());
            for field in &record.fields {
                let value = fields.get(&field.name).ok_or_else(|| {
                    SerializationError::schema_mismatch(format!(
                        "record is missing field '{}' required by schema '{}'",
                        field.name, record.name.name
                    ))
                })?;
                encoded.push((
                    field.name.clone(),
                    field_to_avro(value, &field.schema, names)?,
                ));
            }
            Ok(AvroValue::Record(encoded))
        }
        (value, schema) => Err(SerializationError::schema_mismatch(format!(
            "cannot encode {} value as {:?} schema",
            value.type_name(),
            schema
        ))),
    }
}

/// Collapses a decoded Avro value into a `FieldValue`.
pub fn avro_to_field(value: AvroValue) -> Result<FieldValue, SerializationError> {
    match value {
        AvroValue::Null => Ok(FieldValue::Null),
        AvroValue::Boolean(flag) => Ok(FieldValue::Boolean(flag)),
        AvroValue::Int(number) => Ok(FieldValue::Int(number)),
        AvroValue::Long(number) => Ok(FieldValue::Long(number)),
        AvroValue::Float(number) => Ok(FieldValue::Float(number)),
        AvroValue::Double(number) => Ok(FieldValue::Double(number)),
        AvroValue::Bytes(bytes) => Ok(FieldValue::Bytes(bytes)),
        AvroValue::String(text) => Ok(FieldValue::String(text)),
        AvroValue::Fixed(_, bytes) => Ok(FieldValue::Bytes(bytes)),
        AvroValue::Union(_, inner) => avro_to_field(*inner),
        AvroValue::Enum(_, symbol) => Ok(FieldValue::Enum(symbol)),
        AvroValue::Array(items) => {
            let mut collected = Vec::with_capacity(items.len());
            for item in items {
                collected.push(avro_to_field(item)?);
            }
            Ok(FieldValue::Array(collected))
        }
        AvroValue::Map(entries) => {
            let mut collected = HashMap::with_capacity(entries.len());
            for (key, entry) in entries {
                collected.insert(key, avro_to_field(entry)?);
            }
            Ok(FieldValue::Map(collected))
        }
        AvroValue::Record(fields) => {
            let mut collected = HashMap::with_capacity(fields.len());
            for (name, field) in fields {
                collected.insert(name, avro_to_field(field)?);
            }
            Ok(FieldValue::Record(collected))
        }
        other => Err(SerializationError::decode(format!(
            "unsupported Avro value type: {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(document: &str) -> Schema {
        Schema::parse_str(document).expect("test schema must parse")
    }

    #[test]
    fn union_encoding_tags_null_as_branch_zero() {
        let schema = parse(r#"["null", "string"]"#);
        let names = named_schemas(&schema);

        let null = field_to_avro(&FieldValue::Null, &schema, &names).unwrap();
        assert_eq!(null, AvroValue::Union(0, Box::new(AvroValue::Null)));

        let text =
            field_to_avro(&FieldValue::String("hi".to_string()), &schema, &names).unwrap();
        assert_eq!(
            text,
            AvroValue::Union(1, Box::new(AvroValue::String("hi".to_string())))
        );
    }

    #[test]
    fn long_narrows_to_int_only_when_it_fits() {
        let schema = parse(r#""int""#);
        let names = HashMap::new();
        assert_eq!(
            field_to_avro(&FieldValue::Long(7), &schema, &names).unwrap(),
            AvroValue::Int(7)
        );
        let err = field_to_avro(&FieldValue::Long(i64::MAX), &schema, &names).unwrap_err();
        assert!(matches!(err, SerializationError::SchemaMismatch { .. }));
    }

    #[test]
    fn missing_record_field_is_a_mismatch() {
        let schema = parse(
            r#"{"type": "record", "name": "point",
                "fields": [{"name": "x", "type": "long"}]}"#,
        );
        let names = named_schemas(&schema);
        let empty = FieldValue::Record(HashMap::new());
        let err = field_to_avro(&empty, &schema, &names).unwrap_err();
        assert!(matches!(err, SerializationError::SchemaMismatch { .. }));
    }

    #[test]
    fn unknown_enum_symbol_is_rejected() {
        let schema = parse(r#"{"type": "enum", "name": "state", "symbols": ["ON", "OFF"]}"#);
        let names = named_schemas(&schema);
        let err = field_to_avro(&FieldValue::Enum("MAYBE".to_string()), &schema, &names)
            .unwrap_err();
        assert!(matches!(err, SerializationError::SchemaMismatch { .. }));
    }
}
