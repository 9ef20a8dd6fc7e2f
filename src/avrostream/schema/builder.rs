//! Schema derivation from type descriptors
//!
//! [`SchemaBuilder`] recursively walks a [`TypeDescriptor`], emitting an
//! Avro schema document with every record name, field name, enum name, and
//! enum symbol rewritten through the supplied [`NamingStrategy`]. The
//! builder is stateless and referentially transparent: equal inputs always
//! produce byte-identical canonical schema documents.

use std::collections::HashSet;

use apache_avro::Schema;
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use super::descriptor::{EnumDescriptor, RecordDescriptor, TypeDescriptor};
use super::error::{SchemaError, SchemaResult};
use super::naming::NamingStrategy;

/// Derives Avro schemas from type descriptors.
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Builds the wire schema for `descriptor`, rewriting names through
    /// `strategy` uniformly at every nesting depth.
    ///
    /// The first occurrence of a named type (record or enum) defines it;
    /// later occurrences of the same wire name, and every
    /// [`TypeDescriptor::Ref`], emit an Avro name reference. A `Ref` to a
    /// name not defined earlier in the walk fails with
    /// [`SchemaError::UnresolvedReference`].
    pub fn build(
        descriptor: &TypeDescriptor,
        strategy: &dyn NamingStrategy,
    ) -> SchemaResult<Schema> {
        let mut defined = HashSet::new();
        let document = Self::node(descriptor, strategy, &mut defined)?;
        Schema::parse_str(&document.to_string())
            .map_err(|source| SchemaError::Parse { source })
    }

    fn node(
        descriptor: &TypeDescriptor,
        strategy: &dyn NamingStrategy,
        defined: &mut HashSet<String>,
    ) -> SchemaResult<JsonValue> {
        let document = match descriptor {
            TypeDescriptor::Null => json!("null"),
            TypeDescriptor::Boolean => json!("boolean"),
            TypeDescriptor::Int => json!("int"),
            TypeDescriptor::Long => json!("long"),
            TypeDescriptor::Float => json!("float"),
            TypeDescriptor::Double => json!("double"),
            TypeDescriptor::Bytes => json!("bytes"),
            TypeDescriptor::String => json!("string"),
            TypeDescriptor::Record(record) => Self::record_node(record, strategy, defined)?,
            TypeDescriptor::Enum(descriptor) => Self::enum_node(descriptor, strategy, defined)?,
            TypeDescriptor::Union(alternatives) => {
                let branches = alternatives
                    .iter()
                    .map(|alternative| Self::node(alternative, strategy, defined))
                    .collect::<SchemaResult<Vec<_>>>()?;
                JsonValue::Array(branches)
            }
            TypeDescriptor::Array(element) => {
                json!({"type": "array", "items": Self::node(element, strategy, defined)?})
            }
            TypeDescriptor::Map(values) => {
                json!({"type": "map", "values": Self::node(values, strategy, defined)?})
            }
            TypeDescriptor::Ref(name) => {
                let wire_name = strategy.apply(name);
                if !defined.contains(&wire_name) {
                    return Err(SchemaError::unresolved_reference(name.clone()));
                }
                json!(wire_name)
            }
        };
        Ok(document)
    }

    fn record_node(
        record: &RecordDescriptor,
        strategy: &dyn NamingStrategy,
        defined: &mut HashSet<String>,
    ) -> SchemaResult<JsonValue> {
        let wire_name = strategy.apply(&record.name);
        if !defined.insert(wire_name.clone()) {
            // Already defined in this walk: emit a back-reference
            return Ok(json!(wire_name));
        }

        let mut fields = Vec::with_capacity(record.fields.len());
        let mut wire_field_names = HashSet::new();
        for field in &record.fields {
            let wire_field_name = strategy.apply(&field.name);
            if !wire_field_names.insert(wire_field_name.clone()) {
                // Distinct logical names can collapse onto one wire name
                return Err(SchemaError::derivation(format!(
                    "record '{wire_name}' has colliding wire field name '{wire_field_name}'"
                )));
            }
            let mut entry = JsonMap::new();
            entry.insert("name".to_string(), json!(wire_field_name));
            entry.insert(
                "type".to_string(),
                Self::node(&field.descriptor, strategy, defined)?,
            );
            if let Some(default) = &field.default {
                entry.insert("default".to_string(), default.clone());
            }
            fields.push(JsonValue::Object(entry));
        }

        Ok(json!({"type": "record", "name": wire_name, "fields": fields}))
    }

    fn enum_node(
        descriptor: &EnumDescriptor,
        strategy: &dyn NamingStrategy,
        defined: &mut HashSet<String>,
    ) -> SchemaResult<JsonValue> {
        let wire_name = strategy.apply(&descriptor.name);
        if !defined.insert(wire_name.clone()) {
            return Ok(json!(wire_name));
        }

        let symbols: Vec<String> = descriptor
            .symbols
            .iter()
            .map(|symbol| strategy.apply(symbol))
            .collect();

        let mut document = JsonMap::new();
        document.insert("type".to_string(), json!("enum"));
        document.insert("name".to_string(), json!(wire_name));
        document.insert("symbols".to_string(), json!(symbols));
        if let Some(default) = &descriptor.default {
            document.insert("default".to_string(), json!(strategy.apply(default)));
        }
        Ok(JsonValue::Object(document))
    }
}

/// Whether two schemas are equal under canonical formatting.
///
/// Two independently derived schemas over equal descriptor/strategy pairs
/// compare equal here byte-for-byte.
pub fn schemas_equal(a: &Schema, b: &Schema) -> bool {
    a.canonical_form() == b.canonical_form()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avrostream::schema::naming::{IdentityNaming, SnakeCaseNaming};

    fn address_book() -> TypeDescriptor {
        RecordDescriptor::new("addressBook")
            .field("ownerId", TypeDescriptor::Long)
            .optional_field(
                "primaryEntry",
                RecordDescriptor::new("bookEntry")
                    .field("fullName", TypeDescriptor::String)
                    .field("ipv4Address", TypeDescriptor::String)
                    .into_descriptor(),
            )
            .field(
                "allEntries",
                TypeDescriptor::array(TypeDescriptor::reference("bookEntry")),
            )
            .into_descriptor()
    }

    #[test]
    fn derivation_is_deterministic() {
        let first = SchemaBuilder::build(&address_book(), &SnakeCaseNaming).unwrap();
        let second = SchemaBuilder::build(&address_book(), &SnakeCaseNaming).unwrap();
        assert_eq!(first.canonical_form(), second.canonical_form());
        assert!(schemas_equal(&first, &second));
    }

    #[test]
    fn strategy_applies_at_every_depth() {
        let schema = SchemaBuilder::build(&address_book(), &SnakeCaseNaming).unwrap();
        let canonical = schema.canonical_form();
        assert!(canonical.contains("\"address_book\""), "{canonical}");
        assert!(canonical.contains("\"owner_id\""), "{canonical}");
        // Nested record and its fields are rewritten too
        assert!(canonical.contains("\"book_entry\""), "{canonical}");
        assert!(canonical.contains("\"full_name\""), "{canonical}");
        assert!(canonical.contains("\"ipv4_address\""), "{canonical}");
    }

    #[test]
    fn optional_fields_derive_null_first_unions() {
        let schema = SchemaBuilder::build(&address_book(), &IdentityNaming).unwrap();
        let document: serde_json::Value =
            serde_json::from_str(&schema.canonical_form()).unwrap();
        let fields = document["fields"].as_array().unwrap();
        let optional = fields
            .iter()
            .find(|field| field["name"] == "primaryEntry")
            .unwrap();
        let union = optional["type"].as_array().unwrap();
        assert_eq!(union[0], "null", "union must be [null, T], never [T, null]");
        assert_eq!(union[1]["type"], "record");
    }

    #[test]
    fn dangling_reference_fails() {
        let descriptor = RecordDescriptor::new("holder")
            .field("loose", TypeDescriptor::reference("neverDefined"))
            .into_descriptor();
        let err = SchemaBuilder::build(&descriptor, &IdentityNaming).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedReference { .. }));
    }

    #[test]
    fn enum_symbols_pass_through_the_strategy() {
        let descriptor = EnumDescriptor::new("colorKind", ["deepRed", "paleBlue"])
            .into_descriptor();
        let schema = SchemaBuilder::build(&descriptor, &SnakeCaseNaming).unwrap();
        let canonical = schema.canonical_form();
        assert!(canonical.contains("deep_red"), "{canonical}");
        assert!(canonical.contains("pale_blue"), "{canonical}");
    }

    #[test]
    fn colliding_wire_field_names_fail_derivation() {
        // Both logical names map onto "device_id" under snake_case
        let descriptor = RecordDescriptor::new("reading")
            .field("deviceId", TypeDescriptor::Long)
            .field("deviceID", TypeDescriptor::Long)
            .into_descriptor();
        let err = SchemaBuilder::build(&descriptor, &SnakeCaseNaming).unwrap_err();
        assert!(matches!(err, SchemaError::Derivation { .. }));
    }

    #[test]
    fn invalid_shapes_are_rejected_by_the_parser() {
        // A union may not immediately contain another union
        let descriptor = RecordDescriptor::new("bad")
            .field(
                "nested",
                TypeDescriptor::Union(vec![TypeDescriptor::Union(vec![
                    TypeDescriptor::Null,
                    TypeDescriptor::Int,
                ])]),
            )
            .into_descriptor();
        let err = SchemaBuilder::build(&descriptor, &IdentityNaming).unwrap_err();
        assert!(matches!(err, SchemaError::Parse { .. }));
    }
}
