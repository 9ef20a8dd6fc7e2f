//! Writer/reader schema compatibility checking
//!
//! Pre-flight validation of a schema pair against the resolution rules,
//! without decoding any data. Useful for rejecting an incompatible schema
//! evolution before a stream is opened; per-value resolution during decode
//! remains the normative path.

use std::collections::HashSet;

use apache_avro::Schema;

/// Result of a compatibility check.
#[derive(Debug, Clone)]
pub struct CompatibilityResult {
    /// Whether every value writable under the writer schema can be
    /// resolved into the reader schema.
    pub is_compatible: bool,
    /// Incompatibility messages, empty when compatible.
    pub messages: Vec<String>,
}

impl CompatibilityResult {
    pub fn compatible() -> Self {
        CompatibilityResult {
            is_compatible: true,
            messages: Vec::new(),
        }
    }

    pub fn incompatible(messages: Vec<String>) -> Self {
        CompatibilityResult {
            is_compatible: false,
            messages,
        }
    }
}

/// Checks whether data written with `writer` can be read as `reader`.
///
/// Applies the same rules the per-value resolver enforces: missing reader
/// fields need defaults, common fields must live in the same promotable
/// type family, and reader enums must cover the writer's symbols or carry
/// a default. All problems found are reported, not just the first.
pub fn check(writer: &Schema, reader: &Schema) -> CompatibilityResult {
    let mut messages = Vec::new();
    let mut visited = HashSet::new();
    check_pair(writer, reader, "value", &mut messages, &mut visited);
    if messages.is_empty() {
        CompatibilityResult::compatible()
    } else {
        CompatibilityResult::incompatible(messages)
    }
}

fn check_pair(
    writer: &Schema,
    reader: &Schema,
    path: &str,
    messages: &mut Vec<String>,
    visited: &mut HashSet<(String, String)>,
) {
    match (writer, reader) {
        (Schema::Record(writer_record), Schema::Record(reader_record)) => {
            // Recursive schemas revisit the same record pair; check once
            let pair = (
                writer_record.name.name.clone(),
                reader_record.name.name.clone(),
            );
            if !visited.insert(pair) {
                return;
            }
            for reader_field in &reader_record.fields {
                let field_path = format!("{path}.{}", reader_field.name);
                match writer_record
                    .fields
                    .iter()
                    .find(|writer_field| writer_field.name == reader_field.name)
                {
                    Some(writer_field) => check_pair(
                        &writer_field.schema,
                        &reader_field.schema,
                        &field_path,
                        messages,
                        visited,
                    ),
                    None if reader_field.default.is_some() => {}
                    None => messages.push(format!(
                        "{field_path}: reader field missing from writer and has no default"
                    )),
                }
            }
        }
        (Schema::Enum(writer_enum), Schema::Enum(reader_enum)) => {
            if reader_enum.default.is_none() {
                for symbol in &writer_enum.symbols {
                    if !reader_enum.symbols.contains(symbol) {
                        messages.push(format!(
                            "{path}: writer symbol '{symbol}' unknown to reader and reader \
                             declares no default"
                        ));
                    }
                }
            }
        }
        (Schema::Union(writer_union), reader) => {
            // Every writer branch must find a home in the reader
            for branch in writer_union.variants() {
                if !branch_resolvable(branch, reader) {
                    messages.push(format!(
                        "{path}: writer union branch '{}' cannot resolve into reader schema",
                        family_name(branch)
                    ));
                }
            }
        }
        (writer, Schema::Union(reader_union)) => {
            if !reader_union
                .variants()
                .iter()
                .any(|branch| branch_resolvable(writer, branch))
            {
                messages.push(format!(
                    "{path}: writer type '{}' matches no reader union branch",
                    family_name(writer)
                ));
            }
        }
        (Schema::Array(writer_array), Schema::Array(reader_array)) => {
            check_pair(
                &writer_array.items,
                &reader_array.items,
                &format!("{path}[]"),
                messages,
                visited,
            );
        }
        (Schema::Map(writer_map), Schema::Map(reader_map)) => {
            check_pair(
                &writer_map.types,
                &reader_map.types,
                &format!("{path}{{}}"),
                messages,
                visited,
            );
        }
        (writer, reader) => {
            if !promotable(writer, reader) {
                messages.push(format!(
                    "{path}: writer type '{}' is not readable as '{}'",
                    family_name(writer),
                    family_name(reader)
                ));
            }
        }
    }
}

/// Shallow resolvability test used for union branch matching.
fn branch_resolvable(writer: &Schema, reader: &Schema) -> bool {
    match (writer, reader) {
        (Schema::Record(w), Schema::Record(r)) => w.name.name == r.name.name,
        (Schema::Enum(w), Schema::Enum(r)) => w.name.name == r.name.name,
        (Schema::Array(_), Schema::Array(_)) => true,
        (Schema::Map(_), Schema::Map(_)) => true,
        (Schema::Union(w), _) => w
            .variants()
            .iter()
            .all(|branch| branch_resolvable(branch, reader)),
        (_, Schema::Union(r)) => r
            .variants()
            .iter()
            .any(|branch| branch_resolvable(writer, branch)),
        (writer, reader) => promotable(writer, reader),
    }
}

/// The standard promotable set: int -> long -> float -> double, and
/// string <-> bytes.
fn promotable(writer: &Schema, reader: &Schema) -> bool {
    matches!(
        (writer, reader),
        (Schema::Null, Schema::Null)
            | (Schema::Boolean, Schema::Boolean)
            | (Schema::Int, Schema::Int)
            | (Schema::Int, Schema::Long)
            | (Schema::Int, Schema::Float)
            | (Schema::Int, Schema::Double)
            | (Schema::Long, Schema::Long)
            | (Schema::Long, Schema::Float)
            | (Schema::Long, Schema::Double)
            | (Schema::Float, Schema::Float)
            | (Schema::Float, Schema::Double)
            | (Schema::Double, Schema::Double)
            | (Schema::Bytes, Schema::Bytes)
            | (Schema::Bytes, Schema::String)
            | (Schema::String, Schema::String)
            | (Schema::String, Schema::Bytes)
    )
}

fn family_name(schema: &Schema) -> String {
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
        Schema::Union(_) => "union".to_string(),
        Schema::Record(record) => record.name.name.clone(),
        Schema::Enum(descriptor) => descriptor.name.name.clone(),
        Schema::Ref { name } => name.name.clone(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(document: &str) -> Schema {
        Schema::parse_str(document).expect("test schema must parse")
    }

    #[test]
    fn identical_schemas_are_compatible() {
        let schema = parse(
            r#"{"type": "record", "name": "point",
                "fields": [{"name": "x", "type": "long"}]}"#,
        );
        assert!(check(&schema, &schema).is_compatible);
    }

    #[test]
    fn reader_field_without_default_is_reported() {
        let writer = parse(
            r#"{"type": "record", "name": "point",
                "fields": [{"name": "x", "type": "long"}]}"#,
        );
        let reader = parse(
            r#"{"type": "record", "name": "point",
                "fields": [{"name": "x", "type": "long"},
                           {"name": "y", "type": "long"}]}"#,
        );
        let result = check(&writer, &reader);
        assert!(!result.is_compatible);
        assert_eq!(result.messages.len(), 1);
        assert!(result.messages[0].contains("value.y"), "{:?}", result.messages);
    }

    #[test]
    fn numeric_promotion_is_accepted_and_demotion_is_not() {
        let writer = parse(
            r#"{"type": "record", "name": "point",
                "fields": [{"name": "x", "type": "int"}]}"#,
        );
        let wider = parse(
            r#"{"type": "record", "name": "point",
                "fields": [{"name": "x", "type": "double"}]}"#,
        );
        assert!(check(&writer, &wider).is_compatible);
        assert!(!check(&wider, &writer).is_compatible);
    }

    #[test]
    fn enum_gap_needs_reader_default() {
        let writer = parse(
            r#"{"type": "enum", "name": "state", "symbols": ["ON", "OFF", "UNKNOWN"]}"#,
        );
        let gapped = parse(r#"{"type": "enum", "name": "state", "symbols": ["ON", "OFF"]}"#);
        assert!(!check(&writer, &gapped).is_compatible);

        let defaulted = parse(
            r#"{"type": "enum", "name": "state", "symbols": ["ON", "OFF"], "default": "OFF"}"#,
        );
        assert!(check(&writer, &defaulted).is_compatible);
    }
}
