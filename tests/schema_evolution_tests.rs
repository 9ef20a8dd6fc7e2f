/*!
# Schema Evolution Tests

Tests for writer/reader schema resolution across the stream formats:
writer-only fields are skipped, reader-only fields fall back to their
defaults, promotions widen numerics, and missing defaults fail loudly
instead of silently zero-filling.
*/

use apache_avro::Schema;
use avrostream::{FieldValue, Format, SerializationError, StreamConfig};

fn parse(document: &str) -> Schema {
    Schema::parse_str(document).expect("test schema must parse")
}

fn writer_schema() -> Schema {
    parse(
        r#"{"type": "record", "name": "event",
            "fields": [{"name": "id", "type": "long"},
                       {"name": "legacy", "type": "int"}]}"#,
    )
}

fn write_one(config: &StreamConfig, value: &FieldValue) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut writer = config.open_writer(&mut buffer).expect("writer should open");
    writer.append(value).expect("append should succeed");
    writer.close().expect("close should flush cleanly");
    buffer
}

fn sample_event() -> FieldValue {
    FieldValue::record([
        ("id", FieldValue::Long(1)),
        ("legacy", FieldValue::Int(99)),
    ])
}

#[test]
fn test_writer_only_field_is_skipped_without_trace() {
    let reader_schema = parse(
        r#"{"type": "record", "name": "event",
            "fields": [{"name": "id", "type": "long"}]}"#,
    );

    for format in [Format::Binary, Format::Json, Format::Container] {
        let writing = StreamConfig::builder(format)
            .writer_schema(writer_schema())
            .build()
            .unwrap();
        let bytes = write_one(&writing, &sample_event());

        let reading = StreamConfig::builder(format)
            .writer_schema(writer_schema())
            .reader_schema(reader_schema.clone())
            .build()
            .unwrap();
        let mut reader = reading.open_reader(&bytes[..]).expect("reader should open");
        let decoded = reader.next_value().expect("resolution should succeed");

        match decoded {
            FieldValue::Record(fields) => {
                assert_eq!(fields.get("id"), Some(&FieldValue::Long(1)), "{format:?}");
                assert!(
                    !fields.contains_key("legacy"),
                    "{format:?}: skipped field must leave no trace"
                );
            }
            other => panic!("expected a record, got {other:?}"),
        }
    }
}

#[test]
fn test_reader_only_field_is_populated_from_its_default() {
    let reader_schema = parse(
        r#"{"type": "record", "name": "event",
            "fields": [{"name": "id", "type": "long"},
                       {"name": "legacy", "type": "int"},
                       {"name": "added", "type": "string", "default": "x"}]}"#,
    );

    for format in [Format::Binary, Format::Json, Format::Container] {
        let writing = StreamConfig::builder(format)
            .writer_schema(writer_schema())
            .build()
            .unwrap();
        let bytes = write_one(&writing, &sample_event());

        let reading = StreamConfig::builder(format)
            .writer_schema(writer_schema())
            .reader_schema(reader_schema.clone())
            .build()
            .unwrap();
        let mut reader = reading.open_reader(&bytes[..]).expect("reader should open");
        let decoded = reader.next_value().expect("resolution should succeed");

        match decoded {
            FieldValue::Record(fields) => {
                assert_eq!(
                    fields.get("added"),
                    Some(&FieldValue::String("x".to_string())),
                    "{format:?}"
                );
            }
            other => panic!("expected a record, got {other:?}"),
        }
    }
}

#[test]
fn test_missing_default_fails_resolution_not_zero_fills() {
    let reader_schema = parse(
        r#"{"type": "record", "name": "event",
            "fields": [{"name": "id", "type": "long"},
                       {"name": "legacy", "type": "int"},
                       {"name": "required", "type": "string"}]}"#,
    );

    let writing = StreamConfig::builder(Format::Binary)
        .writer_schema(writer_schema())
        .build()
        .unwrap();
    let bytes = write_one(&writing, &sample_event());

    let reading = StreamConfig::builder(Format::Binary)
        .writer_schema(writer_schema())
        .reader_schema(reader_schema)
        .build()
        .unwrap();
    let mut reader = reading.open_reader(&bytes[..]).expect("reader should open");
    let err = reader
        .next_value()
        .expect_err("a reader-only field without a default must fail");
    assert!(matches!(err, SerializationError::SchemaResolution { .. }));
}

#[test]
fn test_numeric_promotion_widens_across_the_standard_set() {
    let reader_schema = parse(
        r#"{"type": "record", "name": "event",
            "fields": [{"name": "id", "type": "double"},
                       {"name": "legacy", "type": "long"}]}"#,
    );

    let writing = StreamConfig::builder(Format::Binary)
        .writer_schema(writer_schema())
        .build()
        .unwrap();
    let bytes = write_one(&writing, &sample_event());

    let reading = StreamConfig::builder(Format::Binary)
        .writer_schema(writer_schema())
        .reader_schema(reader_schema)
        .build()
        .unwrap();
    let mut reader = reading.open_reader(&bytes[..]).expect("reader should open");
    let decoded = reader.next_value().expect("promotion should succeed");

    match decoded {
        FieldValue::Record(fields) => {
            assert_eq!(fields.get("id"), Some(&FieldValue::Double(1.0)));
            assert_eq!(fields.get("legacy"), Some(&FieldValue::Long(99)));
        }
        other => panic!("expected a record, got {other:?}"),
    }
}

#[test]
fn test_type_family_mismatch_is_rejected() {
    let reader_schema = parse(
        r#"{"type": "record", "name": "event",
            "fields": [{"name": "id", "type": "string"},
                       {"name": "legacy", "type": "int"}]}"#,
    );

    let writing = StreamConfig::builder(Format::Binary)
        .writer_schema(writer_schema())
        .build()
        .unwrap();
    let bytes = write_one(&writing, &sample_event());

    let reading = StreamConfig::builder(Format::Binary)
        .writer_schema(writer_schema())
        .reader_schema(reader_schema)
        .build()
        .unwrap();
    let mut reader = reading.open_reader(&bytes[..]).expect("reader should open");
    let err = reader
        .next_value()
        .expect_err("long is not readable as string");
    assert!(matches!(err, SerializationError::SchemaMismatch { .. }));
}

#[test]
fn test_enum_symbol_gap_uses_reader_default() {
    let writer_schema =
        parse(r#"{"type": "enum", "name": "state", "symbols": ["ON", "OFF", "HALF"]}"#);
    let reader_schema = parse(
        r#"{"type": "enum", "name": "state", "symbols": ["ON", "OFF"], "default": "OFF"}"#,
    );

    let writing = StreamConfig::builder(Format::Binary)
        .writer_schema(writer_schema.clone())
        .build()
        .unwrap();
    let bytes = write_one(&writing, &FieldValue::Enum("HALF".to_string()));

    let reading = StreamConfig::builder(Format::Binary)
        .writer_schema(writer_schema)
        .reader_schema(reader_schema)
        .build()
        .unwrap();
    let mut reader = reading.open_reader(&bytes[..]).expect("reader should open");
    let decoded = reader.next_value().expect("default symbol should apply");
    assert_eq!(decoded, FieldValue::Enum("OFF".to_string()));
}

#[test]
fn test_enum_symbol_gap_without_default_fails() {
    let writer_schema =
        parse(r#"{"type": "enum", "name": "state", "symbols": ["ON", "OFF", "HALF"]}"#);
    let reader_schema = parse(r#"{"type": "enum", "name": "state", "symbols": ["ON", "OFF"]}"#);

    let writing = StreamConfig::builder(Format::Binary)
        .writer_schema(writer_schema.clone())
        .build()
        .unwrap();
    let bytes = write_one(&writing, &FieldValue::Enum("HALF".to_string()));

    let reading = StreamConfig::builder(Format::Binary)
        .writer_schema(writer_schema)
        .reader_schema(reader_schema)
        .build()
        .unwrap();
    let mut reader = reading.open_reader(&bytes[..]).expect("reader should open");
    let err = reader.next_value().expect_err("no default symbol declared");
    assert!(matches!(err, SerializationError::SchemaMismatch { .. }));
}
