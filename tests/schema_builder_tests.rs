/*!
# Schema Builder Tests

Tests for schema derivation: determinism, naming-strategy application at
every nesting depth, union ordering for optional fields, and round-tripping
the derived document through the schema parser.
*/

mod common;

use apache_avro::Schema;
use avrostream::avrostream::schema::check_compatibility;
use avrostream::{
    schemas_equal, IdentityNaming, PascalCaseNaming, RecordDescriptor, SchemaBuilder,
    SnakeCaseNaming, TypeDescriptor,
};
use common::sensor_reading_descriptor;

#[test]
fn test_derivation_is_deterministic_per_strategy() {
    for strategy in [
        &IdentityNaming as &dyn avrostream::NamingStrategy,
        &SnakeCaseNaming,
        &PascalCaseNaming,
    ] {
        let first = SchemaBuilder::build(&sensor_reading_descriptor(), strategy)
            .expect("derivation should succeed");
        let second = SchemaBuilder::build(&sensor_reading_descriptor(), strategy)
            .expect("derivation should succeed");
        assert_eq!(
            first.canonical_form(),
            second.canonical_form(),
            "equal inputs must produce byte-identical canonical documents"
        );
    }
}

#[test]
fn test_snake_case_applies_to_nested_records_and_enums() {
    let schema = SchemaBuilder::build(&sensor_reading_descriptor(), &SnakeCaseNaming)
        .expect("derivation should succeed");
    let canonical = schema.canonical_form();

    assert!(canonical.contains("\"sensor_reading\""), "{canonical}");
    assert!(canonical.contains("\"device_id\""), "{canonical}");
    // The enum and the nested record are renamed too, not only the top level
    assert!(canonical.contains("\"device_status\""), "{canonical}");
    assert!(canonical.contains("\"geo_point\""), "{canonical}");
    assert!(canonical.contains("\"latitude\""), "{canonical}");
}

#[test]
fn test_pascal_case_renames_named_types() {
    let schema = SchemaBuilder::build(&sensor_reading_descriptor(), &PascalCaseNaming)
        .expect("derivation should succeed");
    let canonical = schema.canonical_form();
    assert!(canonical.contains("\"SensorReading\""), "{canonical}");
    assert!(canonical.contains("\"GeoPoint\""), "{canonical}");
}

#[test]
fn test_optional_field_union_is_null_first() {
    let schema = SchemaBuilder::build(&sensor_reading_descriptor(), &IdentityNaming)
        .expect("derivation should succeed");
    let document: serde_json::Value =
        serde_json::from_str(&schema.canonical_form()).expect("canonical form is JSON");

    let fields = document["fields"].as_array().expect("record has fields");
    let location = fields
        .iter()
        .find(|field| field["name"] == "location")
        .expect("location field present");
    let union = location["type"].as_array().expect("optional field is a union");
    assert_eq!(union[0], "null", "optional unions are [null, T], never [T, null]");
}

#[test]
fn test_derived_document_round_trips_through_the_parser() {
    let schema = SchemaBuilder::build(&sensor_reading_descriptor(), &SnakeCaseNaming)
        .expect("derivation should succeed");
    let reparsed = Schema::parse_str(&schema.canonical_form())
        .expect("canonical document should parse back");
    assert!(schemas_equal(&schema, &reparsed));
}

#[test]
fn test_back_reference_reuses_the_named_type() {
    let descriptor = RecordDescriptor::new("linkedNode")
        .field("value", TypeDescriptor::Long)
        .optional_field("next", TypeDescriptor::reference("linkedNode"))
        .into_descriptor();
    let schema = SchemaBuilder::build(&descriptor, &IdentityNaming)
        .expect("self-referential record should derive via back-reference");
    let canonical = schema.canonical_form();
    assert!(canonical.contains("linkedNode"), "{canonical}");
}

#[test]
fn test_equal_descriptors_under_different_strategies_are_distinct() {
    let snake = SchemaBuilder::build(&sensor_reading_descriptor(), &SnakeCaseNaming).unwrap();
    let pascal = SchemaBuilder::build(&sensor_reading_descriptor(), &PascalCaseNaming).unwrap();
    assert!(!schemas_equal(&snake, &pascal));
}

#[test]
fn test_compatibility_preflight_flags_missing_default() {
    let writer = SchemaBuilder::build(&sensor_reading_descriptor(), &IdentityNaming).unwrap();
    let reader = Schema::parse_str(
        r#"{"type": "record", "name": "sensorReading",
            "fields": [{"name": "deviceId", "type": "long"},
                       {"name": "firmware", "type": "string"}]}"#,
    )
    .unwrap();
    let result = check_compatibility(&writer, &reader);
    assert!(!result.is_compatible);
    assert!(
        result.messages.iter().any(|message| message.contains("firmware")),
        "{:?}",
        result.messages
    );
}
