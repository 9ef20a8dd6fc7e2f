/*!
# Common Test Data

Shared descriptors and record constructors used across the stream and
schema tests.
*/

// Not every test target uses every constructor
#![allow(dead_code)]

use avrostream::{EnumDescriptor, FieldValue, RecordDescriptor, TypeDescriptor};

/// Descriptor for a telemetry reading: a long id, an enum status, an
/// optional nested location record, and a collection of samples.
pub fn sensor_reading_descriptor() -> TypeDescriptor {
    RecordDescriptor::new("sensorReading")
        .field("deviceId", TypeDescriptor::Long)
        .field(
            "status",
            EnumDescriptor::new("deviceStatus", ["ACTIVE", "IDLE", "OFFLINE"]).into_descriptor(),
        )
        .optional_field("location", geo_point_descriptor())
        .field("samples", TypeDescriptor::array(TypeDescriptor::Double))
        .into_descriptor()
}

pub fn geo_point_descriptor() -> TypeDescriptor {
    RecordDescriptor::new("geoPoint")
        .field("latitude", TypeDescriptor::Double)
        .field("longitude", TypeDescriptor::Double)
        .into_descriptor()
}

/// A reading with a populated nested location record.
pub fn located_reading() -> FieldValue {
    FieldValue::record([
        ("deviceId", FieldValue::Long(42)),
        ("status", FieldValue::Enum("ACTIVE".to_string())),
        (
            "location",
            FieldValue::record([
                ("latitude", FieldValue::Double(59.33)),
                ("longitude", FieldValue::Double(18.06)),
            ]),
        ),
        (
            "samples",
            FieldValue::Array(vec![
                FieldValue::Double(0.5),
                FieldValue::Double(1.25),
            ]),
        ),
    ])
}

/// A reading with a null optional field and an empty collection.
pub fn bare_reading() -> FieldValue {
    FieldValue::record([
        ("deviceId", FieldValue::Long(7)),
        ("status", FieldValue::Enum("OFFLINE".to_string())),
        ("location", FieldValue::Null),
        ("samples", FieldValue::Array(Vec::new())),
    ])
}
