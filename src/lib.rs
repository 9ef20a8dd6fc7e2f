//! # avrostream
//!
//! A schema-driven Avro serialization layer for strongly-typed record data,
//! designed for deriving wire schemas from type descriptors and moving values
//! through raw binary, object-container, and JSON encodings with full
//! writer/reader schema resolution.
//!
//! ## Features
//!
//! - **Schema derivation**: build Avro schemas from `TypeDescriptor` trees,
//!   rewriting field and type names through pluggable naming strategies
//! - **Three wire formats**: raw Avro datums, self-describing object
//!   container files, and Avro JSON, behind one stream abstraction
//! - **Schema evolution**: standard Avro resolution rules reconciling the
//!   schema data was written with against the schema the reader expects
//! - **Lazy decoding**: pull-based readers decode one value at a time, so
//!   container files of any size stream in bounded memory
//!
//! ## Quick Start
//!
//! ```rust
//! use avrostream::{
//!     FieldValue, Format, RecordDescriptor, SchemaBuilder, SnakeCaseNaming,
//!     StreamConfig, TypeDescriptor,
//! };
//! use std::collections::HashMap;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Describe a type and derive its wire schema
//! let descriptor = RecordDescriptor::new("userProfile")
//!     .field("userId", TypeDescriptor::Long)
//!     .optional_field("displayName", TypeDescriptor::String)
//!     .into_descriptor();
//! let schema = SchemaBuilder::build(&descriptor, &SnakeCaseNaming)?;
//!
//! // Bind the schema to a format and write a value
//! let config = StreamConfig::builder(Format::Binary)
//!     .writer_schema(schema)
//!     .build()?;
//!
//! let mut record = HashMap::new();
//! record.insert("user_id".to_string(), FieldValue::Long(42));
//! record.insert("display_name".to_string(), FieldValue::Null);
//!
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = config.open_writer(&mut buffer)?;
//!     writer.append(&FieldValue::Record(record))?;
//!     writer.close()?;
//! }
//!
//! // Read it back lazily
//! let mut reader = config.open_reader(&buffer[..])?;
//! let decoded = reader.next_value()?;
//! assert!(matches!(decoded, FieldValue::Record(_)));
//! reader.close();
//! # Ok(())
//! # }
//! ```

pub mod avrostream;

// Re-export the primary API at the crate root for convenience
pub use avrostream::schema::{
    schemas_equal, EnumDescriptor, FieldDefinition, IdentityNaming, NamingStrategy,
    PascalCaseNaming, RecordDescriptor, SchemaBuilder, SchemaError, SnakeCaseNaming,
    TypeDescriptor,
};
pub use avrostream::serialization::{
    ContainerCodec, Format, SerializationError, StreamConfig, StreamConfigBuilder, StreamReader,
    StreamWriter,
};
pub use avrostream::types::FieldValue;
