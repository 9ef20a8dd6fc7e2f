//! Format-polymorphic encoded streams for Avro data
//!
//! This module provides one stream abstraction over the three Avro wire
//! encodings, so producers and consumers pick a format once at
//! construction instead of hardcoding a codec.
//!
//! # Formats
//!
//! - **Binary**: raw Avro datums, headerless; schema travels out-of-band
//! - **Container**: self-describing object container file with an embedded
//!   schema and sync-marked blocks; supports block compression
//! - **Json**: Avro JSON documents, human-readable; schema out-of-band
//!
//! # Quick Start
//!
//! ```rust
//! use avrostream::{FieldValue, Format, StreamConfig};
//! use apache_avro::Schema;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::parse_str(
//!     r#"{"type": "record", "name": "ping",
//!         "fields": [{"name": "seq", "type": "long"}]}"#,
//! )?;
//!
//! let config = StreamConfig::builder(Format::Container)
//!     .writer_schema(schema)
//!     .build()?;
//!
//! let mut file = Vec::new();
//! {
//!     let mut writer = config.open_writer(&mut file)?;
//!     writer.append(&FieldValue::record([("seq", FieldValue::Long(1))]))?;
//!     writer.close()?;
//! }
//!
//! // The container header carries the schema, so no config is needed
//! // beyond the format to read it back
//! let reading = StreamConfig::builder(Format::Container).build()?;
//! for value in reading.open_reader(&file[..])? {
//!     println!("{:?}", value?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Schema Evolution
//!
//! Supplying a reader schema that differs from the writer schema enables
//! per-value resolution: writer-only fields are skipped, reader-only
//! fields fall back to their defaults, and numeric promotions are applied.
//! See [`resolution`] for the rules.

// Core types and errors
mod error;

// Value conversion and encoding layers
pub mod helpers;
pub mod json;
pub mod resolution;

// Stream configuration and the streams themselves
mod config;
mod stream;

// Re-export public API
pub use config::{ContainerCodec, Format, StreamConfig, StreamConfigBuilder};
pub use error::SerializationError;
pub use stream::{StreamReader, StreamWriter};

// Re-export conversion helpers (used by callers bridging their own value
// models to the Avro value model)
pub use helpers::{avro_to_field, field_to_avro, named_schemas};
pub use resolution::SchemaResolver;
