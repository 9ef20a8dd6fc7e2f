//! Stream configuration and construction
//!
//! A [`StreamConfig`] immutably binds a wire format to an optional
//! writer/reader schema pair and opens concrete streams over byte sources
//! and sinks. The format set is closed: the three variants below are fixed
//! by the wire protocol, not extensible by callers, and dispatch happens
//! once at construction.

use apache_avro::Schema;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use super::error::SerializationError;
use super::stream::{StreamReader, StreamWriter};
use crate::avrostream::schema::{IdentityNaming, SchemaBuilder, TypeDescriptor};

/// The wire encoding of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Headerless sequence of raw Avro datums; the schema travels
    /// out-of-band on both sides.
    Binary,
    /// One Avro JSON document per value; the schema travels out-of-band.
    Json,
    /// Self-describing object container file: magic, embedded writer
    /// schema, and sync-marked blocks.
    Container,
}

/// Block compression for container files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerCodec {
    #[default]
    Null,
    Deflate,
}

impl ContainerCodec {
    pub(crate) fn to_avro(self) -> apache_avro::Codec {
        match self {
            ContainerCodec::Null => apache_avro::Codec::Null,
            ContainerCodec::Deflate => apache_avro::Codec::Deflate,
        }
    }
}

/// Immutable binding of a format to its schemas.
///
/// Binary and JSON formats require a writer schema (explicit, or derived
/// from a type descriptor with the identity naming strategy); the
/// container format can omit it on the read side because the file header
/// carries its own. A config is reusable: each `open_*` call produces an
/// independent stream over its own byte source or sink.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    format: Format,
    writer_schema: Option<Schema>,
    reader_schema: Option<Schema>,
    codec: ContainerCodec,
}

impl StreamConfig {
    pub fn builder(format: Format) -> StreamConfigBuilder {
        StreamConfigBuilder {
            format,
            writer_schema: None,
            reader_schema: None,
            descriptor: None,
            codec: ContainerCodec::default(),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn writer_schema(&self) -> Option<&Schema> {
        self.writer_schema.as_ref()
    }

    pub fn reader_schema(&self) -> Option<&Schema> {
        self.reader_schema.as_ref()
    }

    pub(crate) fn codec(&self) -> ContainerCodec {
        self.codec
    }

    /// Opens a decoding stream over `source`.
    ///
    /// The stream owns `source` exclusively until it is closed or dropped.
    pub fn open_reader<R: Read>(&self, source: R) -> Result<StreamReader<R>, SerializationError> {
        log::debug!("opening {:?} reader", self.format);
        StreamReader::open(self, source)
    }

    /// Opens an encoding stream over `sink`.
    ///
    /// Every format needs a writer schema on the write side; a container
    /// config built without one fails here with a configuration error.
    pub fn open_writer<W: Write>(
        &self,
        sink: W,
    ) -> Result<StreamWriter<'_, W>, SerializationError> {
        log::debug!("opening {:?} writer", self.format);
        StreamWriter::open(self, sink)
    }
}

/// Builder for [`StreamConfig`].
#[derive(Debug, Clone)]
pub struct StreamConfigBuilder {
    format: Format,
    writer_schema: Option<Schema>,
    reader_schema: Option<Schema>,
    descriptor: Option<TypeDescriptor>,
    codec: ContainerCodec,
}

impl StreamConfigBuilder {
    /// The schema the data was (or will be) written with.
    pub fn writer_schema(mut self, schema: Schema) -> Self {
        self.writer_schema = Some(schema);
        self
    }

    /// The schema the consumer expects; enables per-value resolution when
    /// it differs from the writer schema.
    pub fn reader_schema(mut self, schema: Schema) -> Self {
        self.reader_schema = Some(schema);
        self
    }

    /// Fallback source for the writer schema: if none was supplied
    /// explicitly, one is derived from this descriptor with the identity
    /// naming strategy.
    pub fn descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// Block compression for container writers. Ignored by the other
    /// formats and by container readers, which honor the file header.
    pub fn container_codec(mut self, codec: ContainerCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn build(self) -> Result<StreamConfig, SerializationError> {
        let writer_schema = match self.writer_schema {
            Some(schema) => Some(schema),
            None => match &self.descriptor {
                Some(descriptor) => {
                    log::debug!("deriving writer schema from descriptor with identity naming");
                    Some(SchemaBuilder::build(descriptor, &IdentityNaming)?)
                }
                None => None,
            },
        };

        // Only the container format carries its own schema; the other two
        // cannot legitimately omit one
        if writer_schema.is_none() && self.format != Format::Container {
            return Err(SerializationError::configuration(format!(
                "{:?} format requires a writer schema, and none was supplied or derivable",
                self.format
            )));
        }

        Ok(StreamConfig {
            format: self.format,
            writer_schema,
            reader_schema: self.reader_schema,
            codec: self.codec,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avrostream::schema::RecordDescriptor;

    #[test]
    fn binary_without_schema_or_descriptor_fails() {
        let err = StreamConfig::builder(Format::Binary).build().unwrap_err();
        assert!(matches!(err, SerializationError::Configuration { .. }));
    }

    #[test]
    fn container_without_schema_builds_for_reading() {
        let config = StreamConfig::builder(Format::Container).build().unwrap();
        assert!(config.writer_schema().is_none());
    }

    #[test]
    fn missing_writer_schema_is_derived_from_the_descriptor() {
        let descriptor = RecordDescriptor::new("pingEvent")
            .field("sentAt", TypeDescriptor::Long)
            .into_descriptor();
        let config = StreamConfig::builder(Format::Json)
            .descriptor(descriptor)
            .build()
            .unwrap();
        // Identity naming: logical names survive untouched
        let canonical = config.writer_schema().unwrap().canonical_form();
        assert!(canonical.contains("pingEvent"), "{canonical}");
        assert!(canonical.contains("sentAt"), "{canonical}");
    }
}
