//! Format-polymorphic encoded streams
//!
//! A [`StreamReader`] pulls values out of a byte source one at a time:
//! forward-only, non-restartable, single-consumer. A [`StreamWriter`]
//! appends values to a byte sink. Neither is safe for concurrent use from
//! multiple threads; callers needing fan-out open independent streams over
//! independent sources.
//!
//! Mixing `Iterator` consumption and [`StreamReader::next_value`] on the
//! same instance is a programmer error: both advance the same underlying
//! cursor, so interleaving them yields values in neither order callers
//! expect. Pick one access style per stream.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};

use apache_avro::types::Value as AvroValue;
use apache_avro::{from_avro_datum, to_avro_datum, Schema};
use serde_json::Value as JsonValue;

use super::config::StreamConfig;
use super::error::SerializationError;
use super::helpers::{avro_to_field, field_to_avro, named_schemas};
use super::json::{json_to_value, value_to_json};
use super::resolution::SchemaResolver;
use crate::avrostream::types::FieldValue;

/// Lazy decoding stream over a byte source.
///
/// Implements `Iterator`; iteration ends at end-of-input. A decode failure
/// surfaces as the current item's error and leaves the stream closed: the
/// byte source is released and no further values can be read.
pub struct StreamReader<R: Read> {
    state: ReaderState<R>,
}

enum ReaderState<R: Read> {
    Open(Box<ReaderKind<R>>),
    /// End of input was reached; the source has been released.
    Drained,
    /// Closed explicitly or by a decode failure.
    Closed,
}

enum ReaderKind<R: Read> {
    Binary {
        source: BufReader<R>,
        writer_schema: Schema,
        resolution: Option<(Schema, SchemaResolver)>,
    },
    Json {
        documents: serde_json::StreamDeserializer<'static, serde_json::de::IoRead<R>, JsonValue>,
        writer_schema: Schema,
        names: HashMap<String, Schema>,
        resolution: Option<(Schema, SchemaResolver)>,
    },
    Container {
        blocks: apache_avro::Reader<'static, R>,
        /// Schema embedded in the file header.
        writer_schema: Schema,
        resolution: Option<(Schema, SchemaResolver)>,
    },
}

enum ReadOutcome {
    Value(FieldValue),
    End,
    Failed(SerializationError),
}

impl<R: Read> StreamReader<R> {
    pub(crate) fn open(
        config: &StreamConfig,
        source: R,
    ) -> Result<StreamReader<R>, SerializationError> {
        let kind = match config.format() {
            super::Format::Binary => {
                let writer_schema = required_writer_schema(config)?;
                ReaderKind::Binary {
                    source: BufReader::new(source),
                    resolution: resolution_for(&writer_schema, config.reader_schema()),
                    writer_schema,
                }
            }
            super::Format::Json => {
                let writer_schema = required_writer_schema(config)?;
                ReaderKind::Json {
                    documents: serde_json::Deserializer::from_reader(source)
                        .into_iter::<JsonValue>(),
                    names: named_schemas(&writer_schema),
                    resolution: resolution_for(&writer_schema, config.reader_schema()),
                    writer_schema,
                }
            }
            super::Format::Container => {
                let blocks = apache_avro::Reader::new(source).map_err(|e| {
                    SerializationError::avro_error("failed to read container header", e)
                })?;
                let writer_schema = blocks.writer_schema().clone();
                if let Some(expected) = config.writer_schema() {
                    if expected.canonical_form() != writer_schema.canonical_form() {
                        log::debug!(
                            "container header schema differs from the configured writer schema; \
                             the header wins"
                        );
                    }
                }
                ReaderKind::Container {
                    blocks,
                    resolution: resolution_for(&writer_schema, config.reader_schema()),
                    writer_schema,
                }
            }
        };
        Ok(StreamReader {
            state: ReaderState::Open(Box::new(kind)),
        })
    }

    /// Returns the next decoded value, failing with
    /// [`SerializationError::EmptyResult`] at end-of-input and
    /// [`SerializationError::Closed`] after the stream was closed.
    pub fn next_value(&mut self) -> Result<FieldValue, SerializationError> {
        if matches!(self.state, ReaderState::Closed) {
            return Err(SerializationError::Closed);
        }
        match self.next() {
            Some(result) => result,
            None => Err(SerializationError::EmptyResult),
        }
    }

    /// Closes the stream and releases the underlying byte source.
    /// Idempotent: closing twice is a no-op.
    pub fn close(&mut self) {
        self.state = ReaderState::Closed;
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, ReaderState::Closed)
    }
}

impl<R: Read> Iterator for StreamReader<R> {
    type Item = Result<FieldValue, SerializationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = match &mut self.state {
            ReaderState::Open(kind) => kind,
            _ => return None,
        };
        match kind.read_next() {
            ReadOutcome::Value(value) => Some(Ok(value)),
            ReadOutcome::End => {
                self.state = ReaderState::Drained;
                None
            }
            ReadOutcome::Failed(error) => {
                // Terminal: release the source and refuse further reads
                self.state = ReaderState::Closed;
                Some(Err(error))
            }
        }
    }
}

impl<R: Read> ReaderKind<R> {
    fn read_next(&mut self) -> ReadOutcome {
        match self.try_read_next() {
            Ok(Some(value)) => ReadOutcome::Value(value),
            Ok(None) => ReadOutcome::End,
            Err(error) => ReadOutcome::Failed(error),
        }
    }

    fn try_read_next(&mut self) -> Result<Option<FieldValue>, SerializationError> {
        match self {
            ReaderKind::Binary {
                source,
                writer_schema,
                resolution,
            } => {
                if source.fill_buf()?.is_empty() {
                    return Ok(None);
                }
                let value = from_avro_datum(writer_schema, source, None).map_err(|e| {
                    SerializationError::avro_error("failed to decode Avro datum", e)
                })?;
                finish_value(value, writer_schema, resolution)
            }
            ReaderKind::Json {
                documents,
                writer_schema,
                names,
                resolution,
            } => {
                let document = match documents.next() {
                    None => return Ok(None),
                    Some(Err(e)) => {
                        return Err(SerializationError::json_error("failed to parse JSON", e))
                    }
                    Some(Ok(document)) => document,
                };
                let value = json_to_value(&document, writer_schema, names)?;
                finish_value(value, writer_schema, resolution)
            }
            ReaderKind::Container {
                blocks,
                writer_schema,
                resolution,
            } => {
                let value = match blocks.next() {
                    None => return Ok(None),
                    Some(Err(e)) => {
                        return Err(SerializationError::avro_error(
                            "failed to decode container block",
                            e,
                        ))
                    }
                    Some(Ok(value)) => value,
                };
                finish_value(value, writer_schema, resolution)
            }
        }
    }
}

fn finish_value(
    value: AvroValue,
    writer_schema: &Schema,
    resolution: &Option<(Schema, SchemaResolver)>,
) -> Result<Option<FieldValue>, SerializationError> {
    let value = match resolution {
        Some((reader_schema, resolver)) => resolver.resolve(value, writer_schema, reader_schema)?,
        None => value,
    };
    avro_to_field(value).map(Some)
}

fn required_writer_schema(config: &StreamConfig) -> Result<Schema, SerializationError> {
    config.writer_schema().cloned().ok_or_else(|| {
        SerializationError::configuration(format!(
            "{:?} format requires a writer schema",
            config.format()
        ))
    })
}

fn resolution_for(
    writer_schema: &Schema,
    reader_schema: Option<&Schema>,
) -> Option<(Schema, SchemaResolver)> {
    reader_schema.map(|reader| {
        (
            reader.clone(),
            SchemaResolver::new(writer_schema, reader),
        )
    })
}

/// Encoding stream over a byte sink.
///
/// Borrows the schema from its [`StreamConfig`] for the duration of the
/// stream. `close` flushes buffered data (for the container format it
/// finalizes the current block) and is idempotent.
pub struct StreamWriter<'s, W: Write> {
    state: WriterState<'s, W>,
}

enum WriterState<'s, W: Write> {
    Open(WriterKind<'s, W>),
    Closed,
}

enum WriterKind<'s, W: Write> {
    Binary {
        sink: W,
        schema: &'s Schema,
        names: HashMap<String, Schema>,
    },
    Json {
        sink: W,
        schema: &'s Schema,
        names: HashMap<String, Schema>,
    },
    Container {
        writer: apache_avro::Writer<'s, W>,
        schema: &'s Schema,
        names: HashMap<String, Schema>,
    },
}

impl<'s, W: Write> StreamWriter<'s, W> {
    pub(crate) fn open(
        config: &'s StreamConfig,
        sink: W,
    ) -> Result<StreamWriter<'s, W>, SerializationError> {
        let schema = config.writer_schema().ok_or_else(|| {
            SerializationError::configuration(
                "writing requires a writer schema for every format".to_string(),
            )
        })?;
        let names = named_schemas(schema);
        let kind = match config.format() {
            super::Format::Binary => WriterKind::Binary {
                sink,
                schema,
                names,
            },
            super::Format::Json => WriterKind::Json {
                sink,
                schema,
                names,
            },
            super::Format::Container => WriterKind::Container {
                writer: apache_avro::Writer::with_codec(schema, sink, config.codec().to_avro()),
                schema,
                names,
            },
        };
        Ok(StreamWriter {
            state: WriterState::Open(kind),
        })
    }

    /// Encodes one value under the writer schema and appends it.
    ///
    /// A value that does not fit the schema fails without writing; the
    /// stream stays usable. I/O failures come from the sink itself.
    pub fn append(&mut self, value: &FieldValue) -> Result<(), SerializationError> {
        let kind = match &mut self.state {
            WriterState::Open(kind) => kind,
            WriterState::Closed => return Err(SerializationError::Closed),
        };
        match kind {
            WriterKind::Binary {
                sink,
                schema,
                names,
            } => {
                let encoded = field_to_avro(value, schema, names)?;
                let bytes = to_avro_datum(schema, encoded).map_err(|e| {
                    SerializationError::avro_encode_error("failed to encode Avro datum", e)
                })?;
                sink.write_all(&bytes)?;
            }
            WriterKind::Json {
                sink,
                schema,
                names,
            } => {
                let encoded = field_to_avro(value, schema, names)?;
                let document = value_to_json(&encoded, schema, names)?;
                serde_json::to_writer(&mut *sink, &document).map_err(|e| {
                    SerializationError::Encode {
                        message: "failed to write JSON document".to_string(),
                        source: Some(Box::new(e)),
                    }
                })?;
                sink.write_all(b"\n")?;
            }
            WriterKind::Container {
                writer,
                schema,
                names,
            } => {
                let encoded = field_to_avro(value, schema, names)?;
                writer.append(encoded).map_err(|e| {
                    SerializationError::avro_encode_error("failed to append to container", e)
                })?;
            }
        }
        Ok(())
    }

    /// Flushes buffered data to the sink. For the container format this
    /// closes out the current block with its sync marker.
    pub fn flush(&mut self) -> Result<(), SerializationError> {
        match &mut self.state {
            WriterState::Closed => Err(SerializationError::Closed),
            WriterState::Open(WriterKind::Binary { sink, .. })
            | WriterState::Open(WriterKind::Json { sink, .. }) => {
                sink.flush().map_err(Into::into)
            }
            WriterState::Open(WriterKind::Container { writer, .. }) => {
                writer.flush().map(|_| ()).map_err(|e| {
                    SerializationError::avro_encode_error("failed to flush container block", e)
                })
            }
        }
    }

    /// Flushes remaining data and releases the sink. Idempotent: closing
    /// twice is a no-op.
    pub fn close(&mut self) -> Result<(), SerializationError> {
        match std::mem::replace(&mut self.state, WriterState::Closed) {
            WriterState::Closed => Ok(()),
            WriterState::Open(WriterKind::Binary { mut sink, .. })
            | WriterState::Open(WriterKind::Json { mut sink, .. }) => {
                sink.flush().map_err(Into::into)
            }
            WriterState::Open(WriterKind::Container { writer, .. }) => {
                writer.into_inner().map(|_| ()).map_err(|e| {
                    SerializationError::avro_encode_error("failed to finalize container", e)
                })
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, WriterState::Closed)
    }
}
