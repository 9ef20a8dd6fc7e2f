//! Error types for stream serialization
//!
//! Every error here is terminal for the stream that raised it: nothing is
//! retried internally, the underlying byte source or sink is released on
//! the way out, and no partial value is ever surfaced in place of a
//! decoded one. Callers decide whether to retry at a higher level by
//! re-opening the source.

use crate::avrostream::schema::SchemaError;
use thiserror::Error;

/// Serialization error type.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// A required schema could not be resolved or derived at stream
    /// construction time.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Schema derivation from a type descriptor failed.
    #[error("Schema derivation failed")]
    Schema(#[from] SchemaError),

    /// Writer and reader schemas disagree in an unreconcilable way for a
    /// given field or value.
    #[error("Schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A reader-only field has no default value to populate from.
    #[error("Schema resolution failed: {message}")]
    SchemaResolution { message: String },

    /// A value could not be encoded under the writer schema.
    #[error("Encode failed: {message}")]
    Encode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed bytes inconsistent with the declared writer schema:
    /// truncated input, a bad union tag, a corrupt container sync marker.
    #[error("Decode failed: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A guaranteed-next value was requested but the stream was exhausted.
    #[error("Stream exhausted: no further values")]
    EmptyResult,

    /// The stream was used after being closed.
    #[error("Stream is closed")]
    Closed,

    /// The underlying byte source or sink failed.
    #[error("I/O operation failed")]
    Io(#[from] std::io::Error),
}

impl SerializationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        SerializationError::Configuration {
            message: message.into(),
        }
    }

    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        SerializationError::SchemaMismatch {
            message: message.into(),
        }
    }

    pub fn schema_resolution(message: impl Into<String>) -> Self {
        SerializationError::SchemaResolution {
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        SerializationError::Encode {
            message: message.into(),
            source: None,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        SerializationError::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Decode failure caused by the Avro codec layer.
    pub fn avro_error(message: impl Into<String>, source: apache_avro::Error) -> Self {
        SerializationError::Decode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Encode failure caused by the Avro codec layer.
    pub fn avro_encode_error(message: impl Into<String>, source: apache_avro::Error) -> Self {
        SerializationError::Encode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Decode failure caused by the JSON layer.
    pub fn json_error(message: impl Into<String>, source: serde_json::Error) -> Self {
        SerializationError::Decode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
