//! Error types for schema derivation

use thiserror::Error;

/// Errors raised while deriving a wire schema from a type descriptor.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The descriptor tree contains a shape that has no schema rendering.
    #[error("Schema derivation failed: {message}")]
    Derivation { message: String },

    /// A named back-reference points at a type that has not been defined
    /// earlier in the same derivation.
    #[error("Unresolved type reference: '{name}'")]
    UnresolvedReference { name: String },

    /// The assembled schema document was rejected by the Avro schema parser.
    #[error("Invalid schema document: {source}")]
    Parse {
        #[source]
        source: apache_avro::Error,
    },
}

impl SchemaError {
    pub fn derivation(message: impl Into<String>) -> Self {
        SchemaError::Derivation {
            message: message.into(),
        }
    }

    pub fn unresolved_reference(name: impl Into<String>) -> Self {
        SchemaError::UnresolvedReference { name: name.into() }
    }
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
