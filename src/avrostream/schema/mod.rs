//! Schema derivation engine
//!
//! Turns [`TypeDescriptor`] trees into Avro wire schemas, rewriting logical
//! names through a pluggable [`NamingStrategy`] so that wire field names can
//! differ systematically from in-memory names (snake_case on the wire,
//! camelCase in the type model, and so on).
//!
//! Derivation is pure: no shared state, deterministic output, safe to call
//! from any number of threads. A schema is derived once per
//! (descriptor, strategy) pair and is immutable thereafter.

pub mod builder;
pub mod compatibility;
pub mod descriptor;
pub mod error;
pub mod naming;

// Re-export commonly used types
pub use builder::{schemas_equal, SchemaBuilder};
pub use compatibility::{check as check_compatibility, CompatibilityResult};
pub use descriptor::{EnumDescriptor, FieldDefinition, RecordDescriptor, TypeDescriptor};
pub use error::{SchemaError, SchemaResult};
pub use naming::{IdentityNaming, NamingStrategy, PascalCaseNaming, SnakeCaseNaming};
