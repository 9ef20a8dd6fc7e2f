pub mod schema;
pub mod serialization;
pub mod types;

// Re-export stream types for examples and tests
pub use serialization::{Format, StreamConfig, StreamReader, StreamWriter};
pub use types::FieldValue;
