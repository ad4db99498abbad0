pub mod error;
pub mod record;
pub mod validation;

// Re-export the core types to provide a clean public API.
pub use error::ValidationError;
pub use record::{FieldNames, NewRecord, Record};
pub use validation::validate;
