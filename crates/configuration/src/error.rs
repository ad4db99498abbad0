use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    /// A table or column name that cannot be safely placed in a statement.
    #[error("Invalid SQL identifier for {what}: '{value}'")]
    InvalidIdentifier { what: String, value: String },

    #[error("Invalid bind address '{0}'")]
    InvalidAddress(String),
}
