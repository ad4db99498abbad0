use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection is not configured: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    Query(sqlx::Error),

    /// No pooled connection became free within the acquire timeout.
    #[error("Timed out waiting for a pooled database connection")]
    PoolExhausted,

    #[error("Invalid SQL identifier '{0}'")]
    InvalidIdentifier(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            other => DbError::Query(other),
        }
    }
}
