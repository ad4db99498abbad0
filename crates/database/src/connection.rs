use crate::error::DbError;
use crate::repository::PgRecordStore;
use configuration::{DatabaseSettings, ResourceSettings};
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Establishes the connection pool to the PostgreSQL database.
///
/// The pool is bounded by `max_connections`; a caller that finds every
/// connection checked out waits up to `acquire_timeout_secs` and then gets
/// `DbError::PoolExhausted`. Connections beyond `min_connections` are opened
/// lazily. The returned pool is meant to be created once at startup, shared
/// by cloning, and closed with `PgPool::close` at shutdown.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    if settings.url.trim().is_empty() {
        return Err(DbError::ConnectionConfigError(
            "DATABASE_URL must be set.".to_string(),
        ));
    }

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout())
        .connect(&settings.url)
        .await?;

    tracing::info!(
        max_connections = settings.max_connections,
        acquire_timeout_secs = settings.acquire_timeout_secs,
        "Database pool ready."
    );
    Ok(pool)
}

/// Creates the table of every resource that does not have one yet.
pub async fn create_tables(pool: &PgPool, resources: &[ResourceSettings]) -> Result<(), DbError> {
    for resource in resources {
        PgRecordStore::new(pool.clone(), resource)?
            .create_table()
            .await?;
    }
    Ok(())
}
