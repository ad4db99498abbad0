use crate::store::RecordStore;
use crate::DbError;
use async_trait::async_trait;
use configuration::{is_sql_identifier, ResourceSettings};
use core_types::{NewRecord, Record};
use sqlx::postgres::PgPool;
use std::sync::Arc;

/// SQL text for one resource table.
///
/// Table and column names cannot be bound as parameters, so they are checked
/// against the identifier grammar and quoted into the text once, here.
/// Every value is still a bound parameter. Columns are aliased to `label` and
/// `flag` so rows decode straight into `Record`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statements {
    pub list: String,
    pub get: String,
    pub insert: String,
    pub update: String,
    pub delete: String,
    pub create_table: String,
}

impl Statements {
    pub fn for_resource(resource: &ResourceSettings) -> Result<Self, DbError> {
        let table = quote(resource.table())?;
        let label = quote(resource.label_column())?;
        let flag = quote(resource.flag_column())?;
        let columns = format!("id, {label} AS label, {flag} AS flag");

        Ok(Self {
            list: format!("SELECT {columns} FROM {table} ORDER BY id ASC"),
            get: format!("SELECT {columns} FROM {table} WHERE id = $1"),
            insert: format!(
                "INSERT INTO {table} ({label}, {flag}) VALUES ($1, $2) RETURNING {columns}"
            ),
            update: format!(
                "UPDATE {table} SET {label} = $1, {flag} = $2 WHERE id = $3 RETURNING {columns}"
            ),
            delete: format!("DELETE FROM {table} WHERE id = $1"),
            create_table: format!(
                "CREATE TABLE IF NOT EXISTS {table} (id SERIAL PRIMARY KEY, {label} TEXT NOT NULL, {flag} BOOLEAN NOT NULL)"
            ),
        })
    }
}

fn quote(identifier: &str) -> Result<String, DbError> {
    if !is_sql_identifier(identifier) {
        return Err(DbError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(format!("\"{identifier}\""))
}

/// PostgreSQL-backed `RecordStore` for a single resource table.
///
/// Each operation checks out exactly one connection from the shared pool for
/// the length of one statement. The checkout is a `PoolConnection`, which goes
/// back to the pool when dropped, so it is returned on every exit path
/// including `?` on a failed statement.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
    table: String,
    statements: Arc<Statements>,
}

impl PgRecordStore {
    /// Creates a store for `resource` on a shared connection pool.
    pub fn new(pool: PgPool, resource: &ResourceSettings) -> Result<Self, DbError> {
        Ok(Self {
            pool,
            table: resource.table().to_string(),
            statements: Arc::new(Statements::for_resource(resource)?),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Creates the backing table if it does not exist yet.
    pub async fn create_table(&self) -> Result<(), DbError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(&self.statements.create_table)
            .execute(&mut *conn)
            .await?;
        tracing::info!(table = %self.table, "Ensured resource table exists.");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list(&self) -> Result<Vec<Record>, DbError> {
        let mut conn = self.pool.acquire().await?;
        let records = sqlx::query_as::<_, Record>(&self.statements.list)
            .fetch_all(&mut *conn)
            .await?;
        tracing::debug!(table = %self.table, count = records.len(), "Listed records.");
        Ok(records)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Record>, DbError> {
        let mut conn = self.pool.acquire().await?;
        let record = sqlx::query_as::<_, Record>(&self.statements.get)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        tracing::debug!(table = %self.table, id, found = record.is_some(), "Fetched record.");
        Ok(record)
    }

    async fn create(&self, record: NewRecord) -> Result<Record, DbError> {
        let mut conn = self.pool.acquire().await?;
        let created = sqlx::query_as::<_, Record>(&self.statements.insert)
            .bind(record.label())
            .bind(record.flag())
            .fetch_one(&mut *conn)
            .await?;
        tracing::debug!(table = %self.table, id = created.id, "Created record.");
        Ok(created)
    }

    async fn update_by_id(&self, id: i32, record: NewRecord) -> Result<Option<Record>, DbError> {
        let mut conn = self.pool.acquire().await?;
        let updated = sqlx::query_as::<_, Record>(&self.statements.update)
            .bind(record.label())
            .bind(record.flag())
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        tracing::debug!(table = %self.table, id, found = updated.is_some(), "Updated record.");
        Ok(updated)
    }

    async fn delete_by_id(&self, id: i32) -> Result<bool, DbError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(&self.statements.delete)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        let deleted = result.rows_affected() == 1;
        tracing::debug!(table = %self.table, id, deleted, "Deleted record.");
        Ok(deleted)
    }
}
