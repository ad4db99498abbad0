use crate::DbError;
use async_trait::async_trait;
use core_types::{NewRecord, Record};

/// The five data-access operations behind every resource.
///
/// Absence is a value, not an error: a lookup, update or delete that matches
/// no row returns `None`/`false`, leaving `Err` for genuine storage failures.
/// Implementations hold no authoritative copy of the data.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records, ascending by id.
    async fn list(&self) -> Result<Vec<Record>, DbError>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Record>, DbError>;

    /// Inserts a record and returns it with its storage-assigned id.
    async fn create(&self, record: NewRecord) -> Result<Record, DbError>;

    /// Overwrites label and flag of the matching row, keeping its id.
    async fn update_by_id(&self, id: i32, record: NewRecord) -> Result<Option<Record>, DbError>;

    /// True iff exactly one row was removed.
    async fn delete_by_id(&self, id: i32) -> Result<bool, DbError>;
}
