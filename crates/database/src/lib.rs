//! # Marquee Database Crate
//!
//! This crate is the only place that knows about PostgreSQL. Everything above
//! it talks to a resource table through the `RecordStore` trait.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** The SQL for a resource is generated once from its settings
//!   (table and column names) and every value is passed as a bound parameter.
//! - **Asynchronous & Pooled:** All operations are asynchronous and each one
//!   checks out a single connection from a shared `PgPool` for the duration of
//!   one statement. The checkout is released on every exit path.
//! - **Absence is not failure:** "no such record" is `None`/`false`; `DbError`
//!   is reserved for connection, statement and pool failures.
//!
//! ## Public API
//!
//! - `connect`: builds the bounded connection pool from `DatabaseSettings`.
//! - `create_tables`: `CREATE TABLE IF NOT EXISTS` for each configured resource.
//! - `RecordStore`: list / get / create / update / delete for one resource.
//! - `PgRecordStore`: the PostgreSQL implementation of `RecordStore`.
//! - `DbError`: the error type returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, create_tables};
pub use error::DbError;
pub use repository::{PgRecordStore, Statements};
pub use store::RecordStore;
