//! Storage traits and common types.
//!
//! Defines the interface the sync run writes through, so the Postgres
//! backend and the in-memory backend are interchangeable.

use crate::error::SyncResult;
use async_trait::async_trait;

/// One row of `t_deposits`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    /// Validator index (`f_index`, primary key).
    pub index: i64,
    /// Lowercase hex public key without `0x` (`f_key`).
    pub key: String,
    /// Pool label (`f_pool`).
    pub pool: String,
}

/// Trait for the deposits table.
#[async_trait]
pub trait DepositStore: Send + Sync {
    /// Creates the table if it does not exist yet.
    async fn ensure_schema(&self) -> SyncResult<()>;

    /// Inserts or replaces all rows in one atomic batch. Returns the number
    /// of rows written.
    async fn upsert_rows(&self, rows: &[StoredRow]) -> SyncResult<usize>;

    /// Total number of rows in the table.
    async fn count_rows(&self) -> SyncResult<u64>;
}
