//! In-memory deposits table.
//!
//! Same replace-on-conflict semantics as the Postgres backend, keyed by
//! validator index. Nothing survives the process; used for `--dry-run` and
//! tests.

use super::traits::{DepositStore, StoredRow};
use crate::error::SyncResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct MemoryDepositStore {
    rows: RwLock<BTreeMap<i64, StoredRow>>,
}

impl MemoryDepositStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row stored under `index`, if any
    pub fn get(&self, index: i64) -> Option<StoredRow> {
        self.rows.read().get(&index).cloned()
    }

    /// All rows ordered by index
    pub fn rows(&self) -> Vec<StoredRow> {
        self.rows.read().values().cloned().collect()
    }
}

#[async_trait]
impl DepositStore for MemoryDepositStore {
    async fn ensure_schema(&self) -> SyncResult<()> {
        Ok(())
    }

    async fn upsert_rows(&self, rows: &[StoredRow]) -> SyncResult<usize> {
        // One write lock for the whole batch
        let mut table = self.rows.write();
        for row in rows {
            table.insert(row.index, row.clone());
        }
        Ok(rows.len())
    }

    async fn count_rows(&self) -> SyncResult<u64> {
        Ok(self.rows.read().len() as u64)
    }
}
