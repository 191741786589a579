//! Compare the stored row count against what was fetched.

use crate::error::{SyncError, SyncResult};
use crate::storage::DepositStore;
use tracing::info;

/// Returns the stored count when it equals `expected`.
pub async fn verify(store: &dyn DepositStore, expected: u64) -> SyncResult<u64> {
    let stored = store.count_rows().await?;
    info!("Wrote in db a total of {} entries", stored);

    if stored != expected {
        return Err(SyncError::Consistency { expected, stored });
    }

    info!("Written entries match expected ones");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryDepositStore, StoredRow};

    async fn store_with(n: i64) -> MemoryDepositStore {
        let store = MemoryDepositStore::new();
        let rows: Vec<StoredRow> = (0..n)
            .map(|i| StoredRow {
                index: i,
                key: format!("{:02x}", i),
                pool: "unlabeled".to_string(),
            })
            .collect();
        store.upsert_rows(&rows).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_verify_match() {
        let store = store_with(3).await;
        assert_eq!(verify(&store, 3).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_verify_mismatch() {
        let store = store_with(4).await;
        let err = verify(&store, 5).await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Consistency {
                expected: 5,
                stored: 4
            }
        ));
    }

    #[tokio::test]
    async fn test_verify_empty() {
        let store = MemoryDepositStore::new();
        assert_eq!(verify(&store, 0).await.unwrap(), 0);
    }
}
