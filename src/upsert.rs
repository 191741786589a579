//! Turn fetched validators into deposit rows and write them in one batch.

use crate::beacon::ValidatorRecord;
use crate::error::{SyncError, SyncResult};
use crate::pool::PoolTable;
use crate::storage::{DepositStore, StoredRow};
use tracing::{debug, info};

/// Build the row for one validator
pub fn to_row(table: &PoolTable, record: &ValidatorRecord) -> SyncResult<StoredRow> {
    let index = i64::try_from(record.index).map_err(|_| {
        SyncError::Storage(format!(
            "Validator index {} does not fit in BIGINT",
            record.index
        ))
    })?;

    Ok(StoredRow {
        index,
        key: hex::encode(record.public_key),
        pool: table.classify(record.index).to_string(),
    })
}

/// Stage every record and submit them as a single replace-on-conflict batch.
///
/// Returns the number of rows written.
pub async fn upsert(
    store: &dyn DepositStore,
    table: &PoolTable,
    records: &[ValidatorRecord],
) -> SyncResult<usize> {
    info!("Storing {} validators in db", records.len());

    let rows = records
        .iter()
        .map(|r| to_row(table, r))
        .collect::<SyncResult<Vec<_>>>()?;

    for (pool, count) in table.tally(records.iter().map(|r| r.index)) {
        debug!("  {}: {}", pool, count);
    }

    let written = store.upsert_rows(&rows).await?;
    info!("Stored {} rows", written);
    Ok(written)
}
