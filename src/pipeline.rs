//! Sync pipeline
//!
//! ```text
//! INIT -> SCHEMA_READY -> CONNECTED_RPC -> FETCHED -> UPSERTED -> VERIFIED
//!   \________________________ any fatal error ________________________/-> FAILED
//! ```
//!
//! Every error is returned to the caller, which owns the exit decision. The
//! one exception is a failed upsert batch: it is logged and the run goes on to
//! verification, which then reports the mismatch.

use crate::beacon::{BeaconClient, ValidatorSource};
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::fetcher::fetch_all;
use crate::pool::PoolTable;
use crate::storage::{DepositStore, MemoryDepositStore, PgDepositStore};
use crate::upsert::upsert;
use crate::verify::verify;
use std::time::{Duration, Instant};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    SchemaReady,
    ConnectedRpc,
    Fetched,
    Upserted,
    Verified,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Init => write!(f, "init"),
            Phase::SchemaReady => write!(f, "schema_ready"),
            Phase::ConnectedRpc => write!(f, "connected_rpc"),
            Phase::Fetched => write!(f, "fetched"),
            Phase::Upserted => write!(f, "upserted"),
            Phase::Verified => write!(f, "verified"),
            Phase::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a verified run
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub fetched: u64,
    /// Rows written by the batch, 0 if the batch failed
    pub written: u64,
    pub stored: u64,
    pub duration: Duration,
}

fn enter(phase: Phase) {
    info!("Phase: {}", phase);
}

/// Fetch, tag, store and verify against an already prepared store and source.
///
/// The store's schema must already exist.
pub async fn run(
    source: &dyn ValidatorSource,
    store: &dyn DepositStore,
    table: &PoolTable,
    page_size: u32,
) -> SyncResult<SyncReport> {
    let started = Instant::now();

    let validators = fetch_all(source, page_size).await?;
    enter(Phase::Fetched);

    let written = match upsert(store, table, &validators).await {
        Ok(n) => n as u64,
        Err(e) => {
            error!("Failed to store validators: {}", e);
            0
        }
    };
    enter(Phase::Upserted);

    let fetched = validators.len() as u64;
    let stored = verify(store, fetched).await?;
    enter(Phase::Verified);

    Ok(SyncReport {
        fetched,
        written,
        stored,
        duration: started.elapsed(),
    })
}

/// Full run from configuration: connect storage, prepare the schema, connect
/// the beacon node, then [`run`].
///
/// With `dry_run` the rows go to an in-memory table instead of Postgres.
pub async fn sync(config: &SyncConfig, dry_run: bool) -> SyncResult<SyncReport> {
    let result = sync_phases(config, dry_run).await;
    if let Err(e) = &result {
        error!("Phase: {} ({})", Phase::Failed, e);
    }
    result
}

async fn sync_phases(config: &SyncConfig, dry_run: bool) -> SyncResult<SyncReport> {
    enter(Phase::Init);
    config.validate()?;
    let table = config.pool_table()?;

    let store: Box<dyn DepositStore> = if dry_run {
        info!("Dry run: rows are kept in memory only");
        Box::new(MemoryDepositStore::new())
    } else {
        Box::new(PgDepositStore::new(&config.storage_url).await?)
    };
    store.ensure_schema().await?;
    enter(Phase::SchemaReady);

    let beacon = BeaconClient::new(
        &config.rpc_endpoint,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    info!("Using beacon node at {}", beacon.base_url());
    enter(Phase::ConnectedRpc);

    run(&beacon, store.as_ref(), &table, config.page_size).await
}
