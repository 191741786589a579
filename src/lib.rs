//! Genesis Pools
//!
//! Tags every genesis validator of a beacon chain with the operator pool that
//! runs it and stores the result in Postgres.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐  pages   ┌──────────┐  rows   ┌────────────┐
//! │ Beacon node │─────────▶│ Fetcher  │────────▶│ t_deposits │
//! └─────────────┘          └──────────┘  pool   └────────────┘
//!                                           ▲          │
//!                                 PoolTable─┘   COUNT(*)▼
//!                                              ┌──────────┐
//!                                              │ Verifier │
//!                                              └──────────┘
//! ```
//!
//! 1. Page through `/eth/v1alpha1/validators?genesis=true` until the
//!    continuation token is empty
//! 2. Classify each index against the pool ranges
//! 3. Upsert all rows in one transaction
//! 4. Compare `COUNT(*)` with the number fetched

pub mod beacon;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod pool;
pub mod storage;
pub mod upsert;
pub mod verify;

pub use beacon::{
    BeaconClient, ListValidatorsRequest, ValidatorPage, ValidatorRecord, ValidatorSource,
    PUBLIC_KEY_LEN,
};
pub use config::{SyncConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use error::{SyncError, SyncResult};
pub use fetcher::fetch_all;
pub use pipeline::{run, sync, Phase, SyncReport};
pub use pool::{classify, PoolRange, PoolTable, DEFAULT_POOL_RANGES, UNLABELED};
pub use storage::{DepositStore, MemoryDepositStore, PgDepositStore, StoredRow};
pub use upsert::upsert;
pub use verify::verify;
