//! PostgreSQL storage for the deposits table.
//!
//! The run holds a single connection for its whole lifetime; the pool only
//! exists to get deadpool's connect/recycle timeouts.

use super::migrations;
use super::traits::{DepositStore, StoredRow};
use crate::error::SyncResult;
use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use std::time::Duration;
use tokio_postgres::NoTls;
use tracing::{debug, info};

/// Statement timeout applied to every connection
const DB_QUERY_TIMEOUT_SECS: u64 = 60;

const UPSERT_DEPOSIT: &str = "INSERT INTO t_deposits (f_index, f_key, f_pool)
     VALUES ($1, $2, $3)
     ON CONFLICT (f_index) DO UPDATE SET
        f_key = EXCLUDED.f_key,
        f_pool = EXCLUDED.f_pool";

#[derive(Clone)]
pub struct PgDepositStore {
    pool: Pool,
}

impl PgDepositStore {
    /// Connect to `database_url` and check the connection
    pub async fn new(database_url: &str) -> SyncResult<Self> {
        let mut config = Config::new();
        config.url = Some(database_url.to_string());
        config.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        config.pool = Some(PoolConfig {
            max_size: 1,
            timeouts: deadpool_postgres::Timeouts {
                wait: Some(Duration::from_secs(DB_QUERY_TIMEOUT_SECS)),
                create: Some(Duration::from_secs(10)),
                recycle: Some(Duration::from_secs(30)),
            },
            ..Default::default()
        });

        let pool = config.create_pool(Some(Runtime::Tokio1), NoTls)?;

        // Fail here rather than at the first query
        let client = pool.get().await?;
        client
            .execute(
                &format!("SET statement_timeout = '{}s'", DB_QUERY_TIMEOUT_SECS),
                &[],
            )
            .await?;

        info!(
            "Connected to PostgreSQL (query_timeout: {}s)",
            DB_QUERY_TIMEOUT_SECS
        );

        Ok(Self { pool })
    }
}

#[async_trait]
impl DepositStore for PgDepositStore {
    async fn ensure_schema(&self) -> SyncResult<()> {
        let client = self.pool.get().await?;
        migrations::run_embedded_migrations(&client).await
    }

    async fn upsert_rows(&self, rows: &[StoredRow]) -> SyncResult<usize> {
        let mut client = self.pool.get().await?;
        let transaction = client.transaction().await?;
        let stmt = transaction.prepare(UPSERT_DEPOSIT).await?;

        for row in rows {
            transaction
                .execute(&stmt, &[&row.index, &row.key, &row.pool])
                .await?;
        }

        transaction.commit().await?;
        debug!("Committed {} deposit rows", rows.len());

        Ok(rows.len())
    }

    async fn count_rows(&self) -> SyncResult<u64> {
        let client = self.pool.get().await?;
        let row = client
            .query_one("SELECT COUNT(*) FROM t_deposits", &[])
            .await?;
        let count: i64 = row.get(0);
        Ok(count as u64)
    }
}
