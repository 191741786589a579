//! Run configuration
//!
//! Every field can come from a JSON file, and missing fields fall back to
//! environment variables and then to built-in defaults.

use crate::error::{SyncError, SyncResult};
use crate::pool::{PoolRange, PoolTable};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Page size used by the genesis listing when nothing else is configured
pub const DEFAULT_PAGE_SIZE: u32 = 250;

/// Largest page the beacon node will serve
pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Postgres connection string
    #[serde(default = "default_storage_url")]
    pub storage_url: String,

    /// Beacon node HTTP gateway, e.g. http://localhost:3500
    #[serde(default = "default_rpc_endpoint")]
    pub rpc_endpoint: String,

    /// Validators requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Timeout for a single beacon node request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Replaces the built-in genesis pool layout when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pools: Option<Vec<PoolRange>>,
}

fn default_storage_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://postgres@localhost:5432/postgres".to_string())
}

fn default_rpc_endpoint() -> String {
    std::env::var("BEACON_RPC_URL").unwrap_or_else(|_| "http://localhost:3500".to_string())
}

fn default_page_size() -> u32 {
    std::env::var("PAGE_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

fn default_request_timeout_secs() -> u64 {
    std::env::var("RPC_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30)
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            storage_url: default_storage_url(),
            rpc_endpoint: default_rpc_endpoint(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            pools: None,
        }
    }
}

impl SyncConfig {
    /// Load config from a JSON file
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            SyncError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Check the config before any connection is opened
    pub fn validate(&self) -> SyncResult<()> {
        if self.storage_url.trim().is_empty() {
            return Err(SyncError::Config("storage_url is empty".to_string()));
        }
        if !(self.rpc_endpoint.starts_with("http://") || self.rpc_endpoint.starts_with("https://"))
        {
            return Err(SyncError::Config(format!(
                "rpc_endpoint must be an http(s) URL, got '{}'",
                self.rpc_endpoint
            )));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(SyncError::Config(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(SyncError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        self.pool_table()?;
        Ok(())
    }

    /// Pool table for this run: the configured ranges, or the genesis default
    pub fn pool_table(&self) -> SyncResult<PoolTable> {
        match &self.pools {
            Some(ranges) => PoolTable::new(ranges.clone()),
            None => Ok(PoolTable::default()),
        }
    }
}
