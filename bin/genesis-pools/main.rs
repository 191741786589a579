//! Genesis Pools - one-shot validator pool sync
//!
//! Usage:
//!   genesis-pools --rpc-endpoint http://localhost:3500 --database-url postgresql://...
//!
//! Environment variables:
//!   DATABASE_URL      - Postgres connection string
//!   BEACON_RPC_URL    - Beacon node JSON gateway
//!   PAGE_SIZE         - Validators per page (default: 250)
//!   RPC_TIMEOUT_SECS  - Per-request timeout (default: 30)
//!   CONFIG_PATH       - JSON config file
//!
//! Exits 0 once the stored row count matches the fetched count, 1 otherwise.

use anyhow::Context;
use clap::Parser;
use genesis_pools::{pipeline, SyncConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "genesis-pools")]
#[command(version)]
#[command(about = "Tag genesis validators with their pool and store them in Postgres")]
struct Args {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Beacon node JSON gateway URL
    #[arg(long, env = "BEACON_RPC_URL")]
    rpc_endpoint: Option<String>,

    /// Validators requested per page
    #[arg(long, env = "PAGE_SIZE")]
    page_size: Option<u32>,

    /// Timeout for a single beacon node request, in seconds
    #[arg(long, env = "RPC_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// JSON config file; flags override its values
    #[arg(long, env = "CONFIG_PATH")]
    config: Option<std::path::PathBuf>,

    /// Keep rows in memory instead of writing to Postgres
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(SyncConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SyncConfig::default(),
        };

        if let Some(url) = self.database_url {
            config.storage_url = url;
        }
        if let Some(endpoint) = self.rpc_endpoint {
            config.rpc_endpoint = endpoint;
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(timeout) = self.timeout_secs {
            config.request_timeout_secs = timeout;
        }

        Ok((config, self.dry_run))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("genesis_pools=debug,info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let (config, dry_run) = args.into_config()?;

    info!("Starting genesis pool sync");
    info!("  Beacon node: {}", config.rpc_endpoint);
    info!("  Page size: {}", config.page_size);

    let report = pipeline::sync(&config, dry_run)
        .await
        .context("Sync failed")?;

    info!(
        "Finished ok! fetched={} written={} stored={} in {:.1}s",
        report.fetched,
        report.written,
        report.stored,
        report.duration.as_secs_f64()
    );
    Ok(())
}
