//! Connectivity check for PostgreSQL and Redis

use anyhow::{bail, Result};
use clap::Parser;

use unified_server::CacheHandle;

use super::connect_database;
use crate::config::ConnectionArgs;

/// Arguments for the ping command
#[derive(Parser, Debug)]
pub struct PingArgs {
    /// Fail when Redis is unreachable (by default only PostgreSQL is required)
    #[arg(long)]
    pub require_cache: bool,

    #[command(flatten)]
    pub conn: ConnectionArgs,
}

/// Probe both stores and report.
pub async fn run_ping(args: PingArgs) -> Result<()> {
    let db = connect_database(&args.conn).await;
    let status = db.status();
    tracing::info!(size = status.size, max = status.max, "PostgreSQL pool ok");
    db.close().await;

    let cache = async {
        let cache = CacheHandle::connect(&args.conn.cache_config()).await?;
        cache.ping().await?;
        Ok::<_, unified_server::CacheError>(cache)
    };

    match cache.await {
        Ok(cache) => tracing::info!(addr = cache.addr(), "Redis ok"),
        Err(e) if args.require_cache => bail!("Redis check failed: {e}"),
        Err(e) => tracing::warn!(error = %e, "Redis unavailable"),
    }

    Ok(())
}
