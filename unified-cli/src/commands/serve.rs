//! HTTP server command
//!
//! Connects PostgreSQL (fatal on failure) and Redis (retried on use), then
//! serves the API until Ctrl+C / SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use unified_server::{run_server, AppState, CacheHandle, ServerConfig};

use super::connect_database;
use crate::config::ConnectionArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "BIND_ADDR", default_value = "127.0.0.1:3001")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    #[command(flatten)]
    pub conn: ConnectionArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let db = connect_database(&args.conn).await;

    let cache = CacheHandle::new(&args.conn.cache_config()).context("Invalid Redis configuration")?;
    if cache.ping().await.is_err() {
        // Not fatal: the handle retries on use, authenticated routes answer
        // 500 until the store is back
        tracing::warn!(addr = cache.addr(), "Redis unavailable at startup, will retry on use");
    }

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    tracing::info!("Starting unified backend on {}", args.bind);

    // Run server (blocks until shutdown)
    run_server(AppState::new(db.clone(), cache), config)
        .await
        .context("Server error")?;

    db.close().await;
    Ok(())
}
