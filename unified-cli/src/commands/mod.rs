//! Command implementations for the unified backend CLI

pub mod ping;
pub mod serve;

pub use ping::run_ping;
pub use serve::run_serve;

use unified_server::Database;

use crate::config::ConnectionArgs;

/// Build the pool and run the startup probe.
///
/// The process cannot do anything useful without PostgreSQL, so any
/// failure here exits immediately with status 1. No retry.
pub async fn connect_database(conn: &ConnectionArgs) -> Database {
    let db = match Database::connect_lazy(&conn.db_config()) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Invalid PostgreSQL configuration");
            std::process::exit(1);
        }
    };

    match db.probe().await {
        Ok(now) => {
            tracing::info!(server_time = %now, "Connected to PostgreSQL");
            db
        }
        Err(e) => {
            tracing::error!(error = %e, "PostgreSQL connection error");
            tracing::error!("HINT: Make sure PostgreSQL is running. Use: docker-compose up -d postgres");
            std::process::exit(1);
        }
    }
}
