//! unified-server: connection layer and profile/leaderboard API
//!
//! A bounded PostgreSQL pool with deadline-guarded checkouts, a shared
//! Redis handle, and the HTTP routes that sit on top of them.

pub mod auth;
pub mod cache;
pub mod db;
pub mod http;
pub mod models;

#[cfg(test)]
mod test_logs;

pub use cache::{CacheConfig, CacheError, CacheHandle};
pub use db::{Database, DbConfig, DbError, ScopedClient};
pub use http::{run_server, AppState, ServerConfig};
