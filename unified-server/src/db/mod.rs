//! Database layer - connection pool, scoped clients, and repositories
//!
//! # Design Principles
//!
//! - One bounded `PgPool` per process, passed explicitly (no globals)
//! - One-shot statements go through `Database::query`
//! - Multi-statement work checks out a `ScopedClient`, which is reclaimed
//!   by a watchdog if the holder forgets to release it
//! - Slow statements (> 100 ms) are logged, never failed

pub mod client;
pub mod pool;
pub mod repos;

use std::time::Duration;

pub use client::{ScopedClient, CHECKOUT_DEADLINE};
pub use pool::{Database, DbConfig, PoolStatus, SqlValue, SLOW_QUERY_THRESHOLD};
pub use repos::*;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Statement execution failed (syntax, constraint, connectivity)
    #[error("database error: {0}")]
    Query(#[from] sqlx::Error),

    /// Pool saturated for longer than the connect timeout
    #[error("timed out after {0:?} waiting for a pooled connection")]
    PoolTimeout(Duration),

    /// The checked-out client was already returned to the pool
    #[error("client already released to the pool")]
    ClientReleased,

    /// A row could not be mapped into a domain type
    #[error("unexpected row shape: {0}")]
    Decode(String),
}
