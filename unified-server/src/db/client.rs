//! Exclusive checkout of a pooled connection with a release deadline
//!
//! `ScopedClient` decorates a plain checked-out connection with a watchdog.
//! If the holder does not call `release()` within the checkout deadline, the
//! watchdog logs a warning and returns the connection to the pool itself.
//! Any later use of the handle fails with [`DbError::ClientReleased`].
//!
//! The connection leaves the lease exactly once: through `release()`, the
//! watchdog, or the last handle being dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::{Duration, Instant};

use sqlx::pool::PoolConnection;
use sqlx::postgres::PgRow;
use sqlx::Postgres;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio::task::AbortHandle;

use super::pool::{bind_params, log_if_slow, SqlValue};
use super::DbError;

/// Checked-out clients are reclaimed after this long.
pub const CHECKOUT_DEADLINE: Duration = Duration::from_secs(30);

struct Lease<C> {
    conn: Mutex<Option<C>>,
    watchdog: OnceLock<AbortHandle>,
    forced: AtomicBool,
}

impl<C> Lease<C> {
    fn cancel_watchdog(&self) {
        if let Some(handle) = self.watchdog.get() {
            handle.abort();
        }
    }
}

impl<C> Drop for Lease<C> {
    fn drop(&mut self) {
        // The connection itself is dropped with the lease, which hands it
        // back to the pool.
        self.cancel_watchdog();
    }
}

/// A connection held exclusively by one logical operation.
///
/// Clones share the same lease; releasing through any clone releases it
/// for all of them.
pub struct ScopedClient<C = PoolConnection<Postgres>> {
    lease: Arc<Lease<C>>,
}

impl<C> Clone for ScopedClient<C> {
    fn clone(&self) -> Self {
        Self {
            lease: Arc::clone(&self.lease),
        }
    }
}

impl<C> std::fmt::Debug for ScopedClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedClient")
            .field("forced", &self.lease.forced.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<C: Send + 'static> ScopedClient<C> {
    /// Take ownership of `conn` and start the release watchdog.
    ///
    /// Must be called from within a tokio runtime.
    pub fn guard(conn: C, deadline: Duration) -> Self {
        let lease = Arc::new(Lease {
            conn: Mutex::new(Some(conn)),
            watchdog: OnceLock::new(),
            forced: AtomicBool::new(false),
        });

        let expires_at = tokio::time::Instant::now() + deadline;
        let weak = Arc::downgrade(&lease);
        let task = tokio::spawn(watchdog(weak, expires_at, deadline));
        let _ = lease.watchdog.set(task.abort_handle());

        Self { lease }
    }

    /// Lock the underlying connection for the duration of one statement.
    ///
    /// Crate-private: callers go through `query`/`execute`, so the lock is
    /// never held across more than a single round trip. Fails with
    /// [`DbError::ClientReleased`] once the client has been released or
    /// revoked by the watchdog.
    pub(crate) async fn lock(&self) -> Result<MappedMutexGuard<'_, C>, DbError> {
        let guard = self.lease.conn.lock().await;
        if self.lease.forced.load(Ordering::Acquire) {
            return Err(DbError::ClientReleased);
        }
        MutexGuard::try_map(guard, |slot| slot.as_mut()).map_err(|_| DbError::ClientReleased)
    }

    /// Return the connection to the pool and cancel the watchdog.
    ///
    /// Releasing an already released client does nothing.
    pub async fn release(self) {
        self.lease.cancel_watchdog();
        let conn = self.lease.conn.lock().await.take();
        if conn.is_some() {
            tracing::debug!("client released");
        }
        drop(conn);
    }

    /// Whether the connection has left this lease.
    pub async fn is_released(&self) -> bool {
        self.lease.conn.lock().await.is_none()
    }

    /// Whether the watchdog revoked this checkout.
    pub fn was_force_released(&self) -> bool {
        self.lease.forced.load(Ordering::Acquire)
    }
}

async fn watchdog<C>(lease: Weak<Lease<C>>, expires_at: tokio::time::Instant, deadline: Duration) {
    tokio::time::sleep_until(expires_at).await;

    let Some(lease) = lease.upgrade() else {
        return;
    };

    // Revoke first so the handle is dead from this point on, even while a
    // statement is still running on the connection.
    lease.forced.store(true, Ordering::Release);
    tracing::warn!(
        deadline_secs = deadline.as_secs(),
        "client checkout exceeded deadline; forcing release"
    );

    // The connection itself can only leave once the running statement ends.
    let conn = lease.conn.lock().await.take();
    drop(conn);
}

impl ScopedClient<PoolConnection<Postgres>> {
    /// Run one statement on the held connection and return its rows.
    pub async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<PgRow>, DbError> {
        let mut conn = self.lock().await?;
        let started = Instant::now();
        let result = bind_params(sqlx::query(sql), params)
            .fetch_all(&mut **conn)
            .await;
        log_if_slow(sql, started.elapsed());
        Ok(result?)
    }

    /// Run one statement on the held connection and return affected rows.
    pub async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        let mut conn = self.lock().await?;
        let started = Instant::now();
        let result = bind_params(sqlx::query(sql), params)
            .execute(&mut **conn)
            .await;
        log_if_slow(sql, started.elapsed());
        Ok(result?.rows_affected())
    }
}
