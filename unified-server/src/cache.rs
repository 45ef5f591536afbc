//! Redis cache handle
//!
//! One handle per process, created at startup and passed to whoever needs
//! it. The store being down is never fatal: the handle keeps trying on use.
//! Host names are always resolved to IPv4.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo};
use tokio::sync::Mutex;

/// Upper bound on one connection attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Cache connection settings
///
/// `url` wins over `host`/`port` when present.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 6379,
        }
    }
}

impl CacheConfig {
    /// Connection target before IPv4 resolution.
    pub fn connection_info(&self) -> Result<ConnectionInfo, CacheError> {
        match &self.url {
            Some(url) => Ok(url.as_str().into_connection_info()?),
            None => Ok(ConnectionInfo {
                addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
                redis: RedisConnectionInfo::default(),
            }),
        }
    }
}

/// Cache error type
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no IPv4 address found for {0}")]
    NoIpv4Address(String),

    #[error("timed out after {0:?} connecting to redis")]
    ConnectTimeout(Duration),
}

/// Replace a plain-TCP host name with its first IPv4 address.
///
/// TLS targets keep their host name (needed for certificate checks) and
/// unix sockets are returned untouched.
pub async fn force_ipv4(info: ConnectionInfo) -> Result<ConnectionInfo, CacheError> {
    let (host, port) = match &info.addr {
        ConnectionAddr::Tcp(host, port) => (host.clone(), *port),
        _ => return Ok(info),
    };

    if host.parse::<Ipv4Addr>().is_ok() {
        return Ok(info);
    }

    let mut addrs = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|source| CacheError::Resolve {
            host: host.clone(),
            source,
        })?;
    let v4 = addrs
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| CacheError::NoIpv4Address(host.clone()))?;

    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(v4.ip().to_string(), port),
        ..info
    })
}

fn logged(err: redis::RedisError) -> CacheError {
    tracing::error!(error = %err, "Redis error");
    CacheError::Redis(err)
}

struct CacheInner {
    target: ConnectionInfo,
    addr: String,
    conn: Mutex<Option<ConnectionManager>>,
}

/// Shared connection to the key-value store
///
/// The handle exists for the whole process whether or not the store is
/// reachable. The connection is opened on first use and re-attempted on
/// every call until it succeeds; each failed attempt is logged. Once open,
/// `ConnectionManager` takes care of reconnecting.
///
/// Cloning shares the underlying multiplexed connection.
#[derive(Clone)]
pub struct CacheHandle {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHandle")
            .field("addr", &self.inner.addr)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl CacheHandle {
    /// Build the handle without touching the network.
    ///
    /// Fails only on a malformed configuration.
    pub fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let target = config.connection_info()?;
        let addr = target.addr.to_string();
        Ok(Self {
            inner: Arc::new(CacheInner {
                target,
                addr,
                conn: Mutex::new(None),
            }),
        })
    }

    /// Build the handle and open the connection now.
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let handle = Self::new(config)?;
        handle.connection().await?;
        Ok(handle)
    }

    /// Configured target, before IPv4 resolution.
    pub fn addr(&self) -> &str {
        &self.inner.addr
    }

    /// Whether a connection has been established.
    ///
    /// Reports `false` while an attempt is in progress.
    pub fn is_connected(&self) -> bool {
        self.inner
            .conn
            .try_lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let mut slot = self.inner.conn.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        match self.open().await {
            Ok((conn, resolved)) => {
                tracing::info!(addr = %self.inner.addr, %resolved, "Connected to Redis");
                *slot = Some(conn.clone());
                Ok(conn)
            }
            Err(e) => {
                tracing::error!(addr = %self.inner.addr, error = %e, "Redis connection failed");
                Err(e)
            }
        }
    }

    async fn open(&self) -> Result<(ConnectionManager, String), CacheError> {
        let info = force_ipv4(self.inner.target.clone()).await?;
        let resolved = info.addr.to_string();
        let client = Client::open(info)?;
        let conn = tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::ConnectTimeout(CONNECT_TIMEOUT))??;
        Ok((conn, resolved))
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await.map_err(logged)?;
        Ok(value)
    }

    /// Store `value` under `key`, expiring after `ttl` (whole seconds, min 1).
    pub async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(logged)
    }

    /// Remove `key`; returns whether it existed.
    pub async fn del(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn.del(key).await.map_err(logged)?;
        Ok(removed > 0)
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await.map_err(logged)?;
        Ok(())
    }
}
