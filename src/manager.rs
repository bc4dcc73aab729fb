//! Authoritative pool instance management
//!
//! At most one pool is authoritative at a time; an unhealthy instance is
//! replaced wholesale (destroy, then recreate) rather than repaired. The
//! manager is an explicit value the application constructs once at startup
//! and passes to consumers; there is deliberately no process-global state.
//!
//! # Example
//!
//! ```rust,ignore
//! use hrana_pool::prelude::*;
//!
//! let manager = PoolManager::new(
//!     ConnectTarget::new("https://db.example.io").with_auth_token("ey..."),
//!     Arc::new(HranaHttpFactory),
//!     PoolConfig::default(),
//! );
//!
//! manager.initialize().await?;
//! let result = manager.execute("SELECT 1", &[]).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::client::{ClientFactory, ConnectTarget, DbClient};
use crate::error::{Error, Result};
use crate::pool::{Pool, PoolConfig, PoolStats};
use crate::types::{QueryResult, Value};

/// Manages the one authoritative [`Pool`] instance
pub struct PoolManager {
    target: ConnectTarget,
    factory: Arc<dyn ClientFactory>,
    config: PoolConfig,
    current: Mutex<Option<Arc<Pool>>>,
}

impl PoolManager {
    /// Create a manager; no pool is constructed until `initialize`
    pub fn new(
        target: ConnectTarget,
        factory: Arc<dyn ClientFactory>,
        config: PoolConfig,
    ) -> Self {
        Self {
            target,
            factory,
            config,
            current: Mutex::new(None),
        }
    }

    /// Get the authoritative pool, reusing a healthy existing instance
    ///
    /// An existing pool passes the health check when it is not destroyed and
    /// its registry has not grown past sanity bounds; anything else is
    /// destroyed and replaced with a fresh instance.
    pub async fn initialize(&self) -> Result<Arc<Pool>> {
        let mut current = self.current.lock().await;

        if let Some(pool) = current.as_ref() {
            if self.is_healthy(pool) {
                return Ok(pool.clone());
            }
            warn!("pool health check failed, recreating");
            pool.destroy().await;
        }

        let pool = Pool::new(
            self.target.clone(),
            self.factory.clone(),
            self.config.clone(),
        );
        info!("initialized connection pool");
        *current = Some(pool.clone());
        Ok(pool)
    }

    /// Explicit health-check-and-recreate; alias of `initialize`
    pub async fn ensure_healthy(&self) -> Result<Arc<Pool>> {
        self.initialize().await
    }

    /// The current pool, if one has been initialized
    pub async fn get(&self) -> Option<Arc<Pool>> {
        self.current.lock().await.clone()
    }

    fn is_healthy(&self, pool: &Pool) -> bool {
        if pool.is_destroyed() {
            return false;
        }
        let stats = pool.stats();
        stats.total_connections <= self.config.max_connections * 2
    }

    /// Execute a statement through the authoritative pool
    pub async fn execute(&self, sql: &str, args: &[Value]) -> Result<QueryResult> {
        let pool = self.get().await.ok_or(Error::PoolNotInitialized)?;
        pool.execute(sql, args).await
    }

    /// Run a single-connection callback through the authoritative pool
    pub async fn transaction<T, F, Fut>(&self, callback: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn DbClient>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let pool = self.get().await.ok_or(Error::PoolNotInitialized)?;
        pool.transaction(callback).await
    }

    /// Stats for the authoritative pool, if one exists
    pub async fn stats(&self) -> Option<PoolStats> {
        Some(self.get().await?.stats())
    }

    /// Destroy the authoritative pool and forget it
    pub async fn destroy(&self) {
        if let Some(pool) = self.current.lock().await.take() {
            pool.destroy().await;
        }
    }

    /// Force a cleanup pass, destroying the pool outright when it is beyond
    /// repair (registry grown past twice the configured maximum)
    ///
    /// Intended for app-restart and memory-pressure hooks. A destroyed pool
    /// is recreated on the next `initialize`.
    pub async fn force_cleanup(&self) {
        let mut current = self.current.lock().await;
        let Some(pool) = current.as_ref() else {
            return;
        };

        pool.run_cleanup().await;

        let stats = pool.stats();
        if stats.total_connections > self.config.max_connections * 2 {
            warn!(
                total = stats.total_connections,
                "pool has excessive connections, destroying for cleanup"
            );
            pool.destroy().await;
            *current = None;
        }
    }
}

impl std::fmt::Debug for PoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolManager")
            .field("target", &self.target)
            .field("config", &self.config)
            .finish()
    }
}
