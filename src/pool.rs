//! Bounded connection pool with dynamic scaling and stuck-connection recovery
//!
//! The pool owns a registry of verified clients, a FIFO wait queue for
//! callers that arrive while the registry is saturated, a periodic cleanup
//! task for idle-resource reclamation, and an on-demand recovery path for
//! connections whose holders never released them.
//!
//! # Example
//!
//! ```rust,ignore
//! use hrana_pool::prelude::*;
//!
//! let pool = Pool::new(
//!     ConnectTarget::new("https://db.example.io").with_auth_token("ey..."),
//!     Arc::new(HranaHttpFactory),
//!     PoolConfig::default().with_max_connections(8),
//! );
//!
//! let rows = pool.execute("SELECT * FROM users WHERE id = ?", &[Value::from(1_i64)]).await?;
//! ```
//!
//! # Waiting and cancellation
//!
//! `acquire` never times out: a queued caller is fulfilled eventually by a
//! release or by the scaler. Callers that need bounded latency wrap the call
//! in `tokio::time::timeout` (or `select!`); dropping the acquire future
//! dequeues cleanly and a fulfillment racing the drop is re-homed to the next
//! waiter instead of being lost.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::client::{ClientFactory, ConnectTarget, DbClient};
use crate::connection::{generate_conn_id, ConnEntry, PooledConn};
use crate::error::{Error, Result};
use crate::types::{QueryResult, Value};

/// Queue depth beyond which the scaler pre-creates connections
const SCALE_QUEUE_DEPTH: usize = 3;

/// Upper bound on concurrent creations per scale-up event
const SCALE_BURST_MAX: usize = 5;

/// Pool configuration
///
/// Immutable for the pool's lifetime; recreate the pool to change it.
#[derive(Debug, Clone, Serialize)]
pub struct PoolConfig {
    /// Lower bound on registry size, restored by the cleanup task
    pub min_connections: usize,
    /// Upper bound on registry size (counting in-flight creations)
    pub max_connections: usize,
    /// Age after which an idle connection is evicted instead of reused
    pub max_lifetime: Duration,
    /// Idle time after which a connection is evicted instead of reused
    pub idle_timeout: Duration,
    /// Period of the background cleanup task
    pub cleanup_interval: Duration,
    /// In-use time beyond which a connection counts as stuck (holder leaked it)
    pub stuck_threshold: Duration,
    /// Reserved for caller-side retry policy; the pool does not retry internally
    pub retry_attempts: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 8,
            max_lifetime: Duration::from_secs(600),
            idle_timeout: Duration::from_secs(60),
            cleanup_interval: Duration::from_secs(60),
            stuck_threshold: Duration::from_secs(5),
            retry_attempts: 2,
        }
    }
}

impl PoolConfig {
    /// Set the minimum registry size
    pub fn with_min_connections(mut self, min: usize) -> Self {
        self.min_connections = min;
        self
    }

    /// Set the maximum registry size
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the maximum connection lifetime
    pub fn with_max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Set the idle timeout
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the cleanup period
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Set the stuck-connection threshold
    pub fn with_stuck_threshold(mut self, threshold: Duration) -> Self {
        self.stuck_threshold = threshold;
        self
    }

    /// Set the reserved caller-side retry count
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }
}

/// Snapshot of pool state and counters
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    /// Registry size
    pub total_connections: usize,
    /// Connections currently claimed
    pub in_use: usize,
    /// Connections idle and claimable
    pub available: usize,
    /// Connections in use longer than the stuck threshold
    pub stuck_connections: usize,
    /// Callers queued for a connection
    pub waiting: usize,
    /// Queries routed through the pool
    pub total_queries: u64,
    /// Mean queries per connection
    pub avg_queries_per_connection: f64,
    /// Fraction of the registry currently in use
    pub utilization: f64,
    /// The pool's configuration
    pub config: PoolConfig,
}

/// A queued acquisition request
struct Waiter {
    tx: oneshot::Sender<Result<PooledConn>>,
    /// Diagnostics only; the pool never times a waiter out
    enqueued_at: Instant,
}

/// Registry, wait queue and lifecycle flags, guarded by one mutex
///
/// Critical sections never cross an await, so the lock is a plain sync mutex
/// and `release` stays synchronous.
struct PoolInner {
    connections: HashMap<String, ConnEntry>,
    waiters: VecDeque<Waiter>,
    /// In-flight factory calls; counted toward capacity so concurrent
    /// acquires cannot overshoot `max_connections`
    creating: usize,
    destroyed: bool,
}

/// The connection pool
///
/// Cheap to share: construct once with [`Pool::new`] and clone the `Arc`.
pub struct Pool {
    target: ConnectTarget,
    factory: Arc<dyn ClientFactory>,
    config: PoolConfig,
    inner: Mutex<PoolInner>,
    cleanup_started: AtomicBool,
    /// Self reference for background tasks
    self_ref: tokio::sync::OnceCell<Weak<Self>>,
}

impl Pool {
    /// Create a pool
    ///
    /// No connection is established here: the registry fills lazily on first
    /// use so construction cannot fail when the remote service is down.
    pub fn new(
        target: ConnectTarget,
        factory: Arc<dyn ClientFactory>,
        config: PoolConfig,
    ) -> Arc<Self> {
        let pool = Arc::new(Self {
            target,
            factory,
            config,
            inner: Mutex::new(PoolInner {
                connections: HashMap::new(),
                waiters: VecDeque::new(),
                creating: 0,
                destroyed: false,
            }),
            cleanup_started: AtomicBool::new(false),
            self_ref: tokio::sync::OnceCell::new(),
        });

        let _ = pool.self_ref.set(Arc::downgrade(&pool));
        pool
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Whether `destroy` has been called
    pub fn is_destroyed(&self) -> bool {
        self.lock_inner().destroyed
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, PoolInner> {
        self.inner.lock().expect("pool lock poisoned")
    }

    fn get_self_arc(&self) -> Option<Arc<Self>> {
        self.self_ref.get().and_then(|w| w.upgrade())
    }

    // ========================================================================
    // Acquire / release
    // ========================================================================

    /// Claim a connection for exclusive use
    ///
    /// Priority order: reuse a fresh idle connection, create one when under
    /// capacity, otherwise join the FIFO wait queue. Waits indefinitely; see
    /// the module docs for opt-in cancellation.
    pub async fn acquire(&self) -> Result<PooledConn> {
        enum Plan {
            Ready(PooledConn),
            Create,
            Wait(oneshot::Receiver<Result<PooledConn>>),
        }

        let plan = {
            let mut inner = self.lock_inner();
            if inner.destroyed {
                return Err(Error::PoolDestroyed);
            }
            if let Some(conn) = self.claim_idle(&mut inner) {
                Plan::Ready(conn)
            } else if inner.connections.len() + inner.creating < self.config.max_connections {
                inner.creating += 1;
                Plan::Create
            } else {
                Plan::Wait(Self::enqueue(&mut inner))
            }
        };
        self.ensure_cleanup_task();

        match plan {
            Plan::Ready(conn) => Ok(conn),
            Plan::Wait(rx) => rx.await.map_err(|_| Error::PoolDestroyed)?,
            Plan::Create => match self.factory.connect(&self.target).await {
                Ok(client) => {
                    let outcome = {
                        let mut inner = self.lock_inner();
                        inner.creating -= 1;
                        if inner.destroyed {
                            Err(client)
                        } else {
                            let conn = Self::register_claimed(&mut inner, client);
                            if inner.waiters.len() > SCALE_QUEUE_DEPTH {
                                self.spawn_scale_up(&mut inner);
                            }
                            Ok(conn)
                        }
                    };
                    match outcome {
                        Ok(conn) => Ok(conn),
                        Err(client) => {
                            let _ = client.close().await;
                            Err(Error::PoolDestroyed)
                        }
                    }
                }
                Err(e) => {
                    let rx = {
                        let mut inner = self.lock_inner();
                        inner.creating -= 1;
                        if inner.destroyed {
                            return Err(Error::PoolDestroyed);
                        }
                        // A factory hiccup must not poison this caller's wait
                        // when other connections can still serve it; only a
                        // first-ever attempt with an empty registry surfaces.
                        if inner.connections.is_empty() && inner.creating == 0 {
                            return Err(e);
                        }
                        warn!(error = %e, "connection creation failed, queueing acquire");
                        Self::enqueue(&mut inner)
                    };
                    rx.await.map_err(|_| Error::PoolDestroyed)?
                }
            },
        }
    }

    /// Return a claimed connection
    ///
    /// If a caller is queued, the connection is handed over directly and is
    /// never observably idle in between. Releasing a connection unknown to
    /// this pool (including after `destroy`) is a logged no-op.
    pub fn release(&self, conn: &PooledConn) {
        let mut inner = self.lock_inner();
        if !inner.connections.contains_key(conn.id()) {
            warn!(id = conn.id(), "attempted to release unknown connection");
            return;
        }
        Self::dispatch_or_park(&mut inner, conn.id());
    }

    /// Scan the registry for a claimable idle connection
    fn claim_idle(&self, inner: &mut PoolInner) -> Option<PooledConn> {
        let id = inner
            .connections
            .iter()
            .find(|(_, e)| {
                !e.in_use && !e.is_expired(self.config.max_lifetime, self.config.idle_timeout)
            })
            .map(|(id, _)| id.clone())?;
        let entry = inner.connections.get_mut(&id)?;
        entry.in_use = true;
        entry.touch();
        Some(PooledConn::new(id, entry.client.clone()))
    }

    /// Register a new connection already claimed by the triggering caller
    ///
    /// Register-then-claim happens in one critical section so there is no
    /// window where the connection exists but is stealable.
    fn register_claimed(inner: &mut PoolInner, client: Arc<dyn DbClient>) -> PooledConn {
        let id = generate_conn_id();
        let mut entry = ConnEntry::new(client);
        entry.in_use = true;
        let conn = PooledConn::new(id.clone(), entry.client.clone());
        inner.connections.insert(id, entry);
        conn
    }

    /// Register a new idle connection and return its id
    fn register_idle(inner: &mut PoolInner, client: Arc<dyn DbClient>) -> String {
        let id = generate_conn_id();
        inner.connections.insert(id.clone(), ConnEntry::new(client));
        id
    }

    fn enqueue(inner: &mut PoolInner) -> oneshot::Receiver<Result<PooledConn>> {
        let (tx, rx) = oneshot::channel();
        inner.waiters.push_back(Waiter {
            tx,
            enqueued_at: Instant::now(),
        });
        rx
    }

    /// Hand the connection to the longest-waiting caller, or park it idle
    ///
    /// A waiter whose receiver has gone away (cancelled acquire) is skipped;
    /// the connection moves on to the next waiter and can never be lost.
    fn dispatch_or_park(inner: &mut PoolInner, id: &str) {
        loop {
            let waiter = inner.waiters.pop_front();
            let Some(entry) = inner.connections.get_mut(id) else {
                // Connection vanished (evicted or destroyed); requeue the waiter
                if let Some(waiter) = waiter {
                    inner.waiters.push_front(waiter);
                }
                return;
            };
            match waiter {
                Some(waiter) => {
                    entry.in_use = true;
                    entry.touch();
                    let conn = PooledConn::new(id, entry.client.clone());
                    if waiter.tx.send(Ok(conn)).is_ok() {
                        debug!(
                            id,
                            waited_ms = waiter.enqueued_at.elapsed().as_millis() as u64,
                            "handed connection to waiter"
                        );
                        return;
                    }
                }
                None => {
                    entry.in_use = false;
                    entry.touch();
                    return;
                }
            }
        }
    }

    // ========================================================================
    // Scaler
    // ========================================================================

    /// Burst size for a scale-up event
    fn scale_burst(waiting: usize, size: usize, max: usize) -> usize {
        waiting.min(max.saturating_sub(size)).min(SCALE_BURST_MAX)
    }

    /// Pre-create connections for queued waiters, fire-and-forget
    ///
    /// One-at-a-time creation would serialize pool growth behind the queue;
    /// a bounded concurrent burst collapses that latency without stampeding
    /// the remote service.
    fn spawn_scale_up(&self, inner: &mut PoolInner) {
        let burst = Self::scale_burst(
            inner.waiters.len(),
            inner.connections.len() + inner.creating,
            self.config.max_connections,
        );
        if burst == 0 {
            return;
        }
        let Some(pool) = self.get_self_arc() else {
            return;
        };

        inner.creating += burst;
        info!(burst, waiting = inner.waiters.len(), "scaling up pool");

        for _ in 0..burst {
            let pool = pool.clone();
            tokio::spawn(async move {
                match pool.factory.connect(&pool.target).await {
                    Ok(client) => {
                        let leftover = {
                            let mut inner = pool.lock_inner();
                            inner.creating -= 1;
                            if inner.destroyed {
                                Some(client)
                            } else {
                                let id = Self::register_idle(&mut inner, client);
                                Self::dispatch_or_park(&mut inner, &id);
                                None
                            }
                        };
                        if let Some(client) = leftover {
                            let _ = client.close().await;
                        }
                    }
                    Err(e) => {
                        pool.lock_inner().creating -= 1;
                        warn!(error = %e, "scale-up connection failed, waiters stay queued");
                    }
                }
            });
        }
    }

    // ========================================================================
    // Cleanup and recovery
    // ========================================================================

    fn ensure_cleanup_task(&self) {
        if self.cleanup_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(weak) = self.self_ref.get().cloned() else {
            return;
        };
        let interval = self.config.cleanup_interval;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(pool) = weak.upgrade() else { break };
                if pool.is_destroyed() {
                    break;
                }
                pool.run_cleanup().await;
            }
        });
    }

    /// Evict expired idle connections, then restore the configured minimum
    ///
    /// Runs periodically in the background; also invokable on demand. In-use
    /// connections are never evicted regardless of age. Creation failures
    /// during top-up are logged, not escalated.
    pub async fn run_cleanup(&self) {
        let expired: Vec<(String, Arc<dyn DbClient>)> = {
            let mut inner = self.lock_inner();
            if inner.destroyed {
                return;
            }
            let ids: Vec<String> = inner
                .connections
                .iter()
                .filter(|(_, e)| {
                    !e.in_use && e.is_expired(self.config.max_lifetime, self.config.idle_timeout)
                })
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| inner.connections.remove(&id).map(|e| (id, e.client)))
                .collect()
        };

        for (id, client) in &expired {
            debug!(id = %id, "evicting expired idle connection");
            if let Err(e) = client.close().await {
                warn!(id = %id, error = %e, "error closing expired connection");
            }
        }

        let deficit = {
            let mut inner = self.lock_inner();
            if inner.destroyed {
                return;
            }
            let deficit = self
                .config
                .min_connections
                .saturating_sub(inner.connections.len() + inner.creating);
            inner.creating += deficit;
            deficit
        };

        for _ in 0..deficit {
            match self.factory.connect(&self.target).await {
                Ok(client) => {
                    let leftover = {
                        let mut inner = self.lock_inner();
                        inner.creating -= 1;
                        if inner.destroyed {
                            Some(client)
                        } else {
                            let id = Self::register_idle(&mut inner, client);
                            Self::dispatch_or_park(&mut inner, &id);
                            None
                        }
                    };
                    if let Some(client) = leftover {
                        let _ = client.close().await;
                        return;
                    }
                }
                Err(e) => {
                    self.lock_inner().creating -= 1;
                    warn!(error = %e, "failed to create connection during cleanup");
                }
            }
        }
    }

    /// Force-reclaim connections whose holders never released them
    ///
    /// A connection in use longer than the stuck threshold indicates a caller
    /// that crashed or leaked its claim, not a long query. Each freed
    /// connection serves one queued waiter (FIFO); leftovers stay idle.
    /// Returns the number of connections reclaimed. Administrative escape
    /// hatch; never runs automatically.
    pub fn emergency_recovery(&self) -> usize {
        let mut inner = self.lock_inner();
        if inner.destroyed {
            return 0;
        }

        let stuck: Vec<String> = inner
            .connections
            .iter()
            .filter(|(_, e)| e.in_use && e.idle_for() > self.config.stuck_threshold)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &stuck {
            if let Some(entry) = inner.connections.get_mut(id) {
                warn!(id = %id, "force-releasing stuck connection");
                entry.in_use = false;
                entry.touch();
            }
        }

        // One handoff per freed connection, stopping when the queue empties
        for id in &stuck {
            if inner.waiters.is_empty() {
                break;
            }
            Self::dispatch_or_park(&mut inner, id);
        }

        if !stuck.is_empty() {
            info!(reclaimed = stuck.len(), "emergency recovery reclaimed connections");
        }
        stuck.len()
    }

    // ========================================================================
    // Query facade
    // ========================================================================

    /// Execute a statement on a pooled connection
    ///
    /// Acquires, runs, and releases on both success and error paths; the
    /// operation's result or error is propagated verbatim.
    pub async fn execute(&self, sql: &str, args: &[Value]) -> Result<QueryResult> {
        let conn = self.acquire().await?;
        self.note_query(&conn);
        let result = conn.client().execute(sql, args).await;
        self.release(&conn);
        result
    }

    /// Run a callback with exclusive use of one connection
    ///
    /// This groups the callback's statements onto a single connection; it is
    /// NOT an ACID transaction. The stateless HTTP backend offers no
    /// multi-statement atomicity, and statements from other callers may
    /// interleave against the remote service between the callback's own.
    pub async fn transaction<T, F, Fut>(&self, callback: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn DbClient>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let conn = self.acquire().await?;
        self.note_query(&conn);
        let result = callback(conn.client().clone()).await;
        self.release(&conn);
        result
    }

    fn note_query(&self, conn: &PooledConn) {
        let mut inner = self.lock_inner();
        if let Some(entry) = inner.connections.get_mut(conn.id()) {
            entry.query_count += 1;
        }
    }

    // ========================================================================
    // Stats and teardown
    // ========================================================================

    /// Snapshot current pool state
    pub fn stats(&self) -> PoolStats {
        let inner = self.lock_inner();
        let total = inner.connections.len();
        let in_use = inner.connections.values().filter(|e| e.in_use).count();
        let stuck = inner
            .connections
            .values()
            .filter(|e| e.in_use && e.idle_for() > self.config.stuck_threshold)
            .count();
        let total_queries: u64 = inner.connections.values().map(|e| e.query_count).sum();

        PoolStats {
            total_connections: total,
            in_use,
            available: total - in_use,
            stuck_connections: stuck,
            waiting: inner.waiters.len(),
            total_queries,
            avg_queries_per_connection: if total > 0 {
                total_queries as f64 / total as f64
            } else {
                0.0
            },
            utilization: if total > 0 {
                in_use as f64 / total as f64
            } else {
                0.0
            },
            config: self.config.clone(),
        }
    }

    /// Destroy the pool
    ///
    /// Fails every queued waiter, closes every connection (in use or not) and
    /// makes all further operations fail fast. A destroyed pool is never
    /// reused; construct a fresh one.
    pub async fn destroy(&self) {
        let (waiters, clients) = {
            let mut inner = self.lock_inner();
            if inner.destroyed {
                return;
            }
            inner.destroyed = true;
            let waiters: Vec<Waiter> = inner.waiters.drain(..).collect();
            let clients: Vec<(String, Arc<dyn DbClient>)> = inner
                .connections
                .drain()
                .map(|(id, e)| (id, e.client))
                .collect();
            (waiters, clients)
        };

        info!(
            connections = clients.len(),
            waiters = waiters.len(),
            "destroying connection pool"
        );

        for waiter in waiters {
            let _ = waiter.tx.send(Err(Error::PoolDestroyed));
        }
        for (id, client) in clients {
            if let Err(e) = client.close().await {
                warn!(id = %id, error = %e, "error closing connection during destroy");
            }
        }
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock_inner();
        f.debug_struct("Pool")
            .field("target", &self.target)
            .field("connections", &inner.connections.len())
            .field("waiting", &inner.waiters.len())
            .field("destroyed", &inner.destroyed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct StubClient;

    #[async_trait]
    impl DbClient for StubClient {
        async fn execute(&self, _sql: &str, _args: &[Value]) -> Result<QueryResult> {
            Ok(QueryResult::default())
        }
    }

    struct StubFactory {
        created: AtomicUsize,
    }

    impl StubFactory {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                created: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ClientFactory for StubFactory {
        async fn connect(&self, _target: &ConnectTarget) -> Result<Arc<dyn DbClient>> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(StubClient))
        }
    }

    fn test_pool(config: PoolConfig) -> Arc<Pool> {
        Pool::new(
            ConnectTarget::new("https://db.example.io"),
            StubFactory::new(),
            config,
        )
    }

    #[test]
    fn test_pool_config_default() {
        let config = PoolConfig::default();

        assert_eq!(config.min_connections, 1);
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.max_lifetime, Duration::from_secs(600));
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert_eq!(config.cleanup_interval, Duration::from_secs(60));
        assert_eq!(config.stuck_threshold, Duration::from_secs(5));
        assert_eq!(config.retry_attempts, 2);
    }

    #[test]
    fn test_pool_config_builder() {
        let config = PoolConfig::default()
            .with_min_connections(2)
            .with_max_connections(16)
            .with_max_lifetime(Duration::from_secs(1200))
            .with_idle_timeout(Duration::from_secs(30))
            .with_cleanup_interval(Duration::from_secs(10))
            .with_stuck_threshold(Duration::from_secs(2))
            .with_retry_attempts(3);

        assert_eq!(config.min_connections, 2);
        assert_eq!(config.max_connections, 16);
        assert_eq!(config.max_lifetime, Duration::from_secs(1200));
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
        assert_eq!(config.cleanup_interval, Duration::from_secs(10));
        assert_eq!(config.stuck_threshold, Duration::from_secs(2));
        assert_eq!(config.retry_attempts, 3);
    }

    #[test]
    fn test_scale_burst_bounds() {
        // limited by queue depth
        assert_eq!(Pool::scale_burst(2, 0, 8), 2);
        // limited by headroom
        assert_eq!(Pool::scale_burst(10, 6, 8), 2);
        // limited by the burst cap
        assert_eq!(Pool::scale_burst(20, 0, 100), SCALE_BURST_MAX);
        // no headroom
        assert_eq!(Pool::scale_burst(10, 8, 8), 0);
    }

    #[tokio::test]
    async fn test_stats_math() {
        let pool = test_pool(PoolConfig::default().with_max_connections(4));

        let stats = pool.stats();
        assert_eq!(stats.total_connections, 0);
        assert_eq!(stats.utilization, 0.0);
        assert_eq!(stats.avg_queries_per_connection, 0.0);

        let conn = pool.acquire().await.unwrap();
        let stats = pool.stats();
        assert_eq!(stats.total_connections, 1);
        assert_eq!(stats.in_use, 1);
        assert_eq!(stats.available, 0);
        assert_eq!(stats.utilization, 1.0);

        pool.release(&conn);
        let stats = pool.stats();
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.available, 1);
        assert_eq!(stats.utilization, 0.0);
    }

    #[tokio::test]
    async fn test_execute_counts_queries() {
        let pool = test_pool(PoolConfig::default());

        pool.execute("SELECT 1", &[]).await.unwrap();
        pool.execute("SELECT 2", &[]).await.unwrap();

        let stats = pool.stats();
        assert_eq!(stats.total_queries, 2);
        assert_eq!(stats.total_connections, 1);
        assert_eq!(stats.avg_queries_per_connection, 2.0);
    }

    #[test]
    fn test_stats_serializable() {
        let pool = test_pool(PoolConfig::default());
        let json = serde_json::to_value(pool.stats()).unwrap();

        assert_eq!(json["total_connections"], 0);
        assert_eq!(json["config"]["max_connections"], 8);
    }
}
