//! Pooled connection handle and registry-side lifecycle metadata
//!
//! A "connection" to the HTTP-accessed database is a verified client plus
//! lifecycle bookkeeping. The registry owns the bookkeeping (`ConnEntry`);
//! callers hold a [`PooledConn`] claim that must be returned explicitly with
//! [`Pool::release`](crate::pool::Pool::release). Release is deliberately not
//! tied to `Drop`: a caller that leaks its claim is exactly the "stuck
//! connection" case the recovery controller exists to repair.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::client::DbClient;

/// Generate a pool-unique connection id (time-based prefix + random suffix)
pub(crate) fn generate_conn_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("conn_{millis}_{}", &suffix[..9])
}

/// Registry-side state for one connection
pub(crate) struct ConnEntry {
    /// The client handle; exclusively owned by the holder while in use
    pub client: Arc<dyn DbClient>,
    /// True between a successful acquire and the matching release
    pub in_use: bool,
    /// When the connection was created
    pub created_at: Instant,
    /// When the connection was last claimed or returned
    pub last_used: Instant,
    /// Number of queries routed through this connection (statistics only)
    pub query_count: u64,
}

impl ConnEntry {
    pub fn new(client: Arc<dyn DbClient>) -> Self {
        let now = Instant::now();
        Self {
            client,
            in_use: false,
            created_at: now,
            last_used: now,
            query_count: 0,
        }
    }

    /// Time since creation
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Time since last claim or return
    pub fn idle_for(&self) -> Duration {
        self.last_used.elapsed()
    }

    /// Whether an idle connection should no longer be handed out
    pub fn is_expired(&self, max_lifetime: Duration, idle_timeout: Duration) -> bool {
        self.age() > max_lifetime || self.idle_for() > idle_timeout
    }

    /// Update the last-used timestamp
    pub fn touch(&mut self) {
        self.last_used = Instant::now();
    }
}

/// A connection claimed from the pool
///
/// The holder has exclusive use of the underlying client until the claim is
/// passed back to [`Pool::release`](crate::pool::Pool::release). Dropping a
/// `PooledConn` without releasing it leaks the slot until
/// [`Pool::emergency_recovery`](crate::pool::Pool::emergency_recovery)
/// reclaims it.
#[derive(Clone)]
pub struct PooledConn {
    id: String,
    client: Arc<dyn DbClient>,
}

impl std::fmt::Debug for PooledConn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConn").field("id", &self.id).finish()
    }
}

impl PooledConn {
    pub(crate) fn new(id: impl Into<String>, client: Arc<dyn DbClient>) -> Self {
        Self {
            id: id.into(),
            client,
        }
    }

    /// The pool-unique id of this connection
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The underlying client handle
    pub fn client(&self) -> &Arc<dyn DbClient> {
        &self.client
    }

    /// Execute a statement on this connection
    pub async fn execute(
        &self,
        sql: &str,
        args: &[crate::types::Value],
    ) -> crate::error::Result<crate::types::QueryResult> {
        self.client.execute(sql, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::types::QueryResult;
    use async_trait::async_trait;

    struct NoopClient;

    #[async_trait]
    impl DbClient for NoopClient {
        async fn execute(&self, _sql: &str, _args: &[crate::types::Value]) -> Result<QueryResult> {
            Ok(QueryResult::default())
        }
    }

    #[test]
    fn test_conn_id_format_and_uniqueness() {
        let a = generate_conn_id();
        let b = generate_conn_id();

        assert!(a.starts_with("conn_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_entry_expiry() {
        let entry = ConnEntry::new(Arc::new(NoopClient));
        assert!(!entry.is_expired(Duration::from_secs(600), Duration::from_secs(60)));

        std::thread::sleep(Duration::from_millis(5));
        assert!(entry.is_expired(Duration::from_millis(1), Duration::from_secs(60)));
        assert!(entry.is_expired(Duration::from_secs(600), Duration::from_millis(1)));
    }

    #[test]
    fn test_entry_touch_resets_idle_time() {
        let mut entry = ConnEntry::new(Arc::new(NoopClient));
        std::thread::sleep(Duration::from_millis(5));
        assert!(entry.idle_for() >= Duration::from_millis(5));

        entry.touch();
        assert!(entry.idle_for() < Duration::from_millis(5));
    }
}
