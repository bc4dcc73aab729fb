//! # hrana-pool
//!
//! Bounded, self-healing async connection pool for SQL databases reachable
//! only over stateless HTTP (Hrana/libsql-style pipeline endpoint).
//!
//! The remote service has no sockets to keep alive; a "connection" here is a
//! verified HTTP client carrying auth context. Pooling still pays off: it
//! caps concurrent pressure on the service, amortizes the verification round
//! trip, and serializes callers onto exclusive handles.
//!
//! ## Features
//!
//! - **Bounded concurrency**: registry size never exceeds the configured
//!   maximum, counting in-flight creations
//! - **FIFO fairness**: saturated callers queue and are fulfilled strictly in
//!   arrival order, with no pool-imposed timeout
//! - **Proactive scaling**: queue backlog triggers a bounded concurrent burst
//!   of new connections instead of one-at-a-time growth
//! - **Idle reclamation**: a background task evicts expired idle connections
//!   and restores the configured minimum
//! - **Stuck-connection recovery**: an on-demand administrative path reclaims
//!   connections whose holders leaked them
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hrana_pool::prelude::*;
//! use std::sync::Arc;
//!
//! let pool = Pool::new(
//!     ConnectTarget::new("https://mydb.example.io").with_auth_token("ey..."),
//!     Arc::new(HranaHttpFactory),
//!     PoolConfig::default().with_max_connections(8),
//! );
//!
//! // One-shot query on a pooled connection
//! let rows = pool.execute("SELECT * FROM users WHERE id = ?", &[Value::from(1_i64)]).await?;
//!
//! // Group several statements onto a single connection (not atomic!)
//! pool.transaction(|client| async move {
//!     client.execute("INSERT INTO audit (msg) VALUES (?)", &[Value::from("a")]).await?;
//!     client.execute("INSERT INTO audit (msg) VALUES (?)", &[Value::from("b")]).await?;
//!     Ok(())
//! }).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod client;
pub mod connection;
pub mod error;
pub mod manager;
pub mod pool;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{Error, ErrorCategory, Result};

    // Value and result types
    pub use crate::types::{QueryResult, Row, Value};

    // Client traits and target config
    pub use crate::client::{
        ClientFactory, ConnectTarget, DbClient, HranaHttpClient, HranaHttpFactory,
    };

    // Connection and pool types
    pub use crate::connection::PooledConn;
    pub use crate::pool::{Pool, PoolConfig, PoolStats};

    // Instance management
    pub use crate::manager::PoolManager;
}

// Re-export commonly used items at crate root
pub use error::{Error, Result};
pub use pool::{Pool, PoolConfig};
pub use types::Value;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _value = Value::from(42_i64);
        let _target = ConnectTarget::new("https://db.example.io");
        let _config = PoolConfig::default();
    }

    #[test]
    fn test_error_types() {
        let err = Error::connection("test error");
        assert!(err.is_retriable());
        assert_eq!(err.category(), ErrorCategory::Connection);
    }
}
