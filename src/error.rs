//! Error types for hrana-pool
//!
//! Provides granular error classification for proper retry handling:
//! - Retriable errors (connection, timeout)
//! - Terminal errors (destroyed pool, configuration)

use std::fmt;
use thiserror::Error;

/// Result type for hrana-pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection establishment errors (retriable)
    Connection,
    /// Query execution errors
    Query,
    /// Authentication failure
    Authentication,
    /// Configuration error
    Configuration,
    /// Timeout errors (retriable)
    Timeout,
    /// Pool lifecycle errors (destroyed, not initialized)
    Pool,
    /// Unknown/other errors
    Other,
}

impl ErrorCategory {
    /// Whether errors in this category are generally retriable
    #[inline]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Connection | Self::Timeout)
    }
}

/// Main error type for hrana-pool
#[derive(Error, Debug)]
pub enum Error {
    /// The pool has been destroyed; all operations fail fast
    #[error("connection pool has been destroyed")]
    PoolDestroyed,

    /// No authoritative pool instance exists yet
    #[error("connection pool not initialized")]
    PoolNotInitialized,

    /// Connection establishment failed
    #[error("connection error: {message}")]
    Connection {
        /// Human-readable description
        message: String,
        /// Underlying cause, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution failed
    #[error("query error: {message}")]
    Query {
        /// Human-readable description
        message: String,
        /// The SQL that failed, if known
        sql: Option<String>,
        /// Underlying cause, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication against the remote service failed
    #[error("authentication failed: {message}")]
    Authentication {
        /// Human-readable description
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration {
        /// Human-readable description
        message: String,
    },

    /// Operation timed out
    #[error("timeout: {message}")]
    Timeout {
        /// Human-readable description
        message: String,
    },

    /// Internal error
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable description
        message: String,
    },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PoolDestroyed | Self::PoolNotInitialized => ErrorCategory::Pool,
            Self::Connection { .. } => ErrorCategory::Connection,
            Self::Query { .. } => ErrorCategory::Query,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Internal { .. } => ErrorCategory::Other,
        }
    }

    /// Whether this error is retriable
    #[inline]
    pub fn is_retriable(&self) -> bool {
        self.category().is_retriable()
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: None,
            source: None,
        }
    }

    /// Create a query error with SQL
    pub fn query_with_sql(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: Some(sql.into()),
            source: None,
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "connection"),
            Self::Query => write!(f, "query"),
            Self::Authentication => write!(f, "authentication"),
            Self::Configuration => write!(f, "configuration"),
            Self::Timeout => write!(f, "timeout"),
            Self::Pool => write!(f, "pool"),
            Self::Other => write!(f, "other"),
        }
    }
}
