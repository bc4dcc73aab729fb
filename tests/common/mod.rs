//! Shared test doubles for pool integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use hrana_pool::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory client that counts calls
pub struct MockClient {
    executed: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl DbClient for MockClient {
    async fn execute(&self, _sql: &str, _args: &[Value]) -> Result<QueryResult> {
        self.executed.fetch_add(1, Ordering::SeqCst);
        Ok(QueryResult::default())
    }

    async fn close(&self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Scriptable factory: each connect pops an outcome (true = fail); an empty
/// script means success. The delay applies to successful connects only.
pub struct MockFactory {
    created: AtomicUsize,
    closed: Arc<AtomicUsize>,
    fail_script: Mutex<VecDeque<bool>>,
    connect_delay: Duration,
}

impl MockFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            created: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
            fail_script: Mutex::new(VecDeque::new()),
            connect_delay: Duration::ZERO,
        })
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            created: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
            fail_script: Mutex::new(VecDeque::new()),
            connect_delay: delay,
        })
    }

    /// Queue outcomes for upcoming connect calls (true = fail that call)
    pub fn script(self: &Arc<Self>, outcomes: &[bool]) -> Arc<Self> {
        self.fail_script
            .lock()
            .unwrap()
            .extend(outcomes.iter().copied());
        self.clone()
    }

    /// Number of successful connects so far
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of clients closed so far
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    async fn connect(&self, _target: &ConnectTarget) -> Result<Arc<dyn DbClient>> {
        let fail = self
            .fail_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(false);
        if fail {
            return Err(Error::connection("mock connect failure"));
        }
        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockClient {
            executed: AtomicUsize::new(0),
            closed: self.closed.clone(),
        }))
    }
}

/// Install a log subscriber once; `RUST_LOG=debug` surfaces pool tracing
fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A pool wired to a mock factory
pub fn mock_pool(factory: Arc<MockFactory>, config: PoolConfig) -> Arc<Pool> {
    init_tracing();
    Pool::new(
        ConnectTarget::new("https://db.example.io").with_auth_token("test-token"),
        factory,
        config,
    )
}
