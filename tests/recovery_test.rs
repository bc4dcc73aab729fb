//! Tests for stuck-connection detection and emergency recovery

mod common;

use common::{mock_pool, MockFactory};
use hrana_pool::prelude::*;
use std::time::Duration;
use tokio::time::sleep;

fn recovery_config() -> PoolConfig {
    PoolConfig::default()
        .with_max_connections(2)
        .with_stuck_threshold(Duration::from_millis(30))
}

#[tokio::test]
async fn test_stuck_connection_is_reclaimed() {
    let pool = mock_pool(MockFactory::new(), recovery_config());

    let leaked = pool.acquire().await.unwrap();
    let leaked_id = leaked.id().to_string();
    drop(leaked); // holder goes away without releasing

    sleep(Duration::from_millis(60)).await;
    assert_eq!(pool.stats().stuck_connections, 1);

    let reclaimed = pool.emergency_recovery();
    assert_eq!(reclaimed, 1);

    let stats = pool.stats();
    assert_eq!(stats.in_use, 0);
    assert_eq!(stats.available, 1);
    assert_eq!(stats.stuck_connections, 0);

    // The reclaimed connection is available to the next caller
    let next = pool.acquire().await.unwrap();
    assert_eq!(next.id(), leaked_id);
    pool.release(&next);
}

#[tokio::test]
async fn test_recovery_serves_queued_waiters() {
    let pool = mock_pool(
        MockFactory::new(),
        PoolConfig::default()
            .with_max_connections(1)
            .with_stuck_threshold(Duration::from_millis(30)),
    );

    let leaked = pool.acquire().await.unwrap();
    let leaked_id = leaked.id().to_string();
    drop(leaked);

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move {
            let conn = pool.acquire().await.unwrap();
            let id = conn.id().to_string();
            pool.release(&conn);
            id
        })
    };
    sleep(Duration::from_millis(60)).await;
    assert_eq!(pool.stats().waiting, 1);

    assert_eq!(pool.emergency_recovery(), 1);
    assert_eq!(waiter.await.unwrap(), leaked_id);
}

#[tokio::test]
async fn test_active_connection_is_not_reclaimed() {
    let pool = mock_pool(MockFactory::new(), recovery_config());

    let conn = pool.acquire().await.unwrap();
    // Well within the stuck threshold
    assert_eq!(pool.emergency_recovery(), 0);
    assert_eq!(pool.stats().in_use, 1);
    pool.release(&conn);
}

#[tokio::test]
async fn test_recovery_leaves_unmatched_connections_idle() {
    let pool = mock_pool(MockFactory::new(), recovery_config());

    // Two leaked connections, no waiters: both end up idle
    let a = pool.acquire().await.unwrap();
    let b = pool.acquire().await.unwrap();
    drop(a);
    drop(b);
    sleep(Duration::from_millis(60)).await;

    assert_eq!(pool.emergency_recovery(), 2);
    let stats = pool.stats();
    assert_eq!(stats.available, 2);
    assert_eq!(stats.waiting, 0);
}

#[tokio::test]
async fn test_recovery_on_destroyed_pool_reclaims_nothing() {
    let pool = mock_pool(MockFactory::new(), recovery_config());
    let conn = pool.acquire().await.unwrap();
    pool.release(&conn);

    pool.destroy().await;
    assert_eq!(pool.emergency_recovery(), 0);
}
