//! Integration tests for background overview polling.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use aqua_rewards_client::{CashbackOverview, poll_overview};
use aqua_rewards_core::Tier;
use aqua_rewards_integration_tests::{Failure, FakeBackend};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use tokio::time::timeout;

const INTERVAL: Duration = Duration::from_millis(50);
const WAIT: Duration = Duration::from_secs(5);

fn overview(active_users: u64) -> CashbackOverview {
    CashbackOverview {
        total_cashback_paid: Decimal::from(10 * active_users),
        active_users,
        users_by_tier: [(Tier::Lead, active_users)].into_iter().collect(),
        ..CashbackOverview::default()
    }
}

#[tokio::test]
async fn test_poller_picks_up_changes() {
    let backend = FakeBackend::start().await.unwrap();
    backend.set_overview(overview(1));

    let poller = poll_overview(backend.repository().unwrap(), INTERVAL);
    let mut updates = poller.subscribe();

    timeout(WAIT, updates.changed()).await.unwrap().unwrap();
    assert_eq!(poller.latest().unwrap().active_users, 1);

    backend.set_overview(overview(5));
    timeout(
        WAIT,
        updates.wait_for(|o| o.as_ref().is_some_and(|o| o.active_users == 5)),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(
        poller.latest().unwrap().average_cashback_per_user(),
        Decimal::from(10)
    );
}

#[tokio::test]
async fn test_poller_survives_backend_errors() {
    let backend = FakeBackend::start().await.unwrap();
    backend.set_overview(overview(2));

    let poller = poll_overview(backend.repository().unwrap(), INTERVAL);
    let mut updates = poller.subscribe();
    timeout(WAIT, updates.changed()).await.unwrap().unwrap();

    backend.fail_next(Failure::status(StatusCode::BAD_GATEWAY));
    tokio::time::sleep(INTERVAL * 3).await;

    assert!(poller.is_running());
    assert_eq!(poller.latest().unwrap().active_users, 2);
    assert!(backend.reads() >= 3);
}

#[tokio::test]
async fn test_dropping_poller_stops_requests() {
    let backend = FakeBackend::start().await.unwrap();
    let poller = poll_overview(backend.repository().unwrap(), INTERVAL);
    let mut updates = poller.subscribe();
    timeout(WAIT, updates.changed()).await.unwrap().unwrap();

    drop(poller);
    timeout(WAIT, async { while updates.changed().await.is_ok() {} })
        .await
        .unwrap();

    // Let any request already on the wire land first.
    tokio::time::sleep(INTERVAL).await;
    let reads = backend.reads();
    tokio::time::sleep(INTERVAL * 4).await;
    assert_eq!(backend.reads(), reads);
}
