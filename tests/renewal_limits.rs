//! Integration tests for the renewal limits: renewal timeout and replay
//! queue bound
//!
//! These tests verify the limits are real, not false positives.

mod common;

use common::{Harness, Renewal};
use expensevista_client::{ApiRequest, ClientConfig, ClientError, RenewalState};
use reqwest::StatusCode;
use std::time::{Duration, Instant};

// ============================================================================
// Timeout Tests - Verify a hung renewal cannot block callers
// ============================================================================

#[tokio::test]
async fn test_renewal_timeout_actually_prevents_blocking() {
    // Without the timeout this would take 10 seconds
    let config = ClientConfig::builder()
        .renewal_timeout(Duration::from_millis(100))
        .build();
    let harness = Harness::with_config(config);
    harness.store.set("T1".into());
    harness
        .backend
        .script(Renewal::Issue("T2", Duration::from_secs(10)));

    let start = Instant::now();
    let result = harness.channel.send(ApiRequest::get("/a")).await;
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_millis(1000),
        "Renewal timeout failed! Took {:?} (expected < 1s)",
        elapsed
    );

    match result {
        Err(ClientError::SessionExpired { reason }) => {
            assert!(reason.contains("timed out"), "unexpected reason: {reason}");
        }
        other => panic!("expected SessionExpired, got {other:?}"),
    }

    assert!(harness.store.get().is_none());
    assert_eq!(harness.coordinator.state(), RenewalState::Idle);

    harness.settle_publications().await;
    assert_eq!(harness.published(), 1);
}

#[tokio::test]
async fn test_fast_renewal_completes_within_timeout() {
    let config = ClientConfig::builder()
        .renewal_timeout(Duration::from_secs(5))
        .build();
    let harness = Harness::with_config(config);
    harness.store.set("T1".into());
    harness
        .backend
        .script(Renewal::Issue("T2", Duration::from_millis(10)));

    let response = tokio_test::assert_ok!(harness.channel.send(ApiRequest::get("/a")).await);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(harness.published(), 0);
}

// ============================================================================
// Queue Bound Tests - Overflow is rejected, admitted calls still complete
// ============================================================================

#[tokio::test]
async fn test_replay_queue_bound_rejects_overflow() {
    let config = ClientConfig::builder().max_pending_replays(2).build();
    let harness = Harness::with_config(config);
    harness.store.set("T1".into());
    harness
        .backend
        .script(Renewal::Issue("T2", Duration::from_millis(100)));

    let (a, b, c, d) = tokio::join!(
        harness.channel.send(ApiRequest::get("/a")),
        harness.channel.send(ApiRequest::get("/b")),
        harness.channel.send(ApiRequest::get("/c")),
        harness.channel.send(ApiRequest::get("/d")),
    );

    assert_eq!(a.unwrap().status(), StatusCode::OK);
    assert_eq!(b.unwrap().status(), StatusCode::OK);
    for overflow in [c, d] {
        assert!(matches!(
            overflow,
            Err(ClientError::ReplayQueueFull { capacity: 2 })
        ));
    }

    // Overflow never starts a second renewal
    assert_eq!(harness.backend.refresh_calls(), 1);
    assert_eq!(harness.store.get().unwrap().as_str(), "T2");
}

#[tokio::test]
async fn test_queue_accepts_again_after_renewal_settles() {
    let config = ClientConfig::builder().max_pending_replays(1).build();
    let harness = Harness::with_config(config);
    harness.store.set("T1".into());
    harness
        .backend
        .script(Renewal::Issue("T2", Duration::from_millis(20)));

    harness.channel.send(ApiRequest::get("/a")).await.unwrap();
    assert_eq!(harness.coordinator.pending(), 0);

    let response = harness.channel.send(ApiRequest::get("/b")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
