//! End-to-end tests of the task exchange protocol over a shared bridge
//! directory: submit, respond, await, and the consumption discipline.

mod helpers;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use vigil::domain::models::ExchangeTask;
use vigil::services::responder::{EchoFulfiller, Responder};
use vigil::{ExchangeClient, Fulfiller};

use helpers::{fast_exchange_config, peer_store, temp_store};

#[tokio::test]
async fn test_round_trip_via_responder() {
    let (dir, store) = temp_store().await;
    let config = fast_exchange_config(dir.path());
    let client = ExchangeClient::new(store, &config);

    let task_id = client.submit("claude", "say hello").await.unwrap();
    assert!(dir
        .path()
        .join(format!("tasks/task_{task_id}.json"))
        .exists());

    // The peer consumes the task and publishes the matching result
    let responder = Responder::new(peer_store(&dir).await, Arc::new(EchoFulfiller), &config);
    assert_eq!(responder.poll_once().await, 1);

    assert!(!dir
        .path()
        .join(format!("tasks/task_{task_id}.json"))
        .exists());

    let response = client
        .await_result(&task_id, Duration::from_secs(2))
        .await
        .expect("expected a response");
    assert_eq!(response, "RECEIVED: say hello");

    // Consumption is destructive
    assert!(!dir
        .path()
        .join(format!("results/result_{task_id}.json"))
        .exists());
}

#[tokio::test]
async fn test_pre_published_result_is_consumed_exactly_once() {
    let (dir, store) = temp_store().await;
    let config = fast_exchange_config(dir.path());
    let client = ExchangeClient::new(store, &config);

    // Result arrives before anyone waits for it, raw wire format
    std::fs::write(
        dir.path().join("results/result_abc123.json"),
        r#"{"task_id": "abc123", "response": "patched", "ai_used": "gemini_1"}"#,
    )
    .unwrap();

    let task_id = "abc123".parse().unwrap();
    let response = client.await_result(&task_id, Duration::from_secs(2)).await;
    assert_eq!(response.as_deref(), Some("patched"));
    assert!(!dir.path().join("results/result_abc123.json").exists());

    // A second await finds nothing: the result was delivered exactly once
    let again = client
        .await_result(&task_id, Duration::from_millis(200))
        .await;
    assert_eq!(again, None);
}

#[tokio::test]
async fn test_await_result_times_out_with_none() {
    let (dir, store) = temp_store().await;
    let config = fast_exchange_config(dir.path());
    let client = ExchangeClient::new(store, &config);

    let task_id = "feed1234".parse().unwrap();
    let started = Instant::now();
    let response = client
        .await_result(&task_id, Duration::from_millis(300))
        .await;

    assert_eq!(response, None);
    // Bounded: returns soon after the deadline, no indefinite retry
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_mismatched_result_is_rejected_not_deleted() {
    let (dir, store) = temp_store().await;
    let config = fast_exchange_config(dir.path());
    let client = ExchangeClient::new(store, &config);

    // File name promises abc123 but the record answers someone else
    let path = dir.path().join("results/result_abc123.json");
    std::fs::write(
        &path,
        r#"{"task_id": "other999", "response": "stray", "ai_used": "claude"}"#,
    )
    .unwrap();

    let task_id = "abc123".parse().unwrap();
    let response = client
        .await_result(&task_id, Duration::from_millis(300))
        .await;

    assert_eq!(response, None);
    // Left in place for the operator
    assert!(path.exists());
}

#[tokio::test]
async fn test_stray_results_for_other_tasks_are_untouched() {
    let (dir, store) = temp_store().await;
    let config = fast_exchange_config(dir.path());
    let client = ExchangeClient::new(store, &config);

    let stray = dir.path().join("results/result_zzz999.json");
    std::fs::write(
        &stray,
        r#"{"task_id": "zzz999", "response": "not yours", "ai_used": "claude"}"#,
    )
    .unwrap();

    let task_id = "abc123".parse().unwrap();
    let response = client
        .await_result(&task_id, Duration::from_millis(200))
        .await;

    assert_eq!(response, None);
    assert!(stray.exists());
}

struct FailingFulfiller;

#[async_trait]
impl Fulfiller for FailingFulfiller {
    fn name(&self) -> &str {
        "failing"
    }

    async fn fulfill(&self, _task: &ExchangeTask) -> anyhow::Result<String> {
        anyhow::bail!("backend unavailable")
    }
}

#[tokio::test]
async fn test_fulfiller_failure_drops_task_without_result() {
    let (dir, store) = temp_store().await;
    let config = fast_exchange_config(dir.path());
    let client = ExchangeClient::new(store, &config);

    let task_id = client.submit("claude", "doomed").await.unwrap();

    let responder = Responder::new(peer_store(&dir).await, Arc::new(FailingFulfiller), &config);
    assert_eq!(responder.poll_once().await, 0);

    // Task consumed so it is not retried forever; no result published
    assert!(!dir
        .path()
        .join(format!("tasks/task_{task_id}.json"))
        .exists());
    assert!(!dir
        .path()
        .join(format!("results/result_{task_id}.json"))
        .exists());
}

#[tokio::test]
async fn test_responder_fulfills_oldest_first() {
    let (dir, store) = temp_store().await;
    let config = fast_exchange_config(dir.path());
    let client = ExchangeClient::new(store, &config);

    let first = client.submit("claude", "first").await.unwrap();
    let second = client.submit("claude", "second").await.unwrap();

    let responder = Responder::new(peer_store(&dir).await, Arc::new(EchoFulfiller), &config);
    assert_eq!(responder.poll_once().await, 2);

    for id in [&first, &second] {
        assert!(dir
            .path()
            .join(format!("results/result_{id}.json"))
            .exists());
    }
}
