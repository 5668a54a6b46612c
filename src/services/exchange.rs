//! Task exchange client.
//!
//! The requester half of the exchange protocol: publish a task into the
//! shared store, then poll for the matching result. There is no push
//! notification anywhere in this channel, so latency is bounded below by
//! the poll interval and above by sync latency plus the caller's timeout.

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::domain::models::{ExchangeConfig, ExchangeTask, TaskId};
use crate::domain::ports::errors::ExchangeError;
use crate::infrastructure::queue_store::FileQueueStore;

/// Client side of the task exchange: submit and await.
pub struct ExchangeClient {
    store: FileQueueStore,
    poll_interval: Duration,
}

impl ExchangeClient {
    /// Create a client over an opened store.
    pub fn new(store: FileQueueStore, config: &ExchangeConfig) -> Self {
        Self {
            store,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Publish a task addressed to `responder` and return its identifier.
    ///
    /// Fails with `ExchangeError::Publish` when outbound synchronization
    /// fails; the record is then local-only and invisible to the peer.
    #[instrument(skip(self, prompt), fields(responder = %responder))]
    pub async fn submit(&self, responder: &str, prompt: &str) -> Result<TaskId, ExchangeError> {
        let task = ExchangeTask::new(responder, prompt);
        task.validate().map_err(ExchangeError::Invalid)?;

        self.store.publish_task(&task).await?;
        info!(task_id = %task.id, prompt_chars = prompt.len(), "task published");
        Ok(task.id)
    }

    /// Block-poll for the result matching `task_id`.
    ///
    /// Every poll interval: sync inbound, look for the matching result
    /// file; on match consume it (read, delete) and return the response
    /// text. Consumption is destructive: at most one caller ever sees a
    /// given result. After `timeout` of wall-clock time with no match,
    /// returns `None`: a timeout is a defined outcome the caller must
    /// handle, not an error.
    ///
    /// Transient sync or read failures are logged and count as "no
    /// progress this poll".
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub async fn await_result(&self, task_id: &TaskId, timeout: Duration) -> Option<String> {
        let started = Instant::now();
        let deadline = started + timeout;

        loop {
            if let Err(e) = self.store.refresh().await {
                warn!(error = %e, "inbound sync failed; no progress this poll");
            }

            match self.store.take_result(task_id).await {
                Ok(Some(result)) => {
                    info!(
                        responder_used = %result.responder_used,
                        waited_secs = started.elapsed().as_secs(),
                        response_chars = result.response.len(),
                        "result received"
                    );
                    return Some(result.response);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "failed to read result; no progress this poll");
                }
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(timeout_secs = timeout.as_secs(), "timed out waiting for result");
                return None;
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// The underlying store, for callers that need direct access (the
    /// responder loop shares it).
    pub fn store(&self) -> &FileQueueStore {
        &self.store
    }
}
