//! Responder loop.
//!
//! The fulfiller half of the exchange protocol, normally running on a
//! different machine than the watcher: poll the store, consume tasks,
//! produce matching results. How a response is computed lives behind the
//! `Fulfiller` port; the default echoes the prompt back, which is enough
//! to exercise the bridge end to end.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::domain::models::{ExchangeConfig, ExchangeResult, ExchangeTask};
use crate::domain::ports::fulfiller::Fulfiller;
use crate::infrastructure::queue_store::FileQueueStore;

/// Fulfiller that echoes the prompt back, for bridge self-tests.
pub struct EchoFulfiller;

#[async_trait]
impl Fulfiller for EchoFulfiller {
    fn name(&self) -> &str {
        "echo"
    }

    async fn fulfill(&self, task: &ExchangeTask) -> anyhow::Result<String> {
        Ok(format!("RECEIVED: {}", task.prompt))
    }
}

/// Polling loop turning pending tasks into results.
pub struct Responder {
    store: FileQueueStore,
    fulfiller: Arc<dyn Fulfiller>,
    poll_interval: Duration,
}

impl Responder {
    /// Create a responder over an opened store.
    pub fn new(store: FileQueueStore, fulfiller: Arc<dyn Fulfiller>, config: &ExchangeConfig) -> Self {
        Self {
            store,
            fulfiller,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Run until cancelled by the caller.
    pub async fn run(&self) {
        info!(
            fulfiller = %self.fulfiller.name(),
            poll_ms = self.poll_interval.as_millis() as u64,
            "responder started"
        );
        loop {
            self.poll_once().await;
            sleep(self.poll_interval).await;
        }
    }

    /// One pass: sync inbound, consume every pending task, publish the
    /// matching results. Returns the number of tasks fulfilled. Per-task
    /// failures are logged and skipped; they never kill the loop.
    #[instrument(skip(self))]
    pub async fn poll_once(&self) -> usize {
        if let Err(e) = self.store.refresh().await {
            warn!(error = %e, "inbound sync failed; no progress this poll");
            return 0;
        }

        let tasks = match self.store.pending_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "cannot list pending tasks");
                return 0;
            }
        };

        let mut fulfilled = 0;
        for task in tasks {
            if self.process(&task).await {
                fulfilled += 1;
            }
        }
        fulfilled
    }

    async fn process(&self, task: &ExchangeTask) -> bool {
        info!(task_id = %task.id, responder = %task.responder, "processing task");

        let response = match self.fulfiller.fulfill(task).await {
            Ok(response) => response,
            Err(e) => {
                // Consume anyway: a poisoned task must not be retried
                // forever; the requester will time out and escalate to a
                // human.
                error!(task_id = %task.id, error = %e, "fulfiller failed; dropping task");
                if let Err(e) = self.store.remove_task(&task.id).await {
                    warn!(task_id = %task.id, error = %e, "failed to remove task");
                }
                return false;
            }
        };

        // Remove before publishing so one outbound commit carries both
        // the task deletion and the new result.
        if let Err(e) = self.store.remove_task(&task.id).await {
            warn!(task_id = %task.id, error = %e, "failed to remove consumed task");
        }

        let result = ExchangeResult::new(task.id.clone(), response, self.fulfiller.name());
        if let Err(e) = self.store.publish_result(&result).await {
            // Local-only for now; the next outbound sync pushes it.
            warn!(task_id = %task.id, error = %e, "failed to publish result");
            return false;
        }

        info!(task_id = %task.id, "task fulfilled");
        true
    }
}
