//! File-backed queue store.
//!
//! The shared mailbox: two append/delete-only directories, `tasks/` and
//! `results/`, one JSON record per file with deterministic names derived
//! from the task identifier. The directories are the single source of
//! truth; nothing is cached across restarts. Consumption is destructive:
//! a record is read, parsed, then deleted, so it is delivered at most once
//! to the first successful caller.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, instrument, warn};

use crate::domain::models::{result_file_name, task_file_name, ExchangeResult, ExchangeTask, TaskId};
use crate::domain::ports::errors::ExchangeError;
use crate::domain::ports::transport::SyncTransport;

/// The synchronized directory pair acting as the message transport.
pub struct FileQueueStore {
    tasks_dir: PathBuf,
    results_dir: PathBuf,
    transport: Arc<dyn SyncTransport>,
}

impl FileQueueStore {
    /// Open the store rooted at `bridge_dir`, creating the `tasks/` and
    /// `results/` directories if absent.
    pub async fn open(
        bridge_dir: impl Into<PathBuf>,
        transport: Arc<dyn SyncTransport>,
    ) -> Result<Self, ExchangeError> {
        let bridge_dir = bridge_dir.into();
        let tasks_dir = bridge_dir.join("tasks");
        let results_dir = bridge_dir.join("results");

        fs::create_dir_all(&tasks_dir).await?;
        fs::create_dir_all(&results_dir).await?;

        Ok(Self {
            tasks_dir,
            results_dir,
            transport,
        })
    }

    /// Bring freshly-arrived peer records into the local directories.
    pub async fn refresh(&self) -> Result<(), ExchangeError> {
        self.transport
            .sync_inbound()
            .await
            .map_err(ExchangeError::Transport)
    }

    /// Persist a task and make it visible to the peer.
    ///
    /// A synchronization failure leaves the record local-only and is
    /// surfaced as a publish error, never swallowed.
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    pub async fn publish_task(&self, task: &ExchangeTask) -> Result<(), ExchangeError> {
        let path = self.tasks_dir.join(task.file_name());
        let body = serde_json::to_vec_pretty(task)?;
        fs::write(&path, body).await?;
        debug!(path = %path.display(), "task written");

        self.transport
            .sync_outbound(&format!("Task {}", task.id))
            .await
            .map_err(ExchangeError::Publish)
    }

    /// Persist a result and make it visible to the peer.
    #[instrument(skip(self, result), fields(task_id = %result.task_id))]
    pub async fn publish_result(&self, result: &ExchangeResult) -> Result<(), ExchangeError> {
        let path = self.results_dir.join(result.file_name());
        let body = serde_json::to_vec_pretty(result)?;
        fs::write(&path, body).await?;
        debug!(path = %path.display(), "result written");

        self.transport
            .sync_outbound(&format!("Result {}", result.task_id))
            .await
            .map_err(ExchangeError::Publish)
    }

    /// Consume the result matching `id`, if present: parse, delete,
    /// return. Returns `None` when no matching file exists.
    ///
    /// A record whose embedded identifier contradicts its file name is
    /// rejected and left in place for the operator rather than deleted.
    pub async fn take_result(&self, id: &TaskId) -> Result<Option<ExchangeResult>, ExchangeError> {
        let path = self.results_dir.join(result_file_name(id));
        let body = match fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let result: ExchangeResult = serde_json::from_slice(&body)?;
        if result.task_id != *id {
            warn!(
                path = %path.display(),
                embedded = %result.task_id,
                expected = %id,
                "result record contradicts its file name; rejecting"
            );
            return Ok(None);
        }

        fs::remove_file(&path).await?;
        Ok(Some(result))
    }

    /// All locally-visible pending tasks, oldest first. Malformed records
    /// are skipped with a warning, not fatal.
    pub async fn pending_tasks(&self) -> Result<Vec<ExchangeTask>, ExchangeError> {
        let mut tasks = Vec::new();
        let mut entries = fs::read_dir(&self.tasks_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with("task_") || !name.ends_with(".json") {
                continue;
            }

            let body = match fs::read(&path).await {
                Ok(body) => body,
                // Raced with a concurrent consumer; the record is theirs.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            match serde_json::from_slice::<ExchangeTask>(&body) {
                Ok(task) => tasks.push(task),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping malformed task record");
                }
            }
        }

        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(tasks)
    }

    /// Delete a consumed task file. Already-gone files are fine: another
    /// consumer got there first.
    pub async fn remove_task(&self, id: &TaskId) -> Result<(), ExchangeError> {
        let path = self.tasks_dir.join(task_file_name(id));
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Path of the tasks directory.
    pub fn tasks_dir(&self) -> &std::path::Path {
        &self.tasks_dir
    }

    /// Path of the results directory.
    pub fn results_dir(&self) -> &std::path::Path {
        &self.results_dir
    }
}
