//! Git-backed synchronization transport.
//!
//! Shells out to git in the bridge checkout: `pull` for inbound sync,
//! `add -A` + `commit` + `push` for outbound. Every command runs under a
//! bounded timeout; conflicts and unreachable remotes surface as
//! transport errors, which the store maps to publish failures.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::ports::errors::TransportError;
use crate::domain::ports::transport::SyncTransport;

/// Transport synchronizing the bridge checkout with its git remote.
pub struct GitTransport {
    repo_dir: PathBuf,
    command_timeout: Duration,
}

impl GitTransport {
    /// Create a transport operating on the checkout at `repo_dir`.
    pub fn new(repo_dir: impl Into<PathBuf>, timeout_secs: u64) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            command_timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn run_git(&self, args: &[&str]) -> Result<std::process::Output, TransportError> {
        let command = format!("git {}", args.join(" "));
        debug!(command = %command, dir = %self.repo_dir.display(), "running git");

        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out command must not linger
            .kill_on_drop(true);

        let child = cmd.spawn()?;
        let output = timeout(self.command_timeout, child.wait_with_output())
            .await
            .map_err(|_| TransportError::Timeout {
                command: command.clone(),
                secs: self.command_timeout.as_secs(),
            })??;

        if !output.status.success() {
            // git writes some diagnostics (e.g. "nothing to commit") to
            // stdout; fall back to it when stderr is empty.
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(TransportError::CommandFailed {
                command,
                code: output.status.code(),
                stderr: detail,
            });
        }

        Ok(output)
    }

    /// Whether the checkout at `dir` is inside a git work tree.
    pub async fn is_git_repo(dir: &Path) -> bool {
        Command::new("git")
            .args(["rev-parse", "--is-inside-work-tree"])
            .current_dir(dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl SyncTransport for GitTransport {
    async fn sync_inbound(&self) -> Result<(), TransportError> {
        self.run_git(&["pull"]).await?;
        Ok(())
    }

    async fn sync_outbound(&self, message: &str) -> Result<(), TransportError> {
        self.run_git(&["add", "-A"]).await?;

        // Committing with a clean index is not a publish failure: the
        // record may already be committed from a prior interrupted push.
        match self.run_git(&["commit", "-m", message]).await {
            Ok(_) => {}
            Err(TransportError::CommandFailed { ref stderr, .. })
                if is_nothing_to_commit(stderr) =>
            {
                warn!("nothing to commit; pushing existing state");
            }
            Err(e) => return Err(e),
        }

        self.run_git(&["push"]).await?;
        Ok(())
    }
}

fn is_nothing_to_commit(output: &str) -> bool {
    output.contains("nothing to commit") || output.contains("nothing added to commit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_to_commit_detection() {
        assert!(is_nothing_to_commit(
            "On branch main\nnothing to commit, working tree clean"
        ));
        assert!(!is_nothing_to_commit("error: failed to push some refs"));
    }

    #[tokio::test]
    async fn test_is_git_repo_on_plain_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!GitTransport::is_git_repo(dir.path()).await);
    }

    #[tokio::test]
    async fn test_pull_fails_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        let transport = GitTransport::new(dir.path(), 5);
        assert!(transport.sync_inbound().await.is_err());
    }
}
