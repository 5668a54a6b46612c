//! Rebuilder.
//!
//! After a responder delivers a fix, the watcher pulls the supervised
//! executable's source checkout and rebuilds it. Both steps run under
//! bounded timeouts; "already up to date" is a distinct outcome because
//! the watcher treats it as non-fatal.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::domain::models::BuilderConfig;
use crate::domain::ports::errors::BuildError;

/// Outcome of a pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// New commits arrived.
    Updated,
    /// Nothing to pull; the responder may not have pushed yet.
    AlreadyUpToDate,
}

/// Pull-and-rebuild service for the supervised executable's source tree.
pub struct Rebuilder {
    source_dir: PathBuf,
    build_command: String,
    build_args: Vec<String>,
    pull_timeout: Duration,
    build_timeout: Duration,
}

impl Rebuilder {
    /// Create a rebuilder for the configured source checkout.
    pub fn new(config: &BuilderConfig) -> Self {
        Self {
            source_dir: PathBuf::from(&config.source_dir),
            build_command: config.build_command.clone(),
            build_args: config.build_args.clone(),
            pull_timeout: Duration::from_secs(config.pull_timeout_secs),
            build_timeout: Duration::from_secs(config.build_timeout_secs),
        }
    }

    /// Pull the latest source.
    #[instrument(skip(self))]
    pub async fn pull_latest(&self) -> Result<PullOutcome, BuildError> {
        let mut cmd = Command::new("git");
        cmd.arg("pull")
            .current_dir(&self.source_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn()?;
        let output = timeout(self.pull_timeout, child.wait_with_output())
            .await
            .map_err(|_| BuildError::Timeout(self.pull_timeout.as_secs()))??;

        if !output.status.success() {
            return Err(BuildError::Pull(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.contains("Already up to date") {
            info!("no new code to pull");
            Ok(PullOutcome::AlreadyUpToDate)
        } else {
            info!("pulled new code");
            Ok(PullOutcome::Updated)
        }
    }

    /// Run the configured build command.
    #[instrument(skip(self))]
    pub async fn rebuild(&self) -> Result<(), BuildError> {
        info!(
            command = %self.build_command,
            args = ?self.build_args,
            "rebuilding supervised executable"
        );

        let mut cmd = Command::new(&self.build_command);
        cmd.args(&self.build_args)
            .current_dir(&self.source_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn()?;
        let output = timeout(self.build_timeout, child.wait_with_output())
            .await
            .map_err(|_| BuildError::Timeout(self.build_timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(code = ?output.status.code(), "build failed");
            return Err(BuildError::Build(tail(stderr.trim(), 500).to_string()));
        }

        info!("build succeeded");
        Ok(())
    }
}

/// Last `n` bytes of `s`, on a char boundary.
fn tail(s: &str, n: usize) -> &str {
    if s.len() <= n {
        return s;
    }
    let mut start = s.len() - n;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebuilder_in(dir: &std::path::Path, command: &str, args: &[&str]) -> Rebuilder {
        Rebuilder::new(&BuilderConfig {
            source_dir: dir.display().to_string(),
            build_command: command.to_string(),
            build_args: args.iter().map(ToString::to_string).collect(),
            pull_timeout_secs: 5,
            build_timeout_secs: 5,
        })
    }

    #[test]
    fn test_tail() {
        assert_eq!(tail("short", 500), "short");
        let long = "x".repeat(600);
        assert_eq!(tail(&long, 500).len(), 500);
        // Never splits a multi-byte char
        let uni = format!("{}é", "x".repeat(500));
        assert!(tail(&uni, 2).chars().all(|c| c == 'é' || c == 'x'));
    }

    #[tokio::test]
    async fn test_rebuild_success() {
        let dir = tempfile::tempdir().unwrap();
        let rebuilder = rebuilder_in(dir.path(), "true", &[]);
        assert!(rebuilder.rebuild().await.is_ok());
    }

    #[tokio::test]
    async fn test_rebuild_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let rebuilder = rebuilder_in(dir.path(), "sh", &["-c", "echo broken >&2; exit 1"]);

        match rebuilder.rebuild().await {
            Err(BuildError::Build(msg)) => assert!(msg.contains("broken")),
            other => panic!("expected Build error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pull_fails_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        let rebuilder = rebuilder_in(dir.path(), "true", &[]);
        assert!(matches!(
            rebuilder.pull_latest().await,
            Err(BuildError::Pull(_))
        ));
    }
}
