//! Error taxonomy shared across ports and services.

use thiserror::Error;

/// Synchronization transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{command} exited with {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{command} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Task exchange errors
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// A queue write did not propagate to the peer. The record is
    /// local-only; the task is effectively lost unless resubmitted.
    #[error("failed to publish to the queue store: {0}")]
    Publish(#[source] TransportError),

    #[error("inbound synchronization failed: {0}")]
    Transport(#[source] TransportError),

    #[error("invalid exchange record: {0}")]
    Invalid(String),

    #[error("malformed queue record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("queue store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Process supervision errors
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The required local proxy is not accepting connections. Launch is
    /// aborted; the caller may retry later.
    #[error("dependency not reachable at {host}:{port}")]
    DependencyUnavailable { host: String, port: u16 },

    #[error("failed to launch supervised process: {0}")]
    Launch(#[source] std::io::Error),

    #[error("process I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rebuild errors
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("git pull failed: {0}")]
    Pull(String),

    #[error("build failed: {0}")]
    Build(String),

    #[error("build step timed out after {0}s")]
    Timeout(u64),

    #[error("build I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal conditions of the orchestration loop
#[derive(Debug, Error)]
pub enum WatcherError {
    /// The escalation path is exhausted: no responder produced a fix.
    /// Requires human intervention.
    #[error("no fix received from responder")]
    NoFixReceived,

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}
