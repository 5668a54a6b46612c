//! Issue classification model.
//!
//! An issue is a transient, in-memory record of a supervised-process
//! failure. It exists for the duration of one watcher tick and is never
//! persisted.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Failure category. Ordering matters to the detector: crash detection
/// runs before stuck detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The supervised process is no longer running.
    Crash,
    /// The process is alive but its auxiliary output has not changed
    /// past the stuck threshold.
    Stuck,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crash => "crash",
            Self::Stuck => "stuck",
        }
    }
}

/// A classified failure of the supervised process, with kind-specific
/// context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// Process terminated unexpectedly.
    Crash {
        /// Seconds the process had been running when the crash was seen.
        uptime_secs: u64,
    },
    /// Process alive but apparently making no progress.
    Stuck {
        /// The screenshot that has not changed past the threshold.
        screenshot: PathBuf,
    },
}

impl Issue {
    /// The failure category of this issue.
    pub fn kind(&self) -> IssueKind {
        match self {
            Self::Crash { .. } => IssueKind::Crash,
            Self::Stuck { .. } => IssueKind::Stuck,
        }
    }

    /// Human-readable description for logs and escalation prompts.
    pub fn description(&self) -> String {
        match self {
            Self::Crash { uptime_secs } => format!(
                "supervised process terminated unexpectedly after {uptime_secs}s"
            ),
            Self::Stuck { screenshot } => format!(
                "process appears stuck (unchanged screenshot: {})",
                screenshot.display()
            ),
        }
    }
}
