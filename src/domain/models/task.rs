//! Exchange record domain models.
//!
//! Tasks are units of work published into the shared queue store for a
//! remote responder; results are the matching fulfillment records. Both
//! are serialized one-record-per-file in the mailbox directories.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Short unique token identifying a task for the lifetime of the queue.
///
/// Eight hex characters of a UUIDv4, so collisions are negligible by
/// construction. A result is only ever matched to the task with the
/// identical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..8].to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 64 {
            return Err(format!("invalid task id length: {}", s.len()));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(format!("invalid task id: {s}"));
        }
        Ok(Self(s.to_string()))
    }
}

/// A unit of work published by the watcher for remote fulfillment.
///
/// Immutable once published. Created by the exchange client; deleted by
/// the responder upon consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeTask {
    /// Unique identifier, also encoded in the mailbox file name.
    pub id: TaskId,
    /// Target responder tag. Free-form: routing is by convention, not
    /// validated against a fixed set.
    #[serde(rename = "ai")]
    pub responder: String,
    /// Prompt text, unbounded.
    pub prompt: String,
    /// Creation timestamp, ISO-8601 on the wire.
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ExchangeTask {
    /// Create a new task addressed to `responder`.
    pub fn new(responder: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: TaskId::generate(),
            responder: responder.into(),
            prompt: prompt.into(),
            created_at: Utc::now(),
        }
    }

    /// Mailbox file name for this task.
    pub fn file_name(&self) -> String {
        task_file_name(&self.id)
    }

    /// Validate the record before publication.
    pub fn validate(&self) -> Result<(), String> {
        if self.responder.trim().is_empty() {
            return Err("task responder tag cannot be empty".to_string());
        }
        if self.prompt.trim().is_empty() {
            return Err("task prompt cannot be empty".to_string());
        }
        Ok(())
    }
}

/// The fulfillment record matching a task by identifier.
///
/// Created by the responder; consumed and deleted by the exchange client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResult {
    /// Identifier of the task this result answers.
    pub task_id: TaskId,
    /// Response text produced by the responder backend.
    pub response: String,
    /// Which backend actually produced the response.
    #[serde(rename = "ai_used")]
    pub responder_used: String,
}

impl ExchangeResult {
    /// Create a result answering `task_id`.
    pub fn new(
        task_id: TaskId,
        response: impl Into<String>,
        responder_used: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            response: response.into(),
            responder_used: responder_used.into(),
        }
    }

    /// Mailbox file name for this result.
    pub fn file_name(&self) -> String {
        result_file_name(&self.task_id)
    }
}

/// Deterministic task file name for an identifier.
pub fn task_file_name(id: &TaskId) -> String {
    format!("task_{id}.json")
}

/// Deterministic result file name for an identifier.
pub fn result_file_name(id: &TaskId) -> String {
    format!("result_{id}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_generation() {
        let id = TaskId::generate();
        assert_eq!(id.as_str().len(), 8);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));

        // Two generated ids should differ
        assert_ne!(TaskId::generate(), TaskId::generate());
    }

    #[test]
    fn test_task_id_parsing() {
        assert!("abc123".parse::<TaskId>().is_ok());
        assert!("a-b_c".parse::<TaskId>().is_ok());
        assert!("".parse::<TaskId>().is_err());
        assert!("has space".parse::<TaskId>().is_err());
        assert!("dot.dot".parse::<TaskId>().is_err());
    }

    #[test]
    fn test_task_wire_format() {
        let task = ExchangeTask::new("gemini_1", "fix X");
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["ai"], "gemini_1");
        assert_eq!(json["prompt"], "fix X");
        assert!(json["id"].is_string());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_result_wire_format() {
        let id: TaskId = "abc123".parse().unwrap();
        let result = ExchangeResult::new(id, "patched", "gemini_1");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["task_id"], "abc123");
        assert_eq!(json["response"], "patched");
        assert_eq!(json["ai_used"], "gemini_1");
    }

    #[test]
    fn test_file_names() {
        let id: TaskId = "abc123".parse().unwrap();
        assert_eq!(task_file_name(&id), "task_abc123.json");
        assert_eq!(result_file_name(&id), "result_abc123.json");

        let task = ExchangeTask::new("claude", "hello");
        assert_eq!(task.file_name(), format!("task_{}.json", task.id));
    }

    #[test]
    fn test_task_validation() {
        assert!(ExchangeTask::new("claude", "prompt").validate().is_ok());
        assert!(ExchangeTask::new("", "prompt").validate().is_err());
        assert!(ExchangeTask::new("claude", "   ").validate().is_err());
    }
}
