//! Response-producing port of the responder.
//!
//! How a response is produced is opaque to the exchange: the original
//! deployment routed prompts to hosted AI assistants, the test loop
//! echoed them back. The responder only requires text out for a task in.

use async_trait::async_trait;

use crate::domain::models::ExchangeTask;

/// Port turning a consumed task into response text.
#[async_trait]
pub trait Fulfiller: Send + Sync {
    /// Tag recorded in the result as the backend that answered.
    fn name(&self) -> &str;

    /// Produce a response for the task. Errors are per-task: the
    /// responder logs them and moves on.
    async fn fulfill(&self, task: &ExchangeTask) -> anyhow::Result<String>;
}
