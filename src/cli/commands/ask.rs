//! Implementation of the `vigil ask` command.
//!
//! One-shot exchange round trip: submit a prompt, wait for the response,
//! print it. Doubles as the bridge self-test.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;

use crate::domain::models::Config;
use crate::domain::ports::transport::{NullTransport, SyncTransport};
use crate::infrastructure::git_transport::GitTransport;
use crate::infrastructure::queue_store::FileQueueStore;
use crate::services::exchange::ExchangeClient;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Target responder tag
    #[arg(long, default_value = "claude")]
    pub responder: String,

    /// Seconds to wait for a response (defaults to the configured
    /// escalation timeout)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Skip git synchronization (single-machine deployments)
    #[arg(long)]
    pub no_sync: bool,

    /// Prompt text to send
    pub prompt: String,
}

pub async fn execute(args: AskArgs, config: Config) -> Result<()> {
    let transport: Arc<dyn SyncTransport> = if args.no_sync {
        Arc::new(NullTransport)
    } else {
        Arc::new(GitTransport::new(
            &config.exchange.bridge_dir,
            config.exchange.sync_timeout_secs,
        ))
    };

    let store = FileQueueStore::open(&config.exchange.bridge_dir, transport)
        .await
        .context("Failed to open the queue store")?;
    let client = ExchangeClient::new(store, &config.exchange);

    let task_id = client
        .submit(&args.responder, &args.prompt)
        .await
        .context("Failed to publish the task")?;
    println!(
        "{} task {} sent to {}",
        style("→").cyan().bold(),
        style(&task_id).bold(),
        args.responder
    );

    let timeout =
        Duration::from_secs(args.timeout.unwrap_or(config.exchange.escalation_timeout_secs));
    match client.await_result(&task_id, timeout).await {
        Some(response) => {
            println!("{} response received:\n", style("✓").green().bold());
            println!("{response}");
            Ok(())
        }
        None => bail!(
            "no response for task {} within {}s",
            task_id,
            timeout.as_secs()
        ),
    }
}
