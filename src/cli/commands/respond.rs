//! Implementation of the `vigil respond` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use tracing::info;

use crate::domain::models::Config;
use crate::domain::ports::transport::{NullTransport, SyncTransport};
use crate::infrastructure::git_transport::GitTransport;
use crate::infrastructure::queue_store::FileQueueStore;
use crate::services::responder::{EchoFulfiller, Responder};

#[derive(Args, Debug)]
pub struct RespondArgs {
    /// Skip git synchronization (single-machine deployments)
    #[arg(long)]
    pub no_sync: bool,
}

pub async fn execute(args: RespondArgs, config: Config) -> Result<()> {
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
    let responder = Responder::new(store, Arc::new(EchoFulfiller), &config.exchange);

    println!(
        "{} responder polling {} (ctrl-c to stop)",
        style("▸").cyan().bold(),
        config.exchange.bridge_dir
    );

    tokio::select! {
        () = responder.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received; responder stopping");
        }
    }
    Ok(())
}
