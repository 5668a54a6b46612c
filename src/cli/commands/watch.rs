//! Implementation of the `vigil watch` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::application::watcher::Watcher;
use crate::domain::models::Config;
use crate::domain::ports::transport::{NullTransport, SyncTransport};
use crate::infrastructure::git_transport::GitTransport;
use crate::infrastructure::queue_store::FileQueueStore;
use crate::services::builder::Rebuilder;
use crate::services::detector::IssueDetector;
use crate::services::exchange::ExchangeClient;
use crate::services::supervisor::Supervisor;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Skip git synchronization (single-machine deployments)
    #[arg(long)]
    pub no_sync: bool,
}

pub async fn execute(args: WatchArgs, config: Config) -> Result<()> {
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

    let mut watcher = Watcher::new(
        Supervisor::new(config.supervisor.clone()),
        IssueDetector::new(&config.detector),
        ExchangeClient::new(store, &config.exchange),
        Rebuilder::new(&config.builder),
        config.watcher.clone(),
        &config.exchange,
    );

    watcher.run().await.context("Watcher terminated")
}
