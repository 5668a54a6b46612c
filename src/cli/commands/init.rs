//! Implementation of the `vigil init` command.

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;
use std::path::Path;

use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,
}

pub async fn execute(args: InitArgs, config: Config) -> Result<()> {
    let config_path = Path::new(".vigil/config.yaml");
    if config_path.exists() && !args.force {
        bail!(
            "{} already exists; use --force to overwrite",
            config_path.display()
        );
    }

    tokio::fs::create_dir_all(".vigil")
        .await
        .context("Failed to create .vigil directory")?;

    let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
    tokio::fs::write(config_path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} wrote {}",
        style("✓").green().bold(),
        config_path.display()
    );

    // Mailbox and screenshot directories, so the first watch/respond run
    // finds them in place.
    for dir in [
        format!("{}/tasks", config.exchange.bridge_dir),
        format!("{}/results", config.exchange.bridge_dir),
        config.detector.screenshot_dir.clone(),
    ] {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {dir}"))?;
        println!("{} created {dir}", style("✓").green().bold());
    }

    Ok(())
}
