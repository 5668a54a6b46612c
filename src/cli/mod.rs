//! Command-line interface.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

pub use commands::ask::AskArgs;
pub use commands::init::InitArgs;
pub use commands::respond::RespondArgs;
pub use commands::watch::WatchArgs;

/// Autonomous process supervisor with git-bridged AI escalation.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about)]
pub struct Cli {
    /// Path to a configuration file (defaults to .vigil/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default configuration and create local directories
    Init(InitArgs),
    /// Run the orchestration loop
    Watch(WatchArgs),
    /// Submit a single task and wait for the response
    Ask(AskArgs),
    /// Run the responder loop
    Respond(RespondArgs),
}

/// Print a command error and exit non-zero.
pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {err:#}", style("error:").red().bold());
    std::process::exit(1);
}
