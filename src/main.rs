//! Vigil CLI entry point.

use clap::Parser;

use vigil::cli::{Cli, Commands};
use vigil::infrastructure::config::ConfigLoader;
use vigil::infrastructure::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => vigil::cli::handle_error(err),
    };

    // Guard must outlive the command: dropping it flushes file logs.
    let _guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(err) => vigil::cli::handle_error(err),
    };

    let result = match cli.command {
        Commands::Init(args) => vigil::cli::commands::init::execute(args, config).await,
        Commands::Watch(args) => vigil::cli::commands::watch::execute(args, config).await,
        Commands::Ask(args) => vigil::cli::commands::ask::execute(args, config).await,
        Commands::Respond(args) => vigil::cli::commands::respond::execute(args, config).await,
    };

    if let Err(err) = result {
        vigil::cli::handle_error(err);
    }
}
