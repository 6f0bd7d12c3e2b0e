//! Bugsmith - repository acquisition cache
//!
//! CLI entry point that dispatches to subcommands.

use bugsmith::cli::{Cli, Commands};
use bugsmith::config::ConfigManager;
use bugsmith::error::BugsmithResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> BugsmithResult<()> {
    let cli = Cli::parse();

    // Completions need neither config nor logging
    if let Commands::Completions(args) = cli.command {
        return bugsmith::cli::commands::completions(args);
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await;

    // RUST_LOG wins; otherwise 0 = warn, 1 = info, 2+ = debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("bugsmith=warn"),
        1 => EnvFilter::new("bugsmith=info"),
        _ => EnvFilter::new("bugsmith=debug"),
    });
    let json_logs = matches!(&config, Ok(c) if c.general.log_format == "json");
    if json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }

    let config = config?;
    debug!("Loaded configuration from {}", config_manager.path().display());

    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Acquire(args) => bugsmith::cli::commands::acquire(args, &config).await,
        Commands::Env(args) => bugsmith::cli::commands::env(args, &config).await,
        Commands::Path(args) => bugsmith::cli::commands::path(args, &config).await,
        Commands::Config(args) => bugsmith::cli::commands::config(args, &config, &config_manager).await,
    }
}
