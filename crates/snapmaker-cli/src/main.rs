//! Snapmaker CLI - command-line interface for Snapmaker devices.
//!
//! Discovers devices, pairs with them and polls their status from scripts or
//! a terminal.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use commands::CommandContext;
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = CommandContext::new(cli.json, cli.timeout, cli.data_dir)?;

    match cli.command {
        Commands::Discover => commands::run_discover(&ctx).await,
        Commands::Status(args) => commands::run_status(&ctx, args).await,
        Commands::Watch(args) => commands::run_watch(&ctx, args).await,
        Commands::Pair(args) => commands::run_pair(&ctx, args).await,
        Commands::Forget(args) => commands::run_forget(&ctx, args).await,
        Commands::List => commands::run_list(&ctx).await,
    }
}
