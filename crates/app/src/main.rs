//! GymTrack - Command-line entry point
//!
//! Parses the command line, initializes logging, wires the adapters,
//! and prints the result as JSON.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, commands::CliError> {
    let config = cli.config()?;
    tracing::debug!(base_url = %config.base_url, data_dir = %config.data_dir.display(), "configuration loaded");

    let session = commands::connect(&config)?;
    commands::execute(&session, cli.command).await
}
