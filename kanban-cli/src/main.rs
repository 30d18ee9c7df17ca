//! Kanban CLI
//!
//! Command-line interface for the kanban board API.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kanban")]
#[command(about = "Kanban board CLI", long_about = None)]
struct Cli {
    /// GraphQL endpoint URL
    #[arg(
        long,
        env = "KANBAN_ENDPOINT",
        default_value = "http://localhost:60000/graphql"
    )]
    endpoint: String,

    /// File holding the API token (defaults to the user config directory)
    #[arg(long, env = "KANBAN_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kanban_cli=info,kanban_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let token_file = match cli.token_file {
        Some(path) => path,
        None => Config::default_token_file()?,
    };
    let config = Config {
        endpoint: cli.endpoint,
        token_file,
    };
    config.validate()?;
    debug!(endpoint = %config.endpoint, token_file = %config.token_file.display(), "Loaded configuration");

    handle_command(cli.command, &config).await
}
