//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod auth;
mod board;
mod column;

pub use auth::AuthCommands;
pub use board::BoardCommands;
pub use column::ColumnCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Auth(AuthCommands),
    /// Board management
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    /// Column management
    Column {
        #[command(subcommand)]
        command: ColumnCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        Commands::Auth(command) => auth::handle_auth_command(command, &client, config).await,
        Commands::Board { command } => board::handle_board_command(command, &client).await,
        Commands::Column { command } => column::handle_column_command(command, &client).await,
    }
}
