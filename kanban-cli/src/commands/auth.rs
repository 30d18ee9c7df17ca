//! Authentication command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use kanban_client::KanbanClient;

use crate::config::Config;

/// Authentication subcommands
#[derive(Subcommand)]
pub enum AuthCommands {
    /// Exchange a GitHub OAuth code for an API token
    Login {
        /// Code returned by the GitHub OAuth redirect
        code: String,
    },
    /// Forget the stored API token
    Logout,
    /// Show the user the stored token belongs to
    Whoami,
}

/// Handle authentication commands
pub async fn handle_auth_command(
    command: AuthCommands,
    client: &KanbanClient,
    config: &Config,
) -> Result<()> {
    match command {
        AuthCommands::Login { code } => login(client, config, &code).await,
        AuthCommands::Logout => logout(client).await,
        AuthCommands::Whoami => whoami(client).await,
    }
}

async fn login(client: &KanbanClient, config: &Config, code: &str) -> Result<()> {
    client
        .authenticate(code)
        .await
        .context("Failed to authenticate")?;

    println!("{}", "✓ Logged in".green().bold());
    println!(
        "  Token stored in {}",
        config.token_file.display().to_string().dimmed()
    );

    Ok(())
}

async fn logout(client: &KanbanClient) -> Result<()> {
    client.logout().await.context("Failed to remove token")?;
    println!("{}", "✓ Logged out".green().bold());
    Ok(())
}

async fn whoami(client: &KanbanClient) -> Result<()> {
    match client.logged_in_user().await? {
        Some(user) => println!("Logged in as {}", user.id.bold()),
        None => println!("{}", "Not logged in.".yellow()),
    }
    Ok(())
}
