//! Board command handlers
//!
//! Handles listing, viewing, creating, updating and deleting boards.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use kanban_client::KanbanClient;
use kanban_core::domain::board::Board;
use kanban_core::dto::board::{CreateBoard, UpdateBoard};

/// Board subcommands
#[derive(Subcommand)]
pub enum BoardCommands {
    /// List the boards of the logged-in user
    List,
    /// Show a board and its columns
    Get {
        /// Board ID
        id: String,
    },
    /// Create a board
    Create {
        /// Board name
        #[arg(short, long)]
        name: String,

        /// GitHub repository as owner/name
        #[arg(short, long)]
        repository: String,
    },
    /// Rename a board or point it at another repository
    Update {
        /// Board ID
        id: String,

        /// New board name
        #[arg(short, long)]
        name: Option<String>,

        /// New repository
        #[arg(short, long)]
        repository: Option<String>,
    },
    /// Delete a board
    Delete {
        /// Board ID
        id: String,
    },
}

/// Handle board commands
pub async fn handle_board_command(command: BoardCommands, client: &KanbanClient) -> Result<()> {
    match command {
        BoardCommands::List => list_boards(client).await,
        BoardCommands::Get { id } => get_board(client, &id).await,
        BoardCommands::Create { name, repository } => {
            create_board(client, name, repository).await
        }
        BoardCommands::Update {
            id,
            name,
            repository,
        } => update_board(client, id, name, repository).await,
        BoardCommands::Delete { id } => delete_board(client, &id).await,
    }
}

async fn list_boards(client: &KanbanClient) -> Result<()> {
    let Some(user) = client.user_boards().await? else {
        println!("{}", "Not logged in.".yellow());
        return Ok(());
    };

    if user.boards.is_empty() {
        println!("{}", "No boards found.".yellow());
    } else {
        println!("{}", format!("Found {} board(s):", user.boards.len()).bold());
        println!();
        for board in user.boards {
            println!("  {} {} {}", "▸".cyan(), board.name.bold(), board.id.dimmed());
        }
    }

    Ok(())
}

async fn get_board(client: &KanbanClient, id: &str) -> Result<()> {
    let board = client
        .board(id)
        .await
        .with_context(|| format!("Failed to fetch board {}", id))?;

    print_board_details(&board);
    Ok(())
}

async fn create_board(client: &KanbanClient, name: String, repository: String) -> Result<()> {
    let owner = client
        .logged_in_user()
        .await?
        .context("Log in before creating boards")?;

    let board = client
        .create_board(CreateBoard {
            owner_id: owner.id,
            name,
            repository,
        })
        .await
        .context("Failed to create board")?;

    println!("{}", "✓ Board created successfully!".green().bold());
    println!();
    print_board_details(&board);
    Ok(())
}

async fn update_board(
    client: &KanbanClient,
    id: String,
    name: Option<String>,
    repository: Option<String>,
) -> Result<()> {
    if name.is_none() && repository.is_none() {
        bail!("Nothing to update: pass --name and/or --repository");
    }

    let current = client.board(&id).await?;
    let board = client
        .update_board(update_request(current, name, repository)?)
        .await
        .context("Failed to update board")?;

    println!("{}", "✓ Board updated".green().bold());
    println!();
    print_board_details(&board);
    Ok(())
}

/// Builds the update variables, filling fields not given from the current board
///
/// The mutation replaces both name and repository.
fn update_request(
    current: Board,
    name: Option<String>,
    repository: Option<String>,
) -> Result<UpdateBoard> {
    let Some(repository) = repository
        .or(current.repository)
        .filter(|r| !r.trim().is_empty())
    else {
        bail!(
            "Board {} has no repository yet: pass --repository as well",
            current.id
        );
    };

    Ok(UpdateBoard {
        id: current.id,
        name: name.unwrap_or(current.name),
        repository,
    })
}

async fn delete_board(client: &KanbanClient, id: &str) -> Result<()> {
    client
        .delete_board(id)
        .await
        .with_context(|| format!("Failed to delete board {}", id))?;

    println!("{}", format!("✓ Board {} deleted", id).green().bold());
    Ok(())
}

fn print_board_details(board: &Board) {
    println!("{}", "Board Details".bold().underline());
    println!("  ID:           {}", board.id);
    println!("  Name:         {}", board.name.bold());
    println!(
        "  Repository:   {}",
        board.repository.as_deref().unwrap_or("-").cyan()
    );
    if let Some(updated_at) = board.updated_at {
        println!(
            "  Updated:      {}",
            updated_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }

    if board.columns.is_empty() {
        println!("  Columns:      {}", "none".dimmed());
        return;
    }

    println!("  Columns:");
    let mut columns: Vec<_> = board.columns.iter().collect();
    columns.sort_by_key(|c| c.index.unwrap_or(i32::MAX));
    for column in columns {
        println!(
            "    {} {} {} {}",
            "▸".cyan(),
            column.name.bold(),
            column.query.as_deref().unwrap_or("").dimmed(),
            column.id.dimmed()
        );
    }
}
