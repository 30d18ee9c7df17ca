//! Column command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use kanban_client::KanbanClient;
use kanban_core::domain::column::Column;
use kanban_core::dto::column::{CreateColumn, UpdateColumn};

/// Column subcommands
#[derive(Subcommand)]
pub enum ColumnCommands {
    /// Show a column
    Get {
        /// Column ID
        id: String,
    },
    /// Add a column to a board
    Create {
        /// Board the column belongs to
        #[arg(short, long)]
        board: String,

        /// Column name
        #[arg(short, long)]
        name: String,

        /// Position within the board
        #[arg(short, long, default_value = "0")]
        index: i32,

        /// Issue search query populating the column
        #[arg(short, long)]
        query: String,
    },
    /// Replace a column's name, position and query
    Update {
        /// Column ID
        id: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        index: i32,

        #[arg(short, long)]
        query: String,
    },
}

/// Handle column commands
pub async fn handle_column_command(command: ColumnCommands, client: &KanbanClient) -> Result<()> {
    match command {
        ColumnCommands::Get { id } => {
            let column = client
                .column(&id)
                .await
                .with_context(|| format!("Failed to fetch column {}", id))?;
            print_column(&column);
        }
        ColumnCommands::Create {
            board,
            name,
            index,
            query,
        } => {
            let column = client
                .create_column(CreateColumn {
                    board_id: board,
                    name,
                    index,
                    query,
                })
                .await
                .context("Failed to create column")?;
            println!("{}", "✓ Column created".green().bold());
            print_column(&column);
        }
        ColumnCommands::Update {
            id,
            name,
            index,
            query,
        } => {
            let column = client
                .update_column(UpdateColumn {
                    id,
                    name,
                    index,
                    query,
                })
                .await
                .context("Failed to update column")?;
            println!("{}", "✓ Column updated".green().bold());
            print_column(&column);
        }
    }

    Ok(())
}

fn print_column(column: &Column) {
    println!("  ID:      {}", column.id);
    println!("  Name:    {}", column.name.bold());
    if let Some(index) = column.index {
        println!("  Index:   {}", index);
    }
    println!(
        "  Query:   {}",
        column.query.as_deref().unwrap_or("-").cyan()
    );
}
