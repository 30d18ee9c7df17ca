//! Column operations

use kanban_core::domain::column::Column;
use kanban_core::dto::column::{CreateColumn, UpdateColumn};
use kanban_core::operations;

use crate::KanbanClient;
use crate::error::Result;
use crate::mutation::Patch;
use crate::patch::{append_at, merge_at};
use crate::query::FetchPolicy;

impl KanbanClient {
    /// Get a column by ID
    pub async fn column(&self, id: &str) -> Result<Column> {
        let data = self
            .query(operations::column(id)?, FetchPolicy::CacheFirst)
            .await?;

        Self::decode(data, "Column")
    }

    /// Add a column to a board
    ///
    /// The new column is appended to the cached board's columns.
    pub async fn create_column(&self, req: CreateColumn) -> Result<Column> {
        let operation = operations::create_column(&req)?;
        let patches = vec![Patch::with_result(
            operations::board(&req.board_id)?.identity(),
            |current, result| append_at(current, &["Board", "columns"], result["createColumn"].clone()),
        )];

        let data = self.mutate(&operation, patches).await?;
        Self::decode(data, "createColumn")
    }

    /// Update a column's name, position and query
    pub async fn update_column(&self, req: UpdateColumn) -> Result<Column> {
        let operation = operations::update_column(&req)?;
        let patches = vec![Patch::with_result(
            operations::column(&req.id)?.identity(),
            |current, result| merge_at(current, &["Column"], &result["updateColumn"]),
        )];

        let data = self.mutate(&operation, patches).await?;
        Self::decode(data, "updateColumn")
    }
}
