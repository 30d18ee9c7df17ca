//! Column operations

use crate::dto::column::{CreateColumn, UpdateColumn};
use crate::operation::{Operation, ValidationError};
use crate::operations::{require, require_index};

const COLUMN: &str = r#"query Column($id: ID!) {
  Column(id: $id) {
    id
    name
    index
    query
  }
}"#;

const CREATE_COLUMN: &str = r#"mutation CreateColumn($boardId: ID!, $name: String!, $index: Int!, $query: String!) {
  createColumn(boardId: $boardId, name: $name, index: $index, query: $query) {
    id
    name
    index
    query
  }
}"#;

const UPDATE_COLUMN: &str = r#"mutation UpdateColumn($id: ID!, $name: String!, $index: Int!, $query: String!) {
  updateColumn(id: $id, name: $name, index: $index, query: $query) {
    id
    name
    index
    query
  }
}"#;

pub fn column(id: &str) -> Result<Operation, ValidationError> {
    require("Column", "id", id)?;
    Ok(Operation::query("Column", COLUMN).with_variable("id", id))
}

pub fn create_column(req: &CreateColumn) -> Result<Operation, ValidationError> {
    require("CreateColumn", "boardId", &req.board_id)?;
    require("CreateColumn", "name", &req.name)?;
    require_index("CreateColumn", req.index)?;
    Operation::mutation("CreateColumn", CREATE_COLUMN).with_variables(req)
}

pub fn update_column(req: &UpdateColumn) -> Result<Operation, ValidationError> {
    require("UpdateColumn", "id", &req.id)?;
    require("UpdateColumn", "name", &req.name)?;
    require_index("UpdateColumn", req.index)?;
    Operation::mutation("UpdateColumn", UPDATE_COLUMN).with_variables(req)
}
