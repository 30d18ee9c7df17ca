//! Board operations

use crate::dto::board::{CreateBoard, UpdateBoard};
use crate::operation::{Operation, ValidationError};
use crate::operations::require;

const USER_BOARDS: &str = r#"query UserBoards {
  user {
    id
    boards(orderBy: updatedAt_DESC) {
      id
      name
    }
  }
}"#;

const BOARD: &str = r#"query Board($id: ID!) {
  Board(id: $id) {
    id
    name
    repository
    createdAt
    updatedAt
    columns(orderBy: updatedAt_DESC) {
      id
      name
      index
      query
    }
  }
}"#;

const CREATE_BOARD: &str = r#"mutation CreateBoard($ownerId: ID!, $name: String!, $repository: String!) {
  createBoard(ownerId: $ownerId, name: $name, repository: $repository) {
    id
    name
    repository
  }
}"#;

const UPDATE_BOARD: &str = r#"mutation UpdateBoard($id: ID!, $name: String!, $repository: String!) {
  updateBoard(id: $id, name: $name, repository: $repository) {
    id
    name
    repository
  }
}"#;

const DELETE_BOARD: &str = r#"mutation DeleteBoard($id: ID!) {
  deleteBoard(id: $id) {
    id
  }
}"#;

/// Boards owned by the authenticated user, most recently updated first
pub fn user_boards() -> Operation {
    Operation::query("UserBoards", USER_BOARDS)
}

/// A single board with its columns
pub fn board(id: &str) -> Result<Operation, ValidationError> {
    require("Board", "id", id)?;
    Ok(Operation::query("Board", BOARD).with_variable("id", id))
}

pub fn create_board(req: &CreateBoard) -> Result<Operation, ValidationError> {
    require("CreateBoard", "ownerId", &req.owner_id)?;
    require("CreateBoard", "name", &req.name)?;
    require("CreateBoard", "repository", &req.repository)?;
    Operation::mutation("CreateBoard", CREATE_BOARD).with_variables(req)
}

pub fn update_board(req: &UpdateBoard) -> Result<Operation, ValidationError> {
    require("UpdateBoard", "id", &req.id)?;
    require("UpdateBoard", "name", &req.name)?;
    require("UpdateBoard", "repository", &req.repository)?;
    Operation::mutation("UpdateBoard", UPDATE_BOARD).with_variables(req)
}

pub fn delete_board(id: &str) -> Result<Operation, ValidationError> {
    require("DeleteBoard", "id", id)?;
    Ok(Operation::mutation("DeleteBoard", DELETE_BOARD).with_variable("id", id))
}
