//! Column mutation DTOs

use serde::{Deserialize, Serialize};

/// Variables for adding a column to a board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumn {
    pub board_id: String,
    pub name: String,
    pub index: i32,
    pub query: String,
}

/// Variables for editing an existing column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateColumn {
    pub id: String,
    pub name: String,
    pub index: i32,
    pub query: String,
}
