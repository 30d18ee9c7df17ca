//! Board mutation DTOs

use serde::{Deserialize, Serialize};

/// Variables for creating a board owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoard {
    pub owner_id: String,
    pub name: String,
    pub repository: String,
}

/// Variables for renaming a board or pointing it at another repository
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoard {
    pub id: String,
    pub name: String,
    pub repository: String,
}
