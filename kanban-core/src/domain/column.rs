//! Column domain types

use serde::{Deserialize, Serialize};

/// A board column populated by a search query against the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub index: Option<i32>,
    #[serde(default)]
    pub query: Option<String>,
}
