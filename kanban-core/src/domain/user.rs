//! User and authentication domain types

use serde::{Deserialize, Serialize};

use crate::domain::board::BoardSummary;

/// The authenticated user together with the boards they own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub boards: Vec<BoardSummary>,
}

/// Identity of the user the current token belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedInUser {
    pub id: String,
}

/// Result of exchanging an OAuth code for an API token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
}
