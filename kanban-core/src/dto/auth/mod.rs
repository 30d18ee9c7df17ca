//! Authentication DTOs

use serde::{Deserialize, Serialize};

/// Variables for exchanging a GitHub OAuth code for an API token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateUser {
    pub github_code: String,
}
