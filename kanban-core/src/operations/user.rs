//! User and authentication operations

use crate::dto::auth::AuthenticateUser;
use crate::operation::{Operation, ValidationError};
use crate::operations::require;

const LOGGED_IN_USER: &str = r#"query LoggedInUser {
  loggedInUser {
    id
  }
}"#;

const AUTHENTICATE_USER: &str = r#"mutation AuthenticateUser($githubCode: String!) {
  authenticateUser(githubCode: $githubCode) {
    token
  }
}"#;

/// The user the current token belongs to, if any
pub fn logged_in_user() -> Operation {
    Operation::query("LoggedInUser", LOGGED_IN_USER)
}

/// Exchanges a GitHub OAuth code for an API token
pub fn authenticate_user(github_code: &str) -> Result<Operation, ValidationError> {
    require("AuthenticateUser", "githubCode", github_code)?;
    Operation::mutation("AuthenticateUser", AUTHENTICATE_USER).with_variables(&AuthenticateUser {
        github_code: github_code.to_string(),
    })
}
