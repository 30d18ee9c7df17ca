//! Operation catalog
//!
//! Constructors for every operation the board client issues. Each operation
//! name is bound to exactly one document here, so equal identities always
//! select the same fields and can safely share a cache entry.
//!
//! Constructors validate caller-supplied arguments before anything reaches the
//! network.

mod board;
mod column;
mod user;

pub use board::{board, create_board, delete_board, update_board, user_boards};
pub use column::{column, create_column, update_column};
pub use user::{authenticate_user, logged_in_user};

use crate::operation::ValidationError;

/// Rejects empty or whitespace-only required arguments
pub(crate) fn require(operation: &str, argument: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingArgument {
            operation: operation.to_string(),
            argument: argument.to_string(),
        });
    }
    Ok(())
}

/// Rejects negative column positions
///
/// Positions are GraphQL `Int`s, so the upper bound comes from `i32`.
pub(crate) fn require_index(operation: &str, index: i32) -> Result<(), ValidationError> {
    if index < 0 {
        return Err(ValidationError::InvalidArgument {
            operation: operation.to_string(),
            argument: "index".to_string(),
            reason: format!("must not be negative, got {}", index),
        });
    }
    Ok(())
}
