//! Error types for the kanban client

use kanban_core::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the kanban client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Endpoint returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body returned by the endpoint
        message: String,
    },

    /// Endpoint answered with a GraphQL `errors` list
    #[error("GraphQL error: {}", join_messages(.0))]
    GraphQl(Vec<GraphQlError>),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Cache entry missing or not resolved
    #[error("Cache entry not found: {0}")]
    NotFound(String),

    /// Caller supplied malformed operation arguments
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// Token store could not be read or written
    #[error("Token store error: {0}")]
    Token(String),

    /// Failure recorded in the cache and shared by every observer of the entry
    #[error(transparent)]
    Shared(Arc<ClientError>),
}

/// One entry of a GraphQL `errors` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<serde_json::Value>>,
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// The underlying error, looking through [`ClientError::Shared`]
    pub fn root(&self) -> &ClientError {
        match self {
            Self::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// Check if this error came from the network exchange with the endpoint
    pub fn is_transport(&self) -> bool {
        matches!(
            self.root(),
            Self::RequestFailed(_) | Self::ApiError { .. } | Self::GraphQl(_) | Self::ParseError(_)
        )
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::NotFound(_) | Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self.root(), Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self.root(), Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if repeating the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self.root() {
            Self::RequestFailed(e) => e.is_connect() || e.is_timeout(),
            _ => self.is_server_error(),
        }
    }
}
