//! Transport layer
//!
//! A [`Transport`] sends one operation to the remote endpoint and returns its
//! `data` payload. The cache and the bindings only see this trait, so tests and
//! alternative backends can substitute their own implementation.

use async_trait::async_trait;
use kanban_core::{Operation, OperationKind};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ClientError, GraphQlError, Result};
use crate::token::TokenStore;

/// Sends a single operation to the remote endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes the operation and returns the `data` payload of the response
    async fn execute(&self, operation: &Operation) -> Result<Value>;
}

/// Retry behaviour for read operations
///
/// Mutations are never retried. Only connection failures, timeouts and 5xx
/// responses count as retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Upper bound for the doubled delay
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// A single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Exponential backoff starting at 500ms, capped at 30s
    pub fn exponential(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

/// HTTP transport for a single GraphQL endpoint
pub struct GraphQlTransport {
    /// Endpoint URL (e.g., "https://api.example.com/simple/v1/project")
    endpoint: String,
    /// HTTP client instance
    client: Client,
    /// Source of the bearer token
    tokens: Arc<dyn TokenStore>,
    retry: RetryPolicy,
}

impl GraphQlTransport {
    /// Create a new transport
    ///
    /// # Arguments
    /// * `endpoint` - The GraphQL endpoint URL
    /// * `tokens` - Where to read the bearer token from before each request
    pub fn new(endpoint: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_client(endpoint, tokens, Client::new())
    }

    /// Create a new transport with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        endpoint: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        client: Client,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
            tokens,
            retry: RetryPolicy::none(),
        }
    }

    /// Enable retries for queries
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, operation: &Operation) -> Result<Value> {
        let mut request = self.client.post(&self.endpoint).json(&operation.request());
        if let Some(token) = self.tokens.load()? {
            request = request.bearer_auth(token);
        }

        debug!(operation = %operation.name(), kind = %operation.kind(), "Sending operation");
        let response = request.send().await?;

        self.handle_response(response).await
    }

    /// Handle a GraphQL response
    ///
    /// Non-2xx statuses become [`ClientError::ApiError`]; a non-empty `errors`
    /// list wins over any partial `data`.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))?;

        if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            return Err(ClientError::GraphQl(errors));
        }

        body.data.ok_or_else(|| {
            ClientError::ParseError("Response contained neither data nor errors".to_string())
        })
    }
}

#[async_trait]
impl Transport for GraphQlTransport {
    async fn execute(&self, operation: &Operation) -> Result<Value> {
        let max_attempts = match operation.kind() {
            OperationKind::Query => self.retry.max_attempts.max(1),
            OperationKind::Mutation => 1,
        };

        let mut attempt = 0;
        let mut delay = self.retry.initial_delay;

        loop {
            attempt += 1;

            match self.send(operation).await {
                Ok(data) => return Ok(data),
                Err(e) if attempt < max_attempts && e.is_retryable() => {
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        operation.name(),
                        attempt,
                        max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.retry.max_delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
