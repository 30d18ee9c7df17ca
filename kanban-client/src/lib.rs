//! Kanban HTTP Client
//!
//! A caching client for the kanban board GraphQL API.
//!
//! The client is layered, leaves first:
//! - [`Transport`]: sends one operation, returns its `data` or an error
//! - [`CacheStore`]: results keyed by operation identity, with subscribers
//! - [`QueryBinding`]: an observer's lifetime of interest in one read
//! - [`MutationBinding`]: a write followed by caller-declared cache patches
//!
//! [`KanbanClient`] wires these together around one explicitly constructed
//! cache and exposes typed methods for boards, columns and authentication.
//!
//! # Example
//!
//! ```no_run
//! use kanban_client::{FileTokenStore, KanbanClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let tokens = Arc::new(FileTokenStore::new("/tmp/kanban-token"));
//!     let client = KanbanClient::new("http://localhost:60000/graphql", tokens);
//!
//!     if let Some(user) = client.user_boards().await? {
//!         for board in user.boards {
//!             println!("{} {}", board.id, board.name);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod auth;
mod boards;
pub mod cache;
mod columns;
pub mod error;
pub mod mutation;
pub mod patch;
pub mod query;
pub mod token;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use cache::{CacheStore, EntryStatus, Snapshot, Subscription};
pub use error::{ClientError, GraphQlError, Result};
pub use mutation::{MutationBinding, Patch};
pub use query::{BindingState, FetchPolicy, QueryBinding};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transport::{GraphQlTransport, RetryPolicy, Transport};

use kanban_core::Operation;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Client for the kanban board API
///
/// Cloning is cheap and every clone shares the same cache, transport and
/// token store.
#[derive(Clone)]
pub struct KanbanClient {
    store: Arc<CacheStore>,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl KanbanClient {
    /// Create a client talking to a GraphQL endpoint over HTTP
    ///
    /// # Arguments
    /// * `endpoint` - The GraphQL endpoint URL
    /// * `tokens` - Storage for the bearer token
    pub fn new(endpoint: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        let transport = GraphQlTransport::new(endpoint, Arc::clone(&tokens));
        Self::with_transport(Arc::new(transport), tokens)
    }

    /// Create a client over any transport
    ///
    /// The token store is only used by [`authenticate`](Self::authenticate)
    /// and [`logout`](Self::logout); the transport decides how to authenticate.
    pub fn with_transport(transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            store: Arc::new(CacheStore::new()),
            transport,
            tokens,
        }
    }

    /// The cache shared by every binding created from this client
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    // =============================================================================
    // Bindings
    // =============================================================================

    /// Mount a query binding for `operation`
    pub fn watch(&self, operation: Operation, policy: FetchPolicy) -> Result<QueryBinding> {
        let mut binding =
            QueryBinding::new(Arc::clone(&self.store), Arc::clone(&self.transport), policy);
        binding.mount(operation)?;
        Ok(binding)
    }

    /// Mount a binding, wait for the entry to settle, then unmount
    pub async fn query(&self, operation: Operation, policy: FetchPolicy) -> Result<Value> {
        let name = operation.name().to_string();
        let mut binding = self.watch(operation, policy)?;

        let snapshot = binding
            .settled()
            .await
            .ok_or_else(|| ClientError::NotFound(format!("{} was evicted", name)))?;

        match (snapshot.value, snapshot.error) {
            (Some(value), _) => Ok(value),
            (None, Some(error)) => Err(ClientError::Shared(error)),
            (None, None) => Err(ClientError::NotFound(format!("{} has no value", name))),
        }
    }

    /// Execute a mutation and apply `patches` to the cache once it succeeds
    pub async fn mutate(&self, operation: &Operation, patches: Vec<Patch>) -> Result<Value> {
        MutationBinding::new(Arc::clone(&self.store), Arc::clone(&self.transport))
            .execute(operation, patches)
            .await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Decode the root field `field` of a response, treating `null` as absent
    fn decode_optional<T: DeserializeOwned>(mut data: Value, field: &str) -> Result<Option<T>> {
        match data.get_mut(field).map(Value::take) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ClientError::ParseError(format!("Failed to decode {}: {}", field, e))),
        }
    }

    /// Decode the root field `field` of a response, which must be present
    fn decode<T: DeserializeOwned>(data: Value, field: &str) -> Result<T> {
        Self::decode_optional(data, field)?
            .ok_or_else(|| ClientError::NotFound(format!("{} returned null", field)))
    }
}
