//! Configuration module
//!
//! Handles CLI configuration including the endpoint URL and token location.

use anyhow::{Result, bail};
use kanban_client::{FileTokenStore, KanbanClient};
use std::path::PathBuf;
use std::sync::Arc;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// GraphQL endpoint (e.g., "http://localhost:60000/graphql")
    pub endpoint: String,

    /// File the API token is read from and written to
    pub token_file: PathBuf,
}

impl Config {
    /// `<config dir>/kanban/token`
    pub fn default_token_file() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(base.join("kanban").join("token"))
    }

    /// Rejects endpoints that are empty or not http(s)
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            bail!("Endpoint must not be empty");
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            bail!("Endpoint must be an http(s) URL, got '{}'", endpoint);
        }
        Ok(())
    }

    pub fn client(&self) -> KanbanClient {
        KanbanClient::new(
            self.endpoint.trim(),
            Arc::new(FileTokenStore::new(&self.token_file)),
        )
    }
}
