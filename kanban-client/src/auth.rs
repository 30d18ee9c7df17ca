//! Authentication operations

use kanban_core::domain::user::{AuthPayload, LoggedInUser};
use kanban_core::operations;
use tracing::info;

use crate::KanbanClient;
use crate::error::Result;
use crate::query::FetchPolicy;

impl KanbanClient {
    /// Get the user the stored token belongs to
    ///
    /// Always asks the endpoint, since the answer depends on the token rather
    /// than on anything cached.
    ///
    /// # Returns
    /// `None` when no token is stored or the endpoint rejects it
    pub async fn logged_in_user(&self) -> Result<Option<LoggedInUser>> {
        let data = self
            .query(operations::logged_in_user(), FetchPolicy::NetworkOnly)
            .await?;

        Self::decode_optional(data, "loggedInUser")
    }

    /// Exchange a GitHub OAuth code for an API token and store it
    ///
    /// Everything cached under the previous credentials is dropped, which also
    /// ends the snapshot streams of bindings mounted at that moment.
    pub async fn authenticate(&self, github_code: &str) -> Result<AuthPayload> {
        let operation = operations::authenticate_user(github_code)?;
        let data = self.mutate(&operation, Vec::new()).await?;
        let payload: AuthPayload = Self::decode(data, "authenticateUser")?;

        self.tokens.save(&payload.token)?;
        self.store.clear();
        info!("Authenticated, token stored");

        Ok(payload)
    }

    /// Forget the stored token and everything cached under it
    pub async fn logout(&self) -> Result<()> {
        self.tokens.clear()?;
        self.store.clear();
        info!("Logged out");
        Ok(())
    }
}
