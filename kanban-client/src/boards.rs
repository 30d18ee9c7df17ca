//! Board operations

use kanban_core::domain::board::Board;
use kanban_core::domain::user::User;
use kanban_core::dto::board::{CreateBoard, UpdateBoard};
use kanban_core::operations;
use serde_json::json;

use crate::KanbanClient;
use crate::error::Result;
use crate::mutation::Patch;
use crate::patch::{merge_at, merge_by_id_at, prepend_at, remove_by_id_at};
use crate::query::FetchPolicy;

impl KanbanClient {
    // =============================================================================
    // Board Queries
    // =============================================================================

    /// Get the authenticated user and their boards
    ///
    /// # Returns
    /// `None` when the request is not authenticated
    pub async fn user_boards(&self) -> Result<Option<User>> {
        let data = self
            .query(operations::user_boards(), FetchPolicy::CacheFirst)
            .await?;

        Self::decode_optional(data, "user")
    }

    /// Get a board with its columns
    ///
    /// # Arguments
    /// * `id` - The board ID
    pub async fn board(&self, id: &str) -> Result<Board> {
        let data = self
            .query(operations::board(id)?, FetchPolicy::CacheFirst)
            .await?;

        Self::decode(data, "Board")
    }

    // =============================================================================
    // Board Mutations
    // =============================================================================

    /// Create a board
    ///
    /// The new board is prepended to the cached board list, matching the
    /// list's most-recently-updated-first order.
    ///
    /// # Example
    /// ```no_run
    /// # use kanban_client::{KanbanClient, MemoryTokenStore};
    /// # use kanban_core::dto::board::CreateBoard;
    /// # use std::sync::Arc;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = KanbanClient::new(
    ///     "http://localhost:60000/graphql",
    ///     Arc::new(MemoryTokenStore::with_token("token")),
    /// );
    /// let board = client.create_board(CreateBoard {
    ///     owner_id: "user-1".to_string(),
    ///     name: "Sprint".to_string(),
    ///     repository: "acme/app".to_string(),
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_board(&self, req: CreateBoard) -> Result<Board> {
        let operation = operations::create_board(&req)?;
        let patches = vec![Patch::with_result(
            operations::user_boards().identity(),
            |current, result| prepend_at(current, &["user", "boards"], result["createBoard"].clone()),
        )];

        let data = self.mutate(&operation, patches).await?;
        Self::decode(data, "createBoard")
    }

    /// Update a board's name and repository
    ///
    /// Patches the cached board and its entry in the cached board list.
    pub async fn update_board(&self, req: UpdateBoard) -> Result<Board> {
        let operation = operations::update_board(&req)?;
        let id = req.id.clone();
        let patches = vec![
            Patch::with_result(operations::board(&req.id)?.identity(), |current, result| {
                merge_at(current, &["Board"], &result["updateBoard"])
            }),
            Patch::with_result(operations::user_boards().identity(), move |current, result| {
                let fields = json!({ "name": result["updateBoard"]["name"] });
                merge_by_id_at(current, &["user", "boards"], &id, &fields)
            }),
        ];

        let data = self.mutate(&operation, patches).await?;
        Self::decode(data, "updateBoard")
    }

    /// Delete a board
    ///
    /// Removes the board from the cached board list.
    pub async fn delete_board(&self, id: &str) -> Result<()> {
        let operation = operations::delete_board(id)?;
        let removed = id.to_string();
        let patches = vec![Patch::new(operations::user_boards().identity(), move |current| {
            remove_by_id_at(current, &["user", "boards"], &removed)
        })];

        self.mutate(&operation, patches).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::ScriptedTransport;
    use crate::{ClientError, KanbanClient, MemoryTokenStore};
    use kanban_core::dto::board::{CreateBoard, UpdateBoard};
    use kanban_core::operations;
    use serde_json::json;
    use std::sync::Arc;

    fn client_with_boards(transport: &Arc<ScriptedTransport>) -> KanbanClient {
        transport.respond(
            "UserBoards",
            Ok(json!({
                "user": {
                    "id": "u1",
                    "boards": [{ "id": "b1", "name": "Sprint" }]
                }
            })),
        );
        KanbanClient::with_transport(transport.clone(), Arc::new(MemoryTokenStore::new()))
    }

    #[tokio::test]
    async fn test_create_board_prepends_to_cached_list() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with_boards(&transport);
        transport.respond(
            "CreateBoard",
            Ok(json!({ "createBoard": { "id": "b2", "name": "Roadmap", "repository": "acme/app" } })),
        );

        client.user_boards().await.unwrap();
        let board = client
            .create_board(CreateBoard {
                owner_id: "u1".to_string(),
                name: "Roadmap".to_string(),
                repository: "acme/app".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(board.id, "b2");

        let user = client.user_boards().await.unwrap().unwrap();
        let names: Vec<_> = user.boards.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Roadmap", "Sprint"]);
        assert_eq!(transport.calls_to("UserBoards"), 1);
    }

    #[tokio::test]
    async fn test_update_board_patches_board_and_list() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with_boards(&transport);
        transport.respond(
            "Board",
            Ok(json!({ "Board": { "id": "b1", "name": "Sprint", "repository": "acme/app", "columns": [] } })),
        );
        transport.respond(
            "UpdateBoard",
            Ok(json!({ "updateBoard": { "id": "b1", "name": "Sprint 2", "repository": "acme/web" } })),
        );

        client.user_boards().await.unwrap();
        client.board("b1").await.unwrap();
        client
            .update_board(UpdateBoard {
                id: "b1".to_string(),
                name: "Sprint 2".to_string(),
                repository: "acme/web".to_string(),
            })
            .await
            .unwrap();

        let board = client.board("b1").await.unwrap();
        assert_eq!(board.name, "Sprint 2");
        assert_eq!(board.repository.as_deref(), Some("acme/web"));

        let user = client.user_boards().await.unwrap().unwrap();
        assert_eq!(user.boards[0].name, "Sprint 2");
        assert_eq!(transport.calls_to("Board"), 1);
    }

    #[tokio::test]
    async fn test_delete_board_removes_from_cached_list() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with_boards(&transport);
        transport.respond("DeleteBoard", Ok(json!({ "deleteBoard": { "id": "b1" } })));

        client.user_boards().await.unwrap();
        client.delete_board("b1").await.unwrap();

        let user = client.user_boards().await.unwrap().unwrap();
        assert!(user.boards.is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_cached_list() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client_with_boards(&transport);
        transport.respond(
            "DeleteBoard",
            Err(ClientError::GraphQl(vec![crate::GraphQlError {
                message: "Insufficient permissions".to_string(),
                path: None,
            }])),
        );

        client.user_boards().await.unwrap();
        let before = client
            .store()
            .snapshot(&operations::user_boards().identity())
            .unwrap();

        assert!(client.delete_board("b1").await.unwrap_err().is_transport());

        let after = client
            .store()
            .snapshot(&operations::user_boards().identity())
            .unwrap();
        assert_eq!(before.value, after.value);
        assert_eq!(before.version, after.version);
    }

    #[tokio::test]
    async fn test_board_validates_id_before_network() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = KanbanClient::with_transport(transport.clone(), Arc::new(MemoryTokenStore::new()));

        let err = client.board("").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(transport.calls_to("Board"), 0);
    }
}
