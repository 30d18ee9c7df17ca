//! Mutation binding
//!
//! Writes go straight to the transport. On success, the caller-declared
//! patches are applied to the cache in the order given, before the result is
//! returned; on failure nothing is patched. The cache never infers what a
//! write affects: callers list the cached reads and how to rewrite them.

use kanban_core::{Identity, Operation, OperationKind};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::error::Result;
use crate::transport::Transport;

type PatchFn = Box<dyn FnOnce(Value, &Value) -> Value + Send>;

/// A rewrite of one cached read, applied after a successful write
pub struct Patch {
    identity: Identity,
    apply: PatchFn,
}

impl Patch {
    /// Patch computed from the cached value alone
    pub fn new<F>(identity: Identity, patch: F) -> Self
    where
        F: FnOnce(Value) -> Value + Send + 'static,
    {
        Self {
            identity,
            apply: Box::new(move |current, _| patch(current)),
        }
    }

    /// Patch that also reads the `data` returned by the write
    pub fn with_result<F>(identity: Identity, patch: F) -> Self
    where
        F: FnOnce(Value, &Value) -> Value + Send + 'static,
    {
        Self {
            identity,
            apply: Box::new(patch),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patch")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Issues writes and patches the cache with their effects
#[derive(Clone)]
pub struct MutationBinding {
    store: Arc<CacheStore>,
    transport: Arc<dyn Transport>,
}

impl MutationBinding {
    pub fn new(store: Arc<CacheStore>, transport: Arc<dyn Transport>) -> Self {
        Self { store, transport }
    }

    /// Executes a mutation and applies `patches` once it succeeds
    ///
    /// A patch whose target is missing or not resolved is skipped: the write
    /// already happened, so it is logged rather than reported as a failure.
    ///
    /// # Errors
    /// - [`ClientError::Validation`](crate::ClientError::Validation) if `operation` is not a mutation
    /// - any transport error, in which case no patch has been applied
    pub async fn execute(&self, operation: &Operation, patches: Vec<Patch>) -> Result<Value> {
        operation.expect_kind(OperationKind::Mutation)?;

        let data = match self.transport.execute(operation).await {
            Ok(data) => data,
            Err(e) => {
                warn!("{} failed: {}", operation.name(), e);
                return Err(e);
            }
        };

        for Patch { identity, apply } in patches {
            match self.store.patch(&identity, |current| apply(current, &data)) {
                Ok(()) => debug!(%identity, "Applied patch from {}", operation.name()),
                Err(e) => warn!("Skipped patch from {}: {}", operation.name(), e),
            }
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EntryStatus;
    use crate::error::ClientError;
    use crate::patch::merge;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    fn resolved_store(identity: &Identity, value: Value) -> Arc<CacheStore> {
        let store = Arc::new(CacheStore::new());
        store.get_or_create(identity);
        store.resolve(identity, value).unwrap();
        store
    }

    fn update_board() -> Operation {
        Operation::mutation("UpdateBoard", "")
            .with_variable("id", "1")
            .with_variable("name", "Sprint 2")
    }

    fn board_identity() -> Identity {
        Operation::query("Board", "").with_variable("id", "1").identity()
    }

    #[tokio::test]
    async fn test_failed_write_applies_no_patch() {
        let identity = board_identity();
        let store = resolved_store(&identity, json!({ "name": "Sprint" }));
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("UpdateBoard", Err(ClientError::api_error(500, "boom")));

        let before = store.snapshot(&identity).unwrap();
        let binding = MutationBinding::new(Arc::clone(&store), transport);
        let err = binding
            .execute(
                &update_board(),
                vec![Patch::new(identity.clone(), merge(json!({ "name": "Sprint 2" })))],
            )
            .await
            .unwrap_err();
        let after = store.snapshot(&identity).unwrap();

        assert!(err.is_server_error());
        assert_eq!(before.value, after.value);
        assert_eq!(before.version, after.version);
        assert_eq!(after.status, EntryStatus::Resolved);
    }

    #[tokio::test]
    async fn test_patches_apply_in_declared_order() {
        let identity = board_identity();
        let store = resolved_store(&identity, json!({ "trail": [] }));
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("UpdateBoard", Ok(json!({ "updateBoard": { "id": "1" } })));
        transport.respond("UpdateBoard", Ok(json!({ "updateBoard": { "id": "1" } })));

        let push = |tag: &'static str| {
            move |mut value: Value| {
                value["trail"].as_array_mut().unwrap().push(json!(tag));
                value
            }
        };

        let binding = MutationBinding::new(Arc::clone(&store), transport);
        binding
            .execute(&update_board(), vec![Patch::new(identity.clone(), push("p1"))])
            .await
            .unwrap();
        binding
            .execute(&update_board(), vec![Patch::new(identity.clone(), push("p2"))])
            .await
            .unwrap();

        assert_eq!(
            store.snapshot(&identity).unwrap().value,
            Some(json!({ "trail": ["p1", "p2"] }))
        );
    }

    #[tokio::test]
    async fn test_patch_can_read_write_result() {
        let identity = board_identity();
        let store = resolved_store(&identity, json!({ "name": "Sprint" }));
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "UpdateBoard",
            Ok(json!({ "updateBoard": { "id": "1", "name": "From server" } })),
        );

        let binding = MutationBinding::new(Arc::clone(&store), transport);
        let data = binding
            .execute(
                &update_board(),
                vec![Patch::with_result(identity.clone(), |current, result| {
                    crate::patch::merge_at(current, &[], &json!({ "name": result["updateBoard"]["name"] }))
                })],
            )
            .await
            .unwrap();

        assert_eq!(data["updateBoard"]["name"], "From server");
        assert_eq!(
            store.snapshot(&identity).unwrap().value,
            Some(json!({ "name": "From server" }))
        );
    }

    #[tokio::test]
    async fn test_missing_patch_target_is_skipped() {
        let identity = board_identity();
        let store = resolved_store(&identity, json!({ "name": "Sprint" }));
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("UpdateBoard", Ok(json!({ "updateBoard": { "id": "1" } })));

        let missing = Operation::query("Board", "").with_variable("id", "9").identity();
        let binding = MutationBinding::new(Arc::clone(&store), transport);
        binding
            .execute(
                &update_board(),
                vec![
                    Patch::new(missing.clone(), merge(json!({ "name": "nope" }))),
                    Patch::new(identity.clone(), merge(json!({ "name": "Sprint 2" }))),
                ],
            )
            .await
            .unwrap();

        assert!(store.snapshot(&missing).is_none());
        assert_eq!(
            store.snapshot(&identity).unwrap().value,
            Some(json!({ "name": "Sprint 2" }))
        );
    }

    #[tokio::test]
    async fn test_rejects_queries() {
        let store = Arc::new(CacheStore::new());
        let transport = Arc::new(ScriptedTransport::new());
        let binding = MutationBinding::new(store, transport.clone());

        let err = binding
            .execute(&Operation::query("Board", ""), Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(transport.calls_to("Board"), 0);
    }
}
