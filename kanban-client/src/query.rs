//! Query binding
//!
//! A [`QueryBinding`] models one observer's interest in a read operation:
//! mounting it acquires the cache entry (fetching at most once per identity),
//! every transition of the entry arrives as a [`Snapshot`] on
//! [`changed`](QueryBinding::changed), and unmounting releases the
//! subscription. Failures are delivered as snapshots, never as errors.
//!
//! Fetches run on spawned tokio tasks, so mounting requires a running runtime.
//! Unmounting never cancels a fetch in flight; its result still lands in the
//! cache for whoever else is watching.
//!
//! The snapshot channel is owned by the store subscription alone. When the
//! entry is removed from the cache (`evict`, `clear`), its subscribers are
//! dropped with it, the channel closes and [`changed`](QueryBinding::changed)
//! returns `None`.

use kanban_core::{Identity, Operation, OperationKind};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::debug;

use crate::cache::{CacheStore, EntryStatus, Snapshot, Subscription};
use crate::error::Result;
use crate::transport::Transport;

/// Whether a mount may be served from a cached value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Reuse a resolved entry; fetch only new or failed entries
    #[default]
    CacheFirst,
    /// Always fetch unless a fetch for the identity is already in flight
    NetworkOnly,
}

/// Lifecycle state of a binding as seen by its observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unmounted,
    Mounted(EntryStatus),
}

struct Mounted {
    operation: Operation,
    subscription: Subscription,
    receiver: UnboundedReceiver<Snapshot>,
}

/// An observer's subscription to one read operation
pub struct QueryBinding {
    store: Arc<CacheStore>,
    transport: Arc<dyn Transport>,
    policy: FetchPolicy,
    mounted: Option<Mounted>,
    latest: Option<Snapshot>,
}

impl QueryBinding {
    /// Creates an unmounted binding
    pub fn new(store: Arc<CacheStore>, transport: Arc<dyn Transport>, policy: FetchPolicy) -> Self {
        Self {
            store,
            transport,
            policy,
            mounted: None,
            latest: None,
        }
    }

    /// Starts observing `operation`
    ///
    /// If the binding already observes another identity, it is unsubscribed
    /// first and its undelivered snapshots are discarded. Mounting the
    /// identity that is already mounted is a no-op.
    ///
    /// # Errors
    /// [`ClientError::Validation`](crate::ClientError::Validation) if `operation` is not a query.
    pub fn mount(&mut self, operation: Operation) -> Result<()> {
        operation.expect_kind(OperationKind::Query)?;

        if self.identity() == Some(&operation.identity()) {
            return Ok(());
        }
        self.unmount();

        let identity = operation.identity();
        let force = self.policy == FetchPolicy::NetworkOnly;
        let fetch = self.store.begin_fetch(&identity, force);

        let (sender, receiver) = mpsc::unbounded_channel();
        let subscription = self.store.watch(&identity, move |snapshot| {
            let _ = sender.send(snapshot.clone());
        });
        debug!(%identity, fetch, "Mounted query binding");

        if fetch {
            spawn_fetch(
                Arc::clone(&self.store),
                Arc::clone(&self.transport),
                operation.clone(),
            );
        }

        self.mounted = Some(Mounted {
            operation,
            subscription,
            receiver,
        });
        Ok(())
    }

    /// Switches the binding to an operation with different arguments
    pub fn set_operation(&mut self, operation: Operation) -> Result<()> {
        self.mount(operation)
    }

    /// Stops observing; snapshots not yet received are discarded
    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            debug!(identity = %mounted.subscription.identity(), "Unmounted query binding");
            mounted.subscription.unsubscribe();
        }
        self.latest = None;
    }

    /// Fetches the mounted operation again, bypassing the cached value
    ///
    /// Returns `false` if nothing is mounted or a fetch is already in flight.
    pub fn refetch(&self) -> bool {
        let Some(mounted) = &self.mounted else {
            return false;
        };

        let identity = mounted.subscription.identity();
        if !self.store.begin_fetch(identity, true) {
            return false;
        }

        spawn_fetch(
            Arc::clone(&self.store),
            Arc::clone(&self.transport),
            mounted.operation.clone(),
        );
        true
    }

    /// Waits for the next snapshot
    ///
    /// Returns `None` once the binding is unmounted, including when its entry
    /// was removed from the cache. In that case the binding unmounts itself.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        let mounted = self.mounted.as_mut()?;

        match mounted.receiver.recv().await {
            Some(snapshot) => {
                self.latest = Some(snapshot.clone());
                Some(snapshot)
            }
            None => {
                debug!(identity = %mounted.subscription.identity(), "Cache entry removed under binding");
                self.unmount();
                None
            }
        }
    }

    /// Waits until the entry is resolved or failed
    pub async fn settled(&mut self) -> Option<Snapshot> {
        if let (Some(latest), Some(mounted)) = (&self.latest, &self.mounted) {
            if latest.is_settled() && mounted.receiver.is_empty() {
                return Some(latest.clone());
            }
        }

        loop {
            let snapshot = self.changed().await?;
            if snapshot.is_settled() {
                return Some(snapshot);
            }
        }
    }

    /// Last snapshot handed out by [`changed`](Self::changed)
    pub fn latest(&self) -> Option<&Snapshot> {
        self.latest.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.mounted.as_ref().map(|m| m.subscription.identity())
    }

    pub fn state(&self) -> BindingState {
        match &self.mounted {
            None => BindingState::Unmounted,
            Some(_) => BindingState::Mounted(
                self.latest
                    .as_ref()
                    .map_or(EntryStatus::Pending, |s| s.status),
            ),
        }
    }
}

/// Executes `operation` on a background task and routes the outcome into the cache
pub(crate) fn spawn_fetch(
    store: Arc<CacheStore>,
    transport: Arc<dyn Transport>,
    operation: Operation,
) {
    tokio::spawn(async move {
        let identity = operation.identity();
        let applied = match transport.execute(&operation).await {
            Ok(data) => store.resolve(&identity, data),
            Err(e) => store.fail(&identity, e),
        };

        if let Err(e) = applied {
            debug!(%identity, "Dropped fetch result: {}", e);
        }
    });
}
