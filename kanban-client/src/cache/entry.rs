//! Cache entries and the snapshots handed to subscribers

use kanban_core::Identity;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ClientError;

/// Lifecycle status of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Resolved,
    Failed,
}

/// Point-in-time view of one cache entry
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub identity: Identity,
    pub status: EntryStatus,
    /// Present when `status` is [`EntryStatus::Resolved`]
    pub value: Option<Value>,
    /// Present when `status` is [`EntryStatus::Failed`]
    pub error: Option<Arc<ClientError>>,
    /// Incremented on every transition of the entry
    pub version: u64,
}

impl Snapshot {
    /// True once the entry is no longer pending
    pub fn is_settled(&self) -> bool {
        self.status != EntryStatus::Pending
    }
}

pub(crate) type Callback = Box<dyn Fn(&Snapshot) + Send + Sync>;

pub(crate) enum EntryState {
    Pending,
    Resolved(Value),
    Failed(Arc<ClientError>),
}

pub(crate) struct Subscriber {
    pub(crate) id: u64,
    pub(crate) callback: Callback,
}

pub(crate) struct Entry {
    pub(crate) state: EntryState,
    pub(crate) version: u64,
    pub(crate) subscribers: Vec<Subscriber>,
}

impl Entry {
    pub(crate) fn pending() -> Self {
        Self {
            state: EntryState::Pending,
            version: 0,
            subscribers: Vec::new(),
        }
    }

    pub(crate) fn status(&self) -> EntryStatus {
        match self.state {
            EntryState::Pending => EntryStatus::Pending,
            EntryState::Resolved(_) => EntryStatus::Resolved,
            EntryState::Failed(_) => EntryStatus::Failed,
        }
    }

    pub(crate) fn snapshot(&self, identity: &Identity) -> Snapshot {
        let (value, error) = match &self.state {
            EntryState::Pending => (None, None),
            EntryState::Resolved(value) => (Some(value.clone()), None),
            EntryState::Failed(error) => (None, Some(Arc::clone(error))),
        };

        Snapshot {
            identity: identity.clone(),
            status: self.status(),
            value,
            error,
            version: self.version,
        }
    }

    /// Replaces the state and notifies every subscriber in subscription order
    pub(crate) fn transition(&mut self, identity: &Identity, state: EntryState) {
        self.state = state;
        self.version += 1;
        self.notify(identity);
    }

    pub(crate) fn notify(&self, identity: &Identity) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot(identity);
        for subscriber in &self.subscribers {
            (subscriber.callback)(&snapshot);
        }
    }
}
