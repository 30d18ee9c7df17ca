//! Cache store
//!
//! All entries live behind one mutex. Every transition, together with the
//! notification of its subscribers, happens while that lock is held, so
//! transitions of an identity are applied one at a time and in the order the
//! triggering calls complete. Subscriber callbacks therefore run under the
//! lock and must not call back into the store.

use kanban_core::Identity;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;

use crate::cache::entry::{Callback, Entry, EntryState, EntryStatus, Snapshot, Subscriber};
use crate::error::{ClientError, Result};

#[derive(Default)]
struct Inner {
    entries: HashMap<Identity, Entry>,
    next_subscription: u64,
}

impl Inner {
    /// Returns the entry for `identity` and whether it was just created
    fn get_or_create(&mut self, identity: &Identity) -> (&mut Entry, bool) {
        let mut created = false;
        let entry = self.entries.entry(identity.clone()).or_insert_with(|| {
            created = true;
            Entry::pending()
        });
        (entry, created)
    }

    fn subscribe(&mut self, identity: &Identity, callback: Callback) -> u64 {
        let id = self.next_subscription;
        self.next_subscription += 1;
        let (entry, _) = self.get_or_create(identity);
        entry.subscribers.push(Subscriber { id, callback });
        id
    }
}

/// Shared map from operation identity to cache entry
#[derive(Default)]
pub struct CacheStore {
    inner: Mutex<Inner>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the entry for `identity`, creating a pending one if needed
    pub fn get_or_create(&self, identity: &Identity) -> Snapshot {
        let mut inner = self.lock();
        let (entry, created) = inner.get_or_create(identity);
        if created {
            debug!(%identity, "Created cache entry");
        }
        entry.snapshot(identity)
    }

    /// Decides whether the caller should fetch `identity` and marks it pending if so
    ///
    /// Returns `true` for a newly created entry, for a failed entry and, when
    /// `force` is set, for a resolved one. A pending entry always returns
    /// `false`: its fetch is already in flight and will be shared.
    pub fn begin_fetch(&self, identity: &Identity, force: bool) -> bool {
        let mut inner = self.lock();
        let (entry, created) = inner.get_or_create(identity);

        if created {
            debug!(%identity, "Created cache entry, fetching");
            return true;
        }

        match entry.status() {
            EntryStatus::Pending => {
                debug!(%identity, "Fetch already in flight, sharing it");
                false
            }
            EntryStatus::Failed => {
                debug!(%identity, "Refetching failed entry");
                entry.transition(identity, EntryState::Pending);
                true
            }
            EntryStatus::Resolved if force => {
                debug!(%identity, "Refetching resolved entry");
                entry.transition(identity, EntryState::Pending);
                true
            }
            EntryStatus::Resolved => false,
        }
    }

    /// Registers a callback invoked on every transition of `identity`
    ///
    /// Creates a pending entry if none exists. The callback is removed when
    /// the returned [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(self: &Arc<Self>, identity: &Identity, callback: F) -> Subscription
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let id = self.lock().subscribe(identity, Box::new(callback));
        Subscription::new(self, identity, id)
    }

    /// Like [`subscribe`](Self::subscribe), but also hands the current snapshot
    /// to the callback before any later transition can reach it
    pub fn watch<F>(self: &Arc<Self>, identity: &Identity, callback: F) -> Subscription
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let (entry, _) = inner.get_or_create(identity);
        callback(&entry.snapshot(identity));
        let id = inner.subscribe(identity, Box::new(callback));
        drop(inner);

        Subscription::new(self, identity, id)
    }

    /// Stores a fetched value and notifies subscribers
    ///
    /// # Errors
    /// [`ClientError::NotFound`] if the entry was evicted while its fetch was in flight.
    pub fn resolve(&self, identity: &Identity, value: Value) -> Result<()> {
        let mut inner = self.lock();
        let entry = inner
            .entries
            .get_mut(identity)
            .ok_or_else(|| ClientError::NotFound(identity.to_string()))?;

        debug!(%identity, "Resolved cache entry");
        entry.transition(identity, EntryState::Resolved(value));
        Ok(())
    }

    /// Records a failed fetch and notifies subscribers
    ///
    /// # Errors
    /// [`ClientError::NotFound`] if the entry was evicted while its fetch was in flight.
    pub fn fail(&self, identity: &Identity, error: ClientError) -> Result<()> {
        let mut inner = self.lock();
        let entry = inner
            .entries
            .get_mut(identity)
            .ok_or_else(|| ClientError::NotFound(identity.to_string()))?;

        debug!(%identity, "Cache entry failed: {}", error);
        entry.transition(identity, EntryState::Failed(Arc::new(error)));
        Ok(())
    }

    /// Rewrites a resolved value in place and notifies subscribers
    ///
    /// # Errors
    /// [`ClientError::NotFound`] if the entry does not exist or is not
    /// resolved. No entry is created in that case.
    pub fn patch<F>(&self, identity: &Identity, patch: F) -> Result<()>
    where
        F: FnOnce(Value) -> Value,
    {
        let mut inner = self.lock();
        let entry = inner
            .entries
            .get_mut(identity)
            .ok_or_else(|| ClientError::NotFound(identity.to_string()))?;

        let EntryState::Resolved(value) = &entry.state else {
            return Err(ClientError::NotFound(format!(
                "{} is not resolved",
                identity
            )));
        };

        // Work on a copy so a panicking patch leaves the cached value intact
        let next = patch(value.clone());
        debug!(%identity, "Patched cache entry");
        entry.transition(identity, EntryState::Resolved(next));
        Ok(())
    }

    /// Current snapshot of an entry, if it exists
    pub fn snapshot(&self, identity: &Identity) -> Option<Snapshot> {
        self.lock()
            .entries
            .get(identity)
            .map(|entry| entry.snapshot(identity))
    }

    pub fn subscriber_count(&self, identity: &Identity) -> usize {
        self.lock()
            .entries
            .get(identity)
            .map_or(0, |entry| entry.subscribers.len())
    }

    /// Removes one entry regardless of its state
    ///
    /// The entry's subscriber callbacks are dropped with it, which ends the
    /// snapshot stream of any query binding still mounted on it. An in-flight
    /// fetch for it will find nothing to resolve.
    pub fn evict(&self, identity: &Identity) -> bool {
        let removed = self.lock().entries.remove(identity).is_some();
        if removed {
            debug!(%identity, "Evicted cache entry");
        }
        removed
    }

    /// Removes every entry that has no subscribers and no fetch in flight
    ///
    /// Returns the number of entries removed.
    pub fn evict_idle(&self) -> usize {
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| {
            !entry.subscribers.is_empty() || entry.status() == EntryStatus::Pending
        });
        let removed = before - inner.entries.len();
        if removed > 0 {
            debug!("Evicted {} idle cache entries", removed);
        }
        removed
    }

    /// Removes every entry, ending the streams of all mounted bindings like [`evict`](Self::evict)
    pub fn clear(&self) {
        let mut inner = self.lock();
        let removed = inner.entries.len();
        inner.entries.clear();
        debug!("Cleared {} cache entries", removed);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn unsubscribe(&self, identity: &Identity, id: u64) {
        if let Some(entry) = self.lock().entries.get_mut(identity) {
            entry.subscribers.retain(|subscriber| subscriber.id != id);
        }
    }
}

/// Handle returned by [`CacheStore::subscribe`]; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes it immediately"]
pub struct Subscription {
    store: Weak<CacheStore>,
    identity: Identity,
    id: u64,
    active: bool,
}

impl Subscription {
    fn new(store: &Arc<CacheStore>, identity: &Identity, id: u64) -> Self {
        Self {
            store: Arc::downgrade(store),
            identity: identity.clone(),
            id,
            active: true,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Removes the callback from the store
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !std::mem::replace(&mut self.active, false) {
            return;
        }
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(&self.identity, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::Operation;
    use serde_json::json;

    fn board(id: &str) -> Identity {
        Operation::query("Board", "").with_variable("id", id).identity()
    }

    /// Records every snapshot a subscriber receives
    fn recorder() -> (
        Arc<Mutex<Vec<Snapshot>>>,
        impl Fn(&Snapshot) + Send + Sync + 'static,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |snapshot: &Snapshot| {
            sink.lock().unwrap().push(snapshot.clone())
        })
    }

    #[test]
    fn test_get_or_create_starts_pending() {
        let store = CacheStore::new();
        let snapshot = store.get_or_create(&board("1"));

        assert_eq!(snapshot.status, EntryStatus::Pending);
        assert!(snapshot.value.is_none());
        assert_eq!(store.len(), 1);

        // Second call returns the same entry
        store.get_or_create(&board("1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_subscribers_notified_in_subscription_order() {
        let store = Arc::new(CacheStore::new());
        let id = board("1");
        let order = Arc::new(Mutex::new(Vec::new()));

        let subs: Vec<_> = (0..3)
            .map(|n| {
                let order = Arc::clone(&order);
                store.subscribe(&id, move |_| order.lock().unwrap().push(n))
            })
            .collect();

        store.resolve(&id, json!({ "name": "Sprint" })).unwrap();

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        drop(subs);
    }

    #[test]
    fn test_patch_missing_entry_is_not_found_and_creates_nothing() {
        let store = CacheStore::new();
        let err = store.patch(&board("404"), |v| v).unwrap_err();

        assert!(err.is_not_found());
        assert!(store.snapshot(&board("404")).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_patch_pending_entry_is_not_found() {
        let store = CacheStore::new();
        store.get_or_create(&board("1"));

        assert!(matches!(
            store.patch(&board("1"), |v| v),
            Err(ClientError::NotFound(_))
        ));
        assert_eq!(
            store.snapshot(&board("1")).unwrap().status,
            EntryStatus::Pending
        );
    }

    #[test]
    fn test_patches_compose_in_order() {
        let store = CacheStore::new();
        let id = board("1");
        store.get_or_create(&id);
        store.resolve(&id, json!({ "log": "v0" })).unwrap();

        let append = |suffix: &'static str| {
            move |value: Value| json!({ "log": format!("{}-{}", value["log"].as_str().unwrap(), suffix) })
        };

        store.patch(&id, append("p1")).unwrap();
        store.patch(&id, append("p2")).unwrap();

        let snapshot = store.snapshot(&id).unwrap();
        assert_eq!(snapshot.value, Some(json!({ "log": "v0-p1-p2" })));
        assert_eq!(snapshot.version, 3);
    }

    #[test]
    fn test_unsubscribing_one_does_not_affect_another() {
        let store = Arc::new(CacheStore::new());
        let id = board("1");
        let (seen_a, a) = recorder();
        let (seen_b, b) = recorder();

        let sub_a = store.subscribe(&id, a);
        let _sub_b = store.subscribe(&id, b);

        store.resolve(&id, json!({ "name": "Sprint" })).unwrap();
        sub_a.unsubscribe();

        store.patch(&id, |_| json!({ "name": "Sprint 2" })).unwrap();
        store
            .fail(&id, ClientError::api_error(500, "boom"))
            .unwrap();

        assert_eq!(seen_a.lock().unwrap().len(), 1);

        let seen_b = seen_b.lock().unwrap();
        let statuses: Vec<_> = seen_b.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                EntryStatus::Resolved,
                EntryStatus::Resolved,
                EntryStatus::Failed
            ]
        );
        assert_eq!(seen_b[1].value, Some(json!({ "name": "Sprint 2" })));
        assert_eq!(store.subscriber_count(&id), 1);
    }

    #[test]
    fn test_failure_delivered_once_to_each_subscriber() {
        let store = Arc::new(CacheStore::new());
        let id = board("1");
        let (seen_a, a) = recorder();
        let (seen_b, b) = recorder();
        let _a = store.subscribe(&id, a);
        let _b = store.subscribe(&id, b);

        store
            .fail(&id, ClientError::api_error(502, "bad gateway"))
            .unwrap();

        for seen in [seen_a, seen_b] {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].status, EntryStatus::Failed);
            assert!(seen[0].error.as_ref().unwrap().is_server_error());
        }
    }

    #[test]
    fn test_watch_delivers_current_snapshot_first() {
        let store = Arc::new(CacheStore::new());
        let id = board("1");
        store.get_or_create(&id);
        store.resolve(&id, json!({ "name": "Sprint" })).unwrap();

        let (seen, callback) = recorder();
        let _sub = store.watch(&id, callback);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].value, Some(json!({ "name": "Sprint" })));
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let store = Arc::new(CacheStore::new());
        let id = board("1");
        {
            let _sub = store.subscribe(&id, |_| {});
            assert_eq!(store.subscriber_count(&id), 1);
        }
        assert_eq!(store.subscriber_count(&id), 0);
    }

    #[test]
    fn test_begin_fetch_deduplicates_and_retries_failures() {
        let store = CacheStore::new();
        let id = board("1");

        assert!(store.begin_fetch(&id, false));
        assert!(!store.begin_fetch(&id, false));
        assert!(!store.begin_fetch(&id, true));

        store.resolve(&id, json!({})).unwrap();
        assert!(!store.begin_fetch(&id, false));

        store.fail(&id, ClientError::api_error(500, "boom")).unwrap();
        assert!(store.begin_fetch(&id, false));
        assert_eq!(
            store.snapshot(&id).unwrap().status,
            EntryStatus::Pending
        );

        store.resolve(&id, json!({})).unwrap();
        assert!(store.begin_fetch(&id, true));
    }

    #[test]
    fn test_panicking_patch_keeps_cached_value() {
        let store = CacheStore::new();
        let id = board("1");
        store.get_or_create(&id);
        store.resolve(&id, json!({ "name": "Sprint" })).unwrap();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.patch(&id, |_| panic!("bad patch"))
        }));
        assert!(outcome.is_err());

        let snapshot = store.snapshot(&id).unwrap();
        assert_eq!(snapshot.status, EntryStatus::Resolved);
        assert_eq!(snapshot.value, Some(json!({ "name": "Sprint" })));
        assert_eq!(snapshot.version, 1);

        // The store is still usable afterwards
        store.patch(&id, |_| json!({ "name": "Sprint 2" })).unwrap();
        assert_eq!(store.snapshot(&id).unwrap().version, 2);
    }

    #[test]
    fn test_evict_drops_subscriber_callbacks() {
        let store = Arc::new(CacheStore::new());
        let id = board("1");
        let marker = Arc::new(());
        let held = Arc::clone(&marker);
        let _sub = store.subscribe(&id, move |_| assert!(Arc::strong_count(&held) > 1));
        assert_eq!(Arc::strong_count(&marker), 2);

        assert!(store.evict(&id));
        assert_eq!(Arc::strong_count(&marker), 1);

        let other = board("2");
        let held = Arc::clone(&marker);
        let _sub = store.subscribe(&other, move |_| assert!(Arc::strong_count(&held) > 1));
        store.clear();
        assert_eq!(Arc::strong_count(&marker), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_entries_are_retained_until_evicted() {
        let store = Arc::new(CacheStore::new());
        let resolved = board("1");
        let pending = board("2");
        let watched = board("3");

        store.get_or_create(&resolved);
        store.resolve(&resolved, json!({ "name": "Sprint" })).unwrap();
        store.get_or_create(&pending);
        let _sub = store.subscribe(&watched, |_| {});
        store.resolve(&watched, json!({})).unwrap();

        // Nothing is dropped just because nobody is subscribed
        assert_eq!(store.len(), 3);

        assert_eq!(store.evict_idle(), 1);
        assert!(store.snapshot(&resolved).is_none());
        assert!(store.snapshot(&pending).is_some());
        assert!(store.snapshot(&watched).is_some());

        assert!(store.evict(&pending));
        assert!(!store.evict(&pending));
        assert!(store.resolve(&pending, json!({})).unwrap_err().is_not_found());
        assert_eq!(store.len(), 1);
    }
}
