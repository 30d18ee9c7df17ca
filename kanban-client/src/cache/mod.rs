//! Query result cache
//!
//! The [`CacheStore`] maps operation identities to cache entries and fans out
//! every state change of an entry to its subscribers. Query and mutation
//! bindings drive it; the presentation layer only ever sees [`Snapshot`]s.
//!
//! Eviction policy: entries outlive their subscribers. A later cache-first
//! mount reuses a retained value, mutation patches still reach it, and results
//! of fetches whose observers left mid-flight still land. Entries are removed
//! only by [`CacheStore::evict`], [`CacheStore::evict_idle`] or
//! [`CacheStore::clear`].

mod entry;
mod store;

pub use entry::{EntryStatus, Snapshot};
pub use store::{CacheStore, Subscription};
