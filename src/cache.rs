//! Client-side cache for server state.
//!
//! Holds the latest known value for each [`QueryKey`] along with staleness
//! and error bookkeeping, and notifies per-key subscribers on every visible
//! change. The store never talks to the network; fetch results are applied
//! through the generation-guarded `begin_fetch` / `complete_fetch` /
//! `fail_fetch` operations so responses that arrive out of order cannot
//! overwrite newer data.

use crate::error::{KilnLinkError, Result};
use crate::keys::QueryKey;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Callback invoked with a fresh snapshot after every visible change to a key.
pub type CacheCallback = Arc<dyn Fn(&CacheEntry) + Send + Sync>;

/// Point-in-time snapshot of one cached key.
///
/// `value` and `error` can both be present at once: a failed refetch records
/// its error while the previously fetched value stays available for display.
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    /// Last successfully fetched or explicitly set value
    pub value: Option<JsonValue>,

    /// Error from the most recent failed fetch, cleared by the next success
    pub error: Option<KilnLinkError>,

    /// True when a mutation invalidated this key and no fetch has finished since
    pub is_stale: bool,

    /// When the value was last written
    pub fetched_at: Option<Instant>,

    /// Number of callbacks currently subscribed to this key
    pub subscriber_count: usize,
}

impl CacheEntry {
    /// True when the entry holds a value that is neither stale nor shadowed
    /// by a fetch error. Fresh entries are served without a network round trip.
    pub fn is_fresh(&self) -> bool {
        self.value.is_some() && !self.is_stale && self.error.is_none()
    }

    /// True when nothing has been fetched for this key yet.
    pub fn is_pending(&self) -> bool {
        self.value.is_none() && self.error.is_none()
    }

    /// Decode the cached value into a typed model.
    ///
    /// Returns `Ok(None)` when no value is cached, and a
    /// `SerializationError` when the cached JSON does not fit `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.value {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}

#[derive(Default)]
struct EntryState {
    value: Option<JsonValue>,
    error: Option<KilnLinkError>,
    is_stale: bool,
    fetched_at: Option<Instant>,
    latest_generation: u64,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, EntryState>,
    subscribers: HashMap<QueryKey, HashMap<u64, CacheCallback>>,
    next_subscriber_id: u64,
}

fn lock_inner(inner: &Mutex<CacheInner>) -> MutexGuard<'_, CacheInner> {
    match inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

type PendingNotify = Option<(CacheEntry, Vec<CacheCallback>)>;

/// Keyed store for values fetched from the job-control API.
///
/// Explicitly constructed and passed to the components that need it; cloning
/// is cheap and clones share state. One store per client/session.
#[derive(Clone, Default)]
pub struct CacheStore {
    inner: Arc<Mutex<CacheInner>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the entry for `key`, if one exists. Never triggers a fetch.
    pub fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        let inner = lock_inner(&self.inner);
        Self::snapshot(&inner, key)
    }

    /// Store a value directly: marks the entry fresh, clears any recorded
    /// error, and notifies subscribers of exactly this key.
    pub fn set(&self, key: &QueryKey, value: JsonValue) {
        let pending = {
            let mut inner = lock_inner(&self.inner);
            let state = inner.entries.entry(key.clone()).or_default();
            state.value = Some(value);
            state.error = None;
            state.is_stale = false;
            state.fetched_at = Some(Instant::now());
            debug!("[LINK_CACHE] Set key={}", key);
            Self::pending_notify(&inner, key)
        };
        Self::deliver(pending);
    }

    /// Mark `key` stale, keeping its value, and notify subscribers.
    ///
    /// A key with no entry is left alone: no entry is created, nothing is
    /// notified, and the call succeeds.
    pub fn invalidate(&self, key: &QueryKey) {
        let pending = {
            let mut inner = lock_inner(&self.inner);
            let Some(state) = inner.entries.get_mut(key) else {
                debug!("[LINK_CACHE] Invalidate ignored, no entry for key={}", key);
                return;
            };
            state.is_stale = true;
            debug!("[LINK_CACHE] Invalidated key={}", key);
            Self::pending_notify(&inner, key)
        };
        Self::deliver(pending);
    }

    /// Register a callback for every visible change to `key`.
    ///
    /// The returned handle deregisters the callback when dropped.
    pub fn subscribe(
        &self,
        key: &QueryKey,
        callback: impl Fn(&CacheEntry) + Send + Sync + 'static,
    ) -> CacheSubscription {
        let mut inner = lock_inner(&self.inner);
        let id = inner.next_subscriber_id;
        inner.next_subscriber_id += 1;
        inner
            .subscribers
            .entry(key.clone())
            .or_default()
            .insert(id, Arc::new(callback));
        debug!("[LINK_CACHE] Subscribed id={} key={}", id, key);

        CacheSubscription {
            inner: Arc::clone(&self.inner),
            key: key.clone(),
            id,
        }
    }

    /// Number of callbacks currently subscribed to `key`.
    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        let inner = lock_inner(&self.inner);
        inner.subscribers.get(key).map_or(0, |subs| subs.len())
    }

    /// Number of keys with an entry.
    pub fn len(&self) -> usize {
        lock_inner(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        lock_inner(&self.inner).entries.is_empty()
    }

    /// Open a new fetch generation for `key` and return it.
    ///
    /// Generations are monotonic per key; only the response carrying the
    /// latest generation may write the entry. Creates a pending entry when
    /// the key has none.
    pub fn begin_fetch(&self, key: &QueryKey) -> u64 {
        let mut inner = lock_inner(&self.inner);
        let state = inner.entries.entry(key.clone()).or_default();
        state.latest_generation += 1;
        let generation = state.latest_generation;
        debug!("[LINK_CACHE] Fetch started key={} generation={}", key, generation);
        generation
    }

    /// Apply a successful fetch result, unless `generation` has been
    /// superseded by a newer `begin_fetch` for the same key.
    ///
    /// Returns `true` when the value was written.
    pub fn complete_fetch(&self, key: &QueryKey, generation: u64, value: JsonValue) -> bool {
        let pending = {
            let mut inner = lock_inner(&self.inner);
            let Some(state) = inner.entries.get_mut(key) else {
                debug!("[LINK_CACHE] Fetch result for unknown key={}", key);
                return false;
            };
            if generation != state.latest_generation {
                debug!(
                    "[LINK_CACHE] Discarding superseded fetch: key={} generation={} latest={}",
                    key, generation, state.latest_generation
                );
                return false;
            }
            state.value = Some(value);
            state.error = None;
            state.is_stale = false;
            state.fetched_at = Some(Instant::now());
            debug!("[LINK_CACHE] Fetch applied key={} generation={}", key, generation);
            Self::pending_notify(&inner, key)
        };
        Self::deliver(pending);
        true
    }

    /// Record a failed fetch, unless `generation` has been superseded.
    ///
    /// The previous value is kept so consumers can keep rendering last-good
    /// data next to the error. Returns `true` when the error was recorded.
    pub fn fail_fetch(&self, key: &QueryKey, generation: u64, error: KilnLinkError) -> bool {
        let pending = {
            let mut inner = lock_inner(&self.inner);
            let Some(state) = inner.entries.get_mut(key) else {
                debug!("[LINK_CACHE] Fetch failure for unknown key={}", key);
                return false;
            };
            if generation != state.latest_generation {
                debug!(
                    "[LINK_CACHE] Discarding superseded fetch failure: key={} generation={}",
                    key, generation
                );
                return false;
            }
            warn!(
                "[LINK_CACHE] Fetch failed: key={} generation={} error={}",
                key, generation, error
            );
            state.error = Some(error);
            // The attempt consumed the stale mark; a failed refetch must not
            // reschedule itself.
            state.is_stale = false;
            Self::pending_notify(&inner, key)
        };
        Self::deliver(pending);
        true
    }

    fn snapshot(inner: &CacheInner, key: &QueryKey) -> Option<CacheEntry> {
        inner.entries.get(key).map(|state| CacheEntry {
            value: state.value.clone(),
            error: state.error.clone(),
            is_stale: state.is_stale,
            fetched_at: state.fetched_at,
            subscriber_count: inner.subscribers.get(key).map_or(0, |subs| subs.len()),
        })
    }

    // Collect the snapshot and callbacks under the lock; invoke after release.
    fn pending_notify(inner: &CacheInner, key: &QueryKey) -> PendingNotify {
        let snapshot = Self::snapshot(inner, key)?;
        let callbacks: Vec<CacheCallback> = inner
            .subscribers
            .get(key)
            .map(|subs| subs.values().cloned().collect())
            .unwrap_or_default();
        if callbacks.is_empty() {
            return None;
        }
        Some((snapshot, callbacks))
    }

    fn deliver(pending: PendingNotify) {
        if let Some((snapshot, callbacks)) = pending {
            for callback in callbacks {
                callback(&snapshot);
            }
        }
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock_inner(&self.inner);
        f.debug_struct("CacheStore")
            .field("entries", &inner.entries.len())
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// Handle for one registered cache subscriber.
///
/// Dropping the handle deregisters the callback.
pub struct CacheSubscription {
    inner: Arc<Mutex<CacheInner>>,
    key: QueryKey,
    id: u64,
}

impl CacheSubscription {
    /// Key this subscription listens on.
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Deregister the callback now instead of at drop time.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for CacheSubscription {
    fn drop(&mut self) {
        let mut inner = lock_inner(&self.inner);
        if let Some(subs) = inner.subscribers.get_mut(&self.key) {
            subs.remove(&self.id);
            if subs.is_empty() {
                inner.subscribers.remove(&self.key);
            }
        }
        debug!("[LINK_CACHE] Unsubscribed id={} key={}", self.id, self.key);
    }
}

impl fmt::Debug for CacheSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheSubscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}
