//! Read path: cache-aware fetch execution.
//!
//! [`QueryRunner`] decides whether a read is served from the cache or goes to
//! the network, and guarantees that concurrent readers of one key share a
//! single in-flight fetch. Results are applied through the store's
//! generation guard, so a response that was superseded by a forced refetch
//! is discarded instead of overwriting newer data.

use crate::cache::{CacheEntry, CacheStore};
use crate::error::{KilnLinkError, Result};
use crate::keys::QueryKey;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// Boxed future returned by a fetch function.
pub type FetchFuture = Pin<Box<dyn Future<Output = Result<JsonValue>> + Send>>;

/// Fetch function: produces a fresh future per invocation so one function
/// can serve initial fetches, refetches, and poll ticks alike.
pub type FetchFn = Arc<dyn Fn() -> FetchFuture + Send + Sync>;

/// Wrap an async closure into a [`FetchFn`].
pub fn fetch_fn<F, Fut>(f: F) -> FetchFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<JsonValue>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()))
}

/// Per-query behavior switches.
///
/// # Examples
///
/// ```rust
/// use kiln_link::QueryOptions;
///
/// // Defaults: enabled, no polling
/// let opts = QueryOptions::default();
/// assert!(opts.enabled);
///
/// // Poll every two seconds while watched
/// let opts = QueryOptions::new().with_poll_interval_ms(2000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// When false the query reads the cache only and never fetches.
    /// Default: true
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Poll cadence for watches; `None` disables polling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_ms: None,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a query that must not touch the network.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            poll_interval_ms: None,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = Some(interval_ms);
        self
    }

    /// Poll cadence as a `Duration`, when polling is configured.
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_ms.map(Duration::from_millis)
    }
}

type FetchOutcome = std::result::Result<JsonValue, KilnLinkError>;
type WaiterList = Arc<Mutex<Vec<oneshot::Sender<FetchOutcome>>>>;

struct InFlightFetch {
    generation: u64,
    waiters: WaiterList,
}

enum FetchRole {
    Leader { generation: u64, waiters: WaiterList },
    Follower { rx: oneshot::Receiver<FetchOutcome> },
}

fn lock_map(
    map: &Mutex<HashMap<QueryKey, InFlightFetch>>,
) -> MutexGuard<'_, HashMap<QueryKey, InFlightFetch>> {
    match map.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn lock_waiters(waiters: &WaiterList) -> MutexGuard<'_, Vec<oneshot::Sender<FetchOutcome>>> {
    match waiters.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Executes fetches against the cache with deduplication and ordering.
///
/// Cloning is cheap; clones share the in-flight registry and the store.
#[derive(Clone)]
pub struct QueryRunner {
    cache: CacheStore,
    in_flight: Arc<Mutex<HashMap<QueryKey, InFlightFetch>>>,
}

impl QueryRunner {
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The store this runner reads and writes.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Resolve a read for `key`.
    ///
    /// - disabled: returns the cached entry as-is (or an empty pending
    ///   entry), never fetching.
    /// - fresh entry cached: returns it without a network round trip.
    /// - otherwise: fetches, sharing one in-flight request among all
    ///   concurrent callers of this key. Fetch failures are recorded on the
    ///   entry (previous value kept) and returned as `Err`.
    pub async fn query(
        &self,
        key: &QueryKey,
        fetch: FetchFn,
        options: &QueryOptions,
    ) -> Result<CacheEntry> {
        if !options.enabled {
            debug!("[LINK_QUERY] Disabled query served from cache: key={}", key);
            return Ok(self.cache.get(key).unwrap_or_default());
        }

        if let Some(entry) = self.cache.get(key) {
            if entry.is_fresh() {
                debug!("[LINK_QUERY] Cache hit: key={}", key);
                return Ok(entry);
            }
        }

        let role = {
            // Lock order: in-flight registry first, cache store second.
            let mut in_flight = lock_map(&self.in_flight);
            if let Some(flight) = in_flight.get(key) {
                let (tx, rx) = oneshot::channel();
                lock_waiters(&flight.waiters).push(tx);
                debug!(
                    "[LINK_QUERY] Joining in-flight fetch: key={} generation={}",
                    key, flight.generation
                );
                FetchRole::Follower { rx }
            } else {
                let generation = self.cache.begin_fetch(key);
                let waiters: WaiterList = Arc::new(Mutex::new(Vec::new()));
                in_flight.insert(
                    key.clone(),
                    InFlightFetch {
                        generation,
                        waiters: Arc::clone(&waiters),
                    },
                );
                FetchRole::Leader { generation, waiters }
            }
        };

        match role {
            FetchRole::Leader { generation, waiters } => {
                self.run_fetch(key, fetch, generation, waiters).await
            }
            FetchRole::Follower { rx } => match rx.await {
                Ok(Ok(_)) => Ok(self.cache.get(key).unwrap_or_default()),
                Ok(Err(error)) => Err(error),
                Err(_) => Err(KilnLinkError::InternalError(
                    "Shared fetch ended without reporting a result".to_string(),
                )),
            },
        }
    }

    /// Force a fetch for `key`, superseding any fetch already in flight.
    ///
    /// The superseded fetch keeps running; its response is discarded by the
    /// generation guard when it arrives, though its own awaiters still
    /// receive that fetch's outcome.
    pub async fn refetch(&self, key: &QueryKey, fetch: FetchFn) -> Result<CacheEntry> {
        let (generation, waiters) = {
            let mut in_flight = lock_map(&self.in_flight);
            let generation = self.cache.begin_fetch(key);
            let waiters: WaiterList = Arc::new(Mutex::new(Vec::new()));
            in_flight.insert(
                key.clone(),
                InFlightFetch {
                    generation,
                    waiters: Arc::clone(&waiters),
                },
            );
            (generation, waiters)
        };
        self.run_fetch(key, fetch, generation, waiters).await
    }

    async fn run_fetch(
        &self,
        key: &QueryKey,
        fetch: FetchFn,
        generation: u64,
        waiters: WaiterList,
    ) -> Result<CacheEntry> {
        debug!("[LINK_QUERY] Starting fetch: key={} generation={}", key, generation);
        let start = Instant::now();

        let outcome: FetchOutcome = fetch().await;
        let duration_ms = start.elapsed().as_millis();

        match &outcome {
            Ok(value) => {
                let applied = self.cache.complete_fetch(key, generation, value.clone());
                debug!(
                    "[LINK_QUERY] Fetch finished: key={} generation={} applied={} duration_ms={}",
                    key, generation, applied, duration_ms
                );
            }
            Err(error) => {
                let applied = self.cache.fail_fetch(key, generation, error.clone());
                warn!(
                    "[LINK_QUERY] Fetch errored: key={} generation={} applied={} error={} duration_ms={}",
                    key, generation, applied, error, duration_ms
                );
            }
        }

        {
            let mut in_flight = lock_map(&self.in_flight);
            if in_flight.get(key).is_some_and(|f| f.generation == generation) {
                in_flight.remove(key);
            }
        }

        let drained = std::mem::take(&mut *lock_waiters(&waiters));
        for tx in drained {
            let _ = tx.send(outcome.clone());
        }

        match outcome {
            Ok(_) => Ok(self.cache.get(key).unwrap_or_default()),
            Err(error) => Err(error),
        }
    }
}
