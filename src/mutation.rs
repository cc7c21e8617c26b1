//! Write path: server mutations with declared cache invalidation.
//!
//! Mutations never write fetched data into the cache. They run the server
//! operation and then mark the declared keys stale, which makes active
//! watches re-read from the server. Two policies exist: invalidate on
//! success only, or invalidate regardless of outcome for operations where
//! the server state may have changed either way.

use crate::cache::CacheStore;
use crate::error::Result;
use crate::keys::QueryKey;
use log::{debug, warn};
use serde_json::Value as JsonValue;
use std::future::Future;
use std::time::Instant;

/// Executes mutations and applies their invalidation lists.
#[derive(Clone)]
pub struct MutationRunner {
    cache: CacheStore,
}

impl MutationRunner {
    pub fn new(cache: CacheStore) -> Self {
        Self { cache }
    }

    /// The store this runner invalidates into.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Run a mutation; on success invalidate every listed key.
    ///
    /// On failure nothing is invalidated and the error propagates, leaving
    /// all cached state exactly as it was.
    pub async fn run<Fut>(&self, operation: Fut, invalidates: &[QueryKey]) -> Result<JsonValue>
    where
        Fut: Future<Output = Result<JsonValue>>,
    {
        let start = Instant::now();
        match operation.await {
            Ok(value) => {
                self.invalidate_all(invalidates);
                debug!(
                    "[LINK_MUTATION] Mutation succeeded: invalidated=[{}] duration_ms={}",
                    join_keys(invalidates),
                    start.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(error) => {
                warn!(
                    "[LINK_MUTATION] Mutation failed, cache untouched: error={} duration_ms={}",
                    error,
                    start.elapsed().as_millis()
                );
                Err(error)
            }
        }
    }

    /// Run a mutation and invalidate every listed key regardless of outcome.
    ///
    /// Used for lifecycle transitions where the server's answer, success or
    /// error, is authoritative and the cache must re-fetch either way.
    pub async fn run_reconciling<Fut>(
        &self,
        operation: Fut,
        invalidates: &[QueryKey],
    ) -> Result<JsonValue>
    where
        Fut: Future<Output = Result<JsonValue>>,
    {
        let start = Instant::now();
        let result = operation.await;
        self.invalidate_all(invalidates);
        match &result {
            Ok(_) => debug!(
                "[LINK_MUTATION] Mutation succeeded: invalidated=[{}] duration_ms={}",
                join_keys(invalidates),
                start.elapsed().as_millis()
            ),
            Err(error) => warn!(
                "[LINK_MUTATION] Mutation failed, invalidated=[{}] anyway: error={} duration_ms={}",
                join_keys(invalidates),
                error,
                start.elapsed().as_millis()
            ),
        }
        result
    }

    fn invalidate_all(&self, keys: &[QueryKey]) {
        for key in keys {
            self.cache.invalidate(key);
        }
    }
}

fn join_keys(keys: &[QueryKey]) -> String {
    keys.iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KilnLinkError;
    use crate::keys;
    use serde_json::json;

    #[tokio::test]
    async fn test_success_invalidates_listed_keys() {
        let cache = CacheStore::new();
        let runner = MutationRunner::new(cache.clone());
        let jobs_key = keys::jobs();
        let job_key = keys::job(7);

        cache.set(&jobs_key, json!([{"id": 7}]));
        cache.set(&job_key, json!({"id": 7}));

        let value = runner
            .run(async { Ok(json!({"id": 7, "status": "queued"})) }, &[
                jobs_key.clone(),
                job_key.clone(),
            ])
            .await
            .unwrap();

        assert_eq!(value["status"], "queued");
        assert!(cache.get(&jobs_key).unwrap().is_stale);
        assert!(cache.get(&job_key).unwrap().is_stale);
    }

    #[tokio::test]
    async fn test_failure_leaves_cache_untouched() {
        let cache = CacheStore::new();
        let runner = MutationRunner::new(cache.clone());
        let key = keys::jobs();

        cache.set(&key, json!([{"id": 1}]));

        let result = runner
            .run(
                async { Err(KilnLinkError::NetworkError("refused".to_string())) },
                &[key.clone()],
            )
            .await;

        assert!(result.is_err());
        let entry = cache.get(&key).unwrap();
        assert!(!entry.is_stale, "Failed mutation must not invalidate");
        assert!(entry.is_fresh());
    }

    #[tokio::test]
    async fn test_reconciling_invalidates_on_failure_too() {
        let cache = CacheStore::new();
        let runner = MutationRunner::new(cache.clone());
        let key = keys::job(7);

        cache.set(&key, json!({"id": 7, "status": "running"}));

        let result = runner
            .run_reconciling(
                async {
                    Err(KilnLinkError::ServerError {
                        status_code: 409,
                        message: "Conflict: job is already running".to_string(),
                    })
                },
                &[key.clone()],
            )
            .await;

        assert!(result.is_err());
        assert!(
            cache.get(&key).unwrap().is_stale,
            "Reconciling mutation must invalidate even on failure"
        );
    }

    #[tokio::test]
    async fn test_invalidating_absent_keys_is_harmless() {
        let cache = CacheStore::new();
        let runner = MutationRunner::new(cache.clone());

        let value = runner
            .run(async { Ok(json!("ok")) }, &[keys::jobs(), keys::job(1)])
            .await
            .unwrap();

        assert_eq!(value, json!("ok"));
        assert!(cache.get(&keys::jobs()).is_none(), "No entries should be created");
    }
}
