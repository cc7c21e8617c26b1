//! `QueryWatch` – consumer handle for a continuously observed key.
//!
//! A watch subscribes to one cache key, performs the initial read, reacts to
//! invalidations by refetching, and optionally polls on a fixed cadence. One
//! background task per watch handles the refetch commands and the poll timer;
//! closing the watch stops both immediately.

use crate::cache::{CacheEntry, CacheSubscription};
use crate::error::Result;
use crate::keys::QueryKey;
use crate::query::{FetchFn, QueryOptions, QueryRunner};
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Capacity for the snapshot channel between the cache and a watch consumer.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

enum WatchCmd {
    Refetch,
}

impl QueryRunner {
    /// Observe `key` continuously.
    ///
    /// Performs the initial read (when enabled), subscribes to the key, and
    /// spawns a background task that refetches after invalidations and on
    /// the optional poll interval. An initial fetch failure is recorded on
    /// the cache entry and arrives through the snapshot stream rather than
    /// failing the watch.
    ///
    /// A disabled watch still observes cache changes but never fetches.
    pub async fn watch(&self, key: &QueryKey, fetch: FetchFn, options: QueryOptions) -> QueryWatch {
        let (snapshot_tx, event_rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = oneshot::channel();

        let enabled = options.enabled;
        let subscription = self.cache().subscribe(key, move |entry| {
            // A slow consumer drops intermediate snapshots; the cache stays
            // authoritative.
            let _ = snapshot_tx.try_send(entry.clone());
            if enabled && entry.is_stale {
                let _ = cmd_tx.send(WatchCmd::Refetch);
            }
        });

        let task_handle = tokio::spawn(watch_task(
            self.clone(),
            key.clone(),
            Arc::clone(&fetch),
            if enabled { options.poll_interval() } else { None },
            cmd_rx,
            close_rx,
        ));

        if enabled {
            let _ = self.query(key, fetch, &options).await;
        }

        QueryWatch {
            key: key.clone(),
            event_rx,
            close_tx: Some(close_tx),
            _task_handle: Some(task_handle),
            subscription: Some(subscription),
            closed: false,
        }
    }
}

async fn watch_task(
    runner: QueryRunner,
    key: QueryKey,
    fetch: FetchFn,
    poll_interval: Option<Duration>,
    mut cmd_rx: mpsc::UnboundedReceiver<WatchCmd>,
    mut close_rx: oneshot::Receiver<()>,
) {
    // First poll fires one period after the initial read, not immediately.
    let mut poll = poll_interval.map(|period| {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    if let Some(period) = poll_interval {
        debug!("[LINK_POLL] Polling every {:?}: key={}", period, key);
    }

    loop {
        tokio::select! {
            _ = &mut close_rx => {
                debug!("[LINK_POLL] Watch closed: key={}", key);
                break;
            }
            cmd = cmd_rx.recv() => match cmd {
                Some(WatchCmd::Refetch) => {
                    debug!("[LINK_POLL] Refetch after invalidation: key={}", key);
                    let _ = runner.refetch(&key, Arc::clone(&fetch)).await;
                }
                None => break,
            },
            _ = next_tick(&mut poll) => {
                debug!("[LINK_POLL] Poll tick: key={}", key);
                let _ = runner.refetch(&key, Arc::clone(&fetch)).await;
            }
        }
    }
}

async fn next_tick(poll: &mut Option<tokio::time::Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Live view of one cached key.
///
/// # Examples
///
/// ```rust,no_run
/// use kiln_link::KilnLinkClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = KilnLinkClient::builder()
///     .base_url("http://localhost:8000")
///     .build()?;
///
/// let mut watch = client.jobs().watch_logs(7).await;
///
/// while let Some(entry) = watch.next().await {
///     if let Some(logs) = entry.value {
///         println!("logs: {}", logs);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct QueryWatch {
    key: QueryKey,
    /// Receives entry snapshots forwarded from the cache subscription.
    event_rx: mpsc::Receiver<CacheEntry>,
    /// Signal the background task to initiate graceful shutdown.
    /// `None` after `close()` has been called (or consumed by `Drop`).
    close_tx: Option<oneshot::Sender<()>>,
    /// Handle to the background poll/refetch task.
    _task_handle: Option<JoinHandle<()>>,
    /// Cache registration; dropping it stops snapshot delivery.
    subscription: Option<CacheSubscription>,
    closed: bool,
}

impl QueryWatch {
    /// Receive the next entry snapshot.
    ///
    /// Returns `None` once the watch is closed.
    pub async fn next(&mut self) -> Option<CacheEntry> {
        if self.closed {
            return None;
        }
        match self.event_rx.recv().await {
            Some(entry) => Some(entry),
            None => {
                self.closed = true;
                None
            }
        }
    }

    /// Key this watch observes.
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Close the watch gracefully.
    ///
    /// Safe to call multiple times; subsequent calls are no-ops. Polling and
    /// refetching stop immediately; a fetch already in flight may still
    /// resolve and write the cache for other subscribers, but nothing more
    /// is delivered here.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Deregister from the cache first so no further snapshot is queued.
        self.subscription.take();

        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(());
        }

        Ok(())
    }

    /// Alias for [`close`](Self::close).
    pub async fn stop(&mut self) -> Result<()> {
        self.close().await
    }

    /// Returns `true` if `close()` has been called or the stream ended.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for QueryWatch {
    fn drop(&mut self) {
        self.subscription.take();
        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(());
        }
    }
}
