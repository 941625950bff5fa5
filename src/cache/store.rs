//! Cache Store Module
//!
//! Expiring key-value store for raw response bodies, with a background
//! reaper that evicts entries older than the configured interval.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::CacheEntry;
use crate::tasks::spawn_reap_task;

/// Entry map shared between the cache handle and its reaper.
pub(crate) type SharedEntries = Arc<RwLock<HashMap<String, CacheEntry>>>;

// == Expiring Cache ==
/// In-memory response cache whose entries live for one reap interval.
///
/// Writers (`add`, `remove`, the reaper) take the write lock; readers
/// (`get`, `contains`, `len`) take the read lock. Lookups do not check age
/// themselves, so an entry past its interval stays visible until the next
/// reap pass removes it.
#[derive(Debug)]
pub struct ExpiringCache {
    entries: SharedEntries,
    interval: Duration,
    shutdown: CancellationToken,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl ExpiringCache {
    // == Constructor ==
    /// Creates an empty cache and starts its reaper.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    /// * `interval` - Entry lifetime, also the delay between reap passes
    pub fn new(interval: Duration) -> Self {
        let entries: SharedEntries = Arc::new(RwLock::new(HashMap::new()));
        let shutdown = CancellationToken::new();
        let handle = spawn_reap_task(entries.clone(), interval, shutdown.clone());

        Self {
            entries,
            interval,
            shutdown,
            reaper: Mutex::new(Some(handle)),
        }
    }

    // == Add ==
    /// Stores `payload` under `key`, replacing any previous entry and
    /// resetting its age.
    pub async fn add(&self, key: impl Into<String>, payload: Bytes) {
        let key = key.into();
        let entry = CacheEntry::new(payload);

        let mut entries = self.entries.write().await;
        debug!(key = %key, bytes = entry.payload.len(), "cache add");
        entries.insert(key, entry);
    }

    // == Get ==
    /// Returns the payload stored under `key`, if any.
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.payload.clone())
    }

    // == Remove ==
    /// Deletes the entry for `key`. Absent keys are ignored.
    pub async fn remove(&self, key: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            debug!(key = %key, "cache remove");
        }
    }

    // == Contains ==
    /// Returns true if an entry for `key` is present.
    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    // == Length ==
    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// The entry lifetime this cache was built with.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == Reap Expired ==
    /// Runs one reap pass immediately.
    ///
    /// Returns the number of entries removed.
    pub async fn reap_expired(&self) -> usize {
        reap_expired(&self.entries, self.interval).await
    }

    // == Shutdown ==
    /// Stops the reaper and waits for it to exit.
    ///
    /// Safe to call more than once; later calls return immediately.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let handle = match self.reaper.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "cache reaper exited abnormally");
            }
        }
    }

    /// Returns true once the reaper has been told to stop.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for ExpiringCache {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Removes every entry older than `ttl` from `entries`.
///
/// Keys are collected under the write lock first and deleted afterwards so
/// the map is never mutated while it is being iterated.
pub(crate) async fn reap_expired(
    entries: &RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
) -> usize {
    let mut entries = entries.write().await;

    let expired_keys: Vec<String> = entries
        .iter()
        .filter(|(_, entry)| entry.is_expired(ttl))
        .map(|(key, _)| key.clone())
        .collect();

    let count = expired_keys.len();

    for key in expired_keys {
        entries.remove(&key);
    }

    count
}
