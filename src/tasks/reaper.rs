//! Cache Reaper Task
//!
//! Background task that periodically evicts expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::{reap_expired, SharedEntries};

/// Spawns a background task that evicts entries older than `interval`.
///
/// The task sleeps for `interval` between passes and takes the write lock
/// only for the duration of a pass. Cancelling `shutdown` ends the loop at
/// the next wake-up or immediately if it is sleeping.
///
/// # Arguments
/// * `entries` - Shared entry map owned by the cache
/// * `interval` - Entry lifetime and delay between passes
/// * `shutdown` - Token that stops the loop when cancelled
///
/// # Returns
/// A JoinHandle that resolves once the loop has exited.
///
/// # Example
/// ```ignore
/// let token = CancellationToken::new();
/// let handle = spawn_reap_task(entries.clone(), Duration::from_secs(300), token.clone());
/// // Later, during shutdown:
/// token.cancel();
/// handle.await?;
/// ```
pub fn spawn_reap_task(
    entries: SharedEntries,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(interval_ms = interval.as_millis() as u64, "cache reaper started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = reap_expired(&entries, interval).await;

            if removed > 0 {
                info!("cache reap: removed {} expired entries", removed);
            } else {
                debug!("cache reap: no expired entries found");
            }
        }

        debug!("cache reaper stopped");
    })
}
