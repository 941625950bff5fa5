//! Cache Module
//!
//! Provides the in-memory response cache with interval-based expiration.

mod entry;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use store::ExpiringCache;

pub(crate) use store::{reap_expired, SharedEntries};

// == Public Constants ==
/// Default entry lifetime and reap interval, in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 300;
