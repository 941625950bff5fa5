//! Cache Entry Module
//!
//! Defines a single timestamped response payload held by the cache.

use std::time::{Duration, Instant};

use bytes::Bytes;

// == Cache Entry ==
/// A stored payload and the moment it was inserted.
///
/// The payload is a `Bytes` handle: clones share the buffer but are
/// read-only, so handing one out never exposes the cache's own copy to
/// mutation.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The raw response body
    pub payload: Bytes,
    /// Insertion (or last refresh) time
    pub created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(payload: Bytes) -> Self {
        Self {
            payload,
            created_at: Instant::now(),
        }
    }

    // == Age ==
    /// Time elapsed since the entry was inserted.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `ttl`.
    ///
    /// Boundary condition: an entry whose age equals `ttl` exactly is still
    /// live. It only becomes a reap candidate once its age is strictly
    /// greater.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }
}
