//! Lookaside caching in front of an upstream fetcher.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::Fetcher;
use crate::cache::ExpiringCache;
use crate::error::FetchError;

/// Serves repeat requests from the cache and falls back to the upstream on a
/// miss, storing only successful bodies.
///
/// Concurrent misses for the same URL are not coalesced: each caller reaches
/// the upstream and the last completed response is the one that stays cached.
#[derive(Debug)]
pub struct CachedFetcher<F> {
    cache: Arc<ExpiringCache>,
    upstream: F,
}

impl<F: Fetcher> CachedFetcher<F> {
    pub fn new(cache: Arc<ExpiringCache>, upstream: F) -> Self {
        Self { cache, upstream }
    }

    /// The cache this facade reads and populates.
    pub fn cache(&self) -> &Arc<ExpiringCache> {
        &self.cache
    }

    /// The wrapped upstream.
    pub fn upstream(&self) -> &F {
        &self.upstream
    }

    /// Returns the body for `url`, from cache when possible.
    pub async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        if let Some(body) = self.cache.get(url).await {
            debug!(url, "cache hit");
            return Ok(body);
        }

        debug!(url, "cache miss");
        let body = self.upstream.fetch(url).await?;
        self.cache.add(url, body.clone()).await;

        Ok(body)
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for CachedFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        CachedFetcher::fetch(self, url).await
    }
}
