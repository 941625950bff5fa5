//! Fetch Module
//!
//! Network access for the command layer.
//!
//! # Components
//! - `Fetcher` - the seam every upstream implements
//! - `HttpFetcher` - reqwest-backed upstream
//! - `CachedFetcher` - lookaside facade over any `Fetcher` and an `ExpiringCache`

mod cached;
mod http;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

pub use cached::CachedFetcher;
pub use http::HttpFetcher;

/// Something that can turn a request identity (a URL) into a response body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the full body for `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}
