//! Configuration Module
//!
//! Handles loading client configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_INTERVAL_SECS;

/// Default PokeAPI base URL
pub const DEFAULT_API_URL: &str = "https://pokeapi.co/api/v2/";

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the catalog API, always ending in `/`
    pub api_url: String,
    /// Cache entry lifetime and reap interval in seconds
    pub cache_interval: u64,
    /// HTTP request timeout in seconds
    pub http_timeout: u64,
    /// Number of location areas per `map` page
    pub page_size: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `POKEDEX_API_URL` - Catalog base URL (default: https://pokeapi.co/api/v2/)
    /// - `CACHE_INTERVAL` - Cache lifetime in seconds (default: 300)
    /// - `HTTP_TIMEOUT` - Request timeout in seconds (default: 30)
    /// - `PAGE_SIZE` - Locations per page (default: 20)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_url: env::var("POKEDEX_API_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| normalize_base_url(&v))
                .unwrap_or(defaults.api_url),
            cache_interval: env::var("CACHE_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&v| v > 0)
                .unwrap_or(defaults.cache_interval),
            http_timeout: env::var("HTTP_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_timeout),
            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&v| v > 0)
                .unwrap_or(defaults.page_size),
        }
    }

    /// Cache interval as a Duration.
    pub fn cache_interval(&self) -> Duration {
        Duration::from_secs(self.cache_interval)
    }

    /// Request timeout as a Duration.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cache_interval: DEFAULT_INTERVAL_SECS,
            http_timeout: 30,
            page_size: 20,
        }
    }
}

/// Trims whitespace and guarantees exactly one trailing slash.
pub fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}
