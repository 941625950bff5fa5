//! Pokedex CLI - An interactive PokeAPI client
//!
//! Pages through location areas, explores encounters and catches pokemon,
//! with upstream responses held in an expiring in-memory cache.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod pokedex;
pub mod repl;
mod tasks;

pub use cache::ExpiringCache;
pub use config::Config;
pub use fetch::{CachedFetcher, Fetcher, HttpFetcher};
pub use repl::Session;
