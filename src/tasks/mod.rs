//! Background Tasks Module
//!
//! Contains background tasks that run alongside the REPL.
//!
//! # Tasks
//! - Reaper: evicts cache entries older than the cache interval

mod reaper;

pub use reaper::spawn_reap_task;
