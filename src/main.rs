//! Pokedex CLI - An interactive PokeAPI client
//!
//! Pages through location areas, explores encounters and catches pokemon,
//! with upstream responses held in an expiring in-memory cache.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokedex_cli::{repl, CachedFetcher, Config, ExpiringCache, HttpFetcher, Session};

/// Main entry point for the Pokedex REPL.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber on stderr
/// 2. Load configuration from environment variables
/// 3. Create the response cache (starts its reaper)
/// 4. Build the HTTP fetcher and caching facade
/// 5. Run the REPL on stdin/stdout until exit, EOF or Ctrl+C
/// 6. Stop the cache reaper
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with REPL output.
    // Defaults to warnings only, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokedex_cli=warn,pokedex=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: api_url={}, cache_interval={}s, http_timeout={}s, page_size={}",
        config.api_url, config.cache_interval, config.http_timeout, config.page_size
    );

    let cache = Arc::new(ExpiringCache::new(config.cache_interval()));
    debug!("Response cache initialized");

    let upstream =
        HttpFetcher::new(config.http_timeout()).context("failed to build HTTP client")?;
    let mut session = Session::new(CachedFetcher::new(cache.clone(), upstream), &config);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    let interrupted = tokio::select! {
        result = repl::run(&mut session, stdin, &mut stdout) => {
            result.context("REPL terminated on an I/O error")?;
            false
        }
        _ = shutdown_signal() => {
            println!();
            info!("Received Ctrl+C, exiting");
            true
        }
    };

    cache.shutdown().await;
    info!("Pokedex shutdown complete");

    // A stdin read still in flight would hold up runtime teardown
    if interrupted {
        std::process::exit(130);
    }

    Ok(())
}

/// Waits for Ctrl+C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
