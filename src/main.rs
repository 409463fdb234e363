//! # newsdesk
//!
//! Serves a fixed-size page of current news. Items come from one configured
//! upstream, either an RSS feed or a scanned HTML page, and are normalized,
//! deduplicated and padded from a curated catalog whenever the upstream is
//! down, slow, or short on results.
//!
//! ## Usage
//!
//! ```sh
//! newsdesk --config ./newsdesk.yaml --bind 0.0.0.0:3000
//! curl localhost:3000/api/news
//! ```
//!
//! ## Architecture
//!
//! Each request to `/api/news` runs the pipeline once:
//! 1. **Fetching**: one GET against the upstream, bounded by a timeout
//! 2. **Extracting**: feed items or headline anchors become raw candidates
//! 3. **Deduping**: first occurrence per link and per title wins
//! 4. **Filling**: normalized live items, padded from the catalog to `N`

use clap::Parser;
use std::error::Error;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cli;
mod config;
mod dedupe;
mod error;
mod extract;
mod fallback;
mod models;
mod normalize;
mod server;
mod sources;
mod utils;

use cli::Cli;
use config::NewsConfig;
use server::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    info!(version = env!("CARGO_PKG_VERSION"), "newsdesk starting up");

    let config = match NewsConfig::load(args.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration rejected");
            return Err(e.into());
        }
    };
    info!(
        upstream = %config.upstream.url,
        kind = ?config.upstream.kind,
        page_size = config.page_size,
        catalog = config.fallback.len(),
        "Configuration ready"
    );

    let state = AppState::new(&config)?;

    if args.once {
        let start_time = std::time::Instant::now();
        let page = state.aggregator.aggregate().await;
        let json = serde_json::to_string_pretty(&page)?;

        match &args.output {
            Some(path) => {
                tokio::fs::write(path, json).await?;
                info!(%path, "Wrote news page");
            }
            None => println!("{json}"),
        }

        let elapsed = start_time.elapsed();
        info!(
            ?elapsed,
            source = %page.source,
            items = page.items.len(),
            "Execution complete"
        );
        return Ok(());
    }

    server::serve(&args.bind, state).await
}
