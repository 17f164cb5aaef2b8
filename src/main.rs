//! # News Ticker
//!
//! Server-side functions for a political-news site: a scraper that fills the
//! news ticker table from external pages, and an admin login that issues
//! time-limited sessions. Both run against a hosted Supabase project.
//!
//! ## Usage
//!
//! ```sh
//! news_ticker serve --bind 0.0.0.0:3000
//! news_ticker scrape -j ./runs
//! news_ticker hash-password 'hunter2'
//! ```
//!
//! ## Architecture
//!
//! A scrape pass follows a pipeline architecture:
//! 1. **Fetching**: Download each configured source page, sequentially
//! 2. **Extraction**: Locate candidate article blocks with the source's strategy
//! 3. **Normalization & filtering**: Clean fields, resolve URLs, keep relevant rows
//! 4. **Ranking**: Drop repeated titles, political sources first
//! 5. **Persistence**: Insert in batches of 10, then cap the table at 100 rows

use chrono::Utc;
use clap::Parser;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod auth;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod store;
mod utils;

use api::AppState;
use cli::{Cli, Command};
use config::Settings;
use outputs::json;
use scrapers::fetch::HttpFetcher;
use store::SupabaseStore;
use utils::ensure_writable_dir;

/// Error type for fallible internals; `Send + Sync` so it can cross await points in handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    let Cli {
        config,
        supabase_url,
        supabase_key,
        command,
    } = Cli::parse();
    debug!(?config, "Parsed CLI arguments");

    if let Command::HashPassword { password } = &command {
        println!("{}", auth::hash_password(password)?);
        return Ok(());
    }

    let settings = Settings::load(config.as_deref()).await?;
    let url = supabase_url.ok_or("SUPABASE_URL not set")?;
    let key = supabase_key.ok_or("SUPABASE_SERVICE_ROLE_KEY not set")?;
    let store = SupabaseStore::new(&url, &key, &settings);
    let fetcher = HttpFetcher::new(&settings.user_agent, settings.request_timeout())?;
    info!("External clients initialized");

    match command {
        Command::Serve { bind } => {
            let state = AppState {
                settings,
                fetcher,
                store,
            };
            api::serve(state, &bind).await?;
        }
        Command::Scrape { json_output_dir } => {
            // Early check: fail before scraping rather than after
            if let Some(dir) = &json_output_dir {
                ensure_writable_dir(dir).await?;
            }

            let report = pipeline::run_scrape(&fetcher, &store, &settings).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);

            if let Some(dir) = &json_output_dir {
                json::write_report(&report, dir, Utc::now()).await?;
            }

            let elapsed = start_time.elapsed();
            info!(
                ?elapsed,
                total_scraped = report.stats.total_scraped,
                unique = report.stats.unique_articles,
                inserted = report.stats.inserted,
                "Execution complete"
            );
        }
        Command::HashPassword { .. } => {}
    }

    Ok(())
}
