//! # news_harvester
//!
//! A multi-source news scraping pipeline. Visits a curated catalog of
//! technology, business, and investing outlets across three regions,
//! extracts structured articles despite wildly inconsistent markup, and
//! persists results incrementally so a crash or ban mid-run never loses
//! already-scraped data.
//!
//! ## Usage
//!
//! ```sh
//! news_harvester --region europe --category technology --articles 5
//! ```
//!
//! ## Architecture
//!
//! 1. **Select**: narrow the static source registry by region/category
//! 2. **Discover**: pull article links from each source's index page
//! 3. **Fetch**: HTTP GET with rotating identity and bounded retries
//! 4. **Extract**: selector-rule driven field extraction
//! 5. **Persist**: flush the JSON array after every source; finish with
//!    a run report
//!
//! Downstream clustering and summarization tools consume the output
//! file; they are separate programs.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod coordinator;
mod error;
mod extractor;
mod fetcher;
mod identity;
mod models;
mod outputs;
mod region;
mod sources;
mod state;

use cli::Cli;
use coordinator::RunConfig;
use fetcher::{HttpFetchOnce, RetryingFetcher};
use region::CancelToken;

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
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = RunConfig {
        output: args.output.unwrap_or_else(default_output_path),
        max_retries: args.retry,
        max_sources: args.sources,
        max_articles: args.articles,
        category: args.category,
        region: args.region,
    };
    info!(output = %config.output.display(), "news_harvester starting up");

    // Ctrl-C stops the run at the next source boundary; the last
    // incremental flush stays on disk as valid output.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received; finishing current source then stopping");
                cancel.cancel();
            }
        });
    }

    let fetcher = RetryingFetcher::new(HttpFetchOnce::new(), config.max_retries);

    let report = match coordinator::run(&config, &fetcher, &cancel).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Run aborted");
            return Err(e.into());
        }
    };

    // Console summary, mirroring the run report.
    println!(
        "\nScraping completed. {} articles saved to {}",
        report.total_articles,
        config.output.display()
    );
    println!("\nArticles per source:");
    for (source, count) in &report.by_source {
        println!("- {source}: {count} articles");
    }
    println!("\nArticles per region:");
    for (region, count) in report.by_region.iter().filter(|(_, c)| **c > 0) {
        println!("- {region}: {count} articles");
    }
    println!("\nArticles per category:");
    for (category, count) in report.by_category.iter().filter(|(_, c)| **c > 0) {
        println!("- {category}: {count} articles");
    }
    let failed = report.failed_sources();
    if !failed.is_empty() {
        println!("\nSources with no articles (failed or blocked):");
        for source in failed {
            println!("- {source}");
        }
    }

    Ok(())
}

/// `scraped_data/articles_<YYYYmmdd_HHMMSS>.json`
fn default_output_path() -> PathBuf {
    PathBuf::from("scraped_data").join(format!(
        "articles_{}.json",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}
