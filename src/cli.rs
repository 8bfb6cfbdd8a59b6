//! Command-line interface definitions.
//!
//! This module defines the CLI arguments using the `clap` crate. Unknown
//! `--region`/`--category` values are rejected at parse time, which is
//! how bad filter values become fatal configuration errors before any
//! network activity.

use crate::models::{Category, Region};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one scraping run.
///
/// # Examples
///
/// ```sh
/// # Scrape every region into a timestamped file under scraped_data/
/// news_harvester
///
/// # European technology sources only, 2 articles per source
/// news_harvester --region europe --category technology --articles 2
///
/// # Explicit output path with more aggressive retrying
/// news_harvester --output run.json --retry 5
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output file for the scraped article JSON array
    /// (default: scraped_data/articles_<timestamp>.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Retries per URL beyond the first attempt
    #[arg(long, default_value_t = 3)]
    pub retry: u32,

    /// Limit the number of sources scraped per region
    #[arg(long)]
    pub sources: Option<usize>,

    /// Limit the number of articles scraped per source
    #[arg(long)]
    pub articles: Option<usize>,

    /// Only scrape sources with this category
    #[arg(long, value_enum)]
    pub category: Option<Category>,

    /// Only scrape sources in this region
    #[arg(long, value_enum)]
    pub region: Option<Region>,
}
