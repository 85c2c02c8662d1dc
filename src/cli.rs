//! Command-line interface definitions for podcast_charts.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option has a default matching the stock endpoints and file names, so
//! a bare `podcast_charts all` behaves like running the three scrapers by hand.

use crate::scrapers::Endpoints;
use crate::scrapers::podscribe::DEFAULT_HTML_FILE;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for podcast_charts.
///
/// # Examples
///
/// ```sh
/// # Apple chart into the current directory
/// podcast_charts apple
///
/// # Everything into ./charts, Podscribe from a specific saved page
/// podcast_charts -o ./charts all --html-file ~/Downloads/podscribe.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory the CSV files are written to
    #[arg(short, long, env = "PODCAST_CHARTS_OUTPUT_DIR", default_value = ".", global = true)]
    pub output_dir: PathBuf,

    /// Number of rows shown in the console preview
    #[arg(long, default_value_t = 10, global = true)]
    pub preview_rows: usize,

    /// Overall timeout for each HTTP request, in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apple Podcasts top chart (iTunes RSS JSON)
    Apple(EndpointArgs),
    /// Spotify podcast charts (charts JSON API)
    Spotify(EndpointArgs),
    /// Podscribe rankings from a saved HTML page
    Podscribe(HtmlArgs),
    /// Run every scraper with default endpoints, one after the other
    All(HtmlArgs),
}

/// Endpoint overrides for a JSON chart.
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// Replace the primary chart URL
    #[arg(long, value_parser = parse_url)]
    pub primary_url: Option<String>,

    /// Replace the fallback chart URL
    #[arg(long, value_parser = parse_url)]
    pub fallback_url: Option<String>,
}

impl EndpointArgs {
    /// Apply the overrides on top of `defaults`.
    pub fn resolve(&self, defaults: Endpoints) -> Endpoints {
        Endpoints {
            primary: self.primary_url.clone().unwrap_or(defaults.primary),
            fallback: self.fallback_url.clone().unwrap_or(defaults.fallback),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct HtmlArgs {
    /// Saved Podscribe page to read
    #[arg(long, default_value = DEFAULT_HTML_FILE)]
    pub html_file: PathBuf,
}

fn parse_url(s: &str) -> Result<String, String> {
    url::Url::parse(s)
        .map(|u| u.to_string())
        .map_err(|e| format!("invalid URL `{s}`: {e}"))
}
