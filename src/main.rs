//! # podcast_charts
//!
//! Collects podcast chart rankings and writes each chart to a date-stamped
//! CSV file.
//!
//! ## Sources
//!
//! - Apple Podcasts top 100 (iTunes RSS JSON API, genre feed as fallback)
//! - Spotify podcast charts top 100 (charts JSON API, trending chart as fallback)
//! - Podscribe rankings (a saved copy of the web page)
//!
//! ## Usage
//!
//! ```sh
//! podcast_charts -o ./charts all
//! podcast_charts spotify --preview-rows 20
//! ```
//!
//! ## Architecture
//!
//! Every scraper is the same straight line:
//! 1. **Read**: fetch JSON (one fallback URL) or read the saved HTML
//! 2. **Normalize**: map each entry to fixed columns, sentinel-filling gaps
//! 3. **Tabulate**: rank rows by position
//! 4. **Output**: console preview, then `<source>_podcast_rankings[_variant]_<date>.csv`

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod fetch;
mod models;
mod normalize;
mod outputs;
mod report;
mod scrapers;
mod utils;

use cli::{Cli, Command, EndpointArgs};
use fetch::HttpSource;
use models::PipelineOutcome;
use report::{ConsoleReporter, Reporter};
use scrapers::apple::AppleChart;
use scrapers::spotify::SpotifyChart;
use scrapers::{JsonChart, RunContext, podscribe, run_json_chart};
use utils::{ensure_writable_dir, today};

#[tokio::main(flavor = "current_thread")]
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

    let start_time = std::time::Instant::now();
    info!("podcast_charts starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let ctx = RunContext {
        output_dir: args.output_dir.clone(),
        preview_rows: args.preview_rows,
        date: today(),
    };
    let timeout = Duration::from_secs(args.timeout_secs);
    let reporter = ConsoleReporter;

    let outcomes: Vec<Option<PipelineOutcome>> = match &args.command {
        Command::Apple(endpoints) => {
            vec![run_chart::<AppleChart>(endpoints, timeout, &ctx, &reporter).await?]
        }
        Command::Spotify(endpoints) => {
            vec![run_chart::<SpotifyChart>(endpoints, timeout, &ctx, &reporter).await?]
        }
        Command::Podscribe(html) => vec![podscribe::run(&html.html_file, &ctx, &reporter).await],
        Command::All(html) => {
            let defaults = EndpointArgs::default();
            vec![
                run_chart::<AppleChart>(&defaults, timeout, &ctx, &reporter).await?,
                run_chart::<SpotifyChart>(&defaults, timeout, &ctx, &reporter).await?,
                podscribe::run(&html.html_file, &ctx, &reporter).await,
            ]
        }
    };

    for outcome in outcomes.iter().flatten() {
        info!(
            path = %outcome.csv_path.display(),
            rows = outcome.rows,
            variant = ?outcome.variant,
            debug_dump = ?outcome.debug_dump,
            "Chart written"
        );
    }
    let written = outcomes.iter().flatten().count();
    let elapsed = start_time.elapsed();
    info!(
        requested = outcomes.len(),
        written,
        ?elapsed,
        millis = elapsed.as_millis() as u64,
        "Execution complete"
    );

    Ok(())
}

/// Build the HTTP client for `C` and run its pipeline. Only client
/// construction errors are returned; pipeline failures come back as `None`.
#[instrument(level = "info", skip_all, fields(pipeline = C::NAME))]
async fn run_chart<C: JsonChart>(
    overrides: &EndpointArgs,
    timeout: Duration,
    ctx: &RunContext,
    reporter: &dyn Reporter,
) -> Result<Option<PipelineOutcome>, Box<dyn Error>> {
    let source = HttpSource::new(C::REFERER, timeout)?;
    let endpoints = overrides.resolve(C::default_endpoints());
    Ok(run_json_chart::<C>(&source, &endpoints, ctx, reporter).await)
}
