//! Podscribe top podcasts scraper.
//!
//! Works on a copy of the Podscribe rankings page saved from a browser. The
//! page is a Material-UI render with generated class names; each ranked show
//! is a `.jss589` element. Only the title and the monthly listener figure are
//! extracted.
//!
//! # Listener Heuristic
//!
//! The listener figure has no stable class. The first text node of the row
//! that contains a number and looks like an abbreviated count (`K` on a
//! string longer than one character, or any `M` or `.`) is taken. This
//! matches the saved sample; it will pick the wrong node if the page layout
//! changes.

use super::{RunContext, write_outputs};
use crate::error::ChartError;
use crate::fetch::read_html;
use crate::models::{
    MONTHLY_LISTENERS, NOT_AVAILABLE, NormalizedRecord, PODCAST_TITLE, PipelineOutcome,
    RankedTable, SourceVariant, UNKNOWN,
};
use crate::report::Reporter;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use tracing::{debug, error, info, instrument};

pub const NAME: &str = "podscribe";
pub const FILE_PREFIX: &str = "podscribe_podcast_rankings";
pub const DEFAULT_HTML_FILE: &str = "Podcast transcripts, sponsors, and audience data - Podscribe.html";
pub const COLUMNS: [&str; 2] = [PODCAST_TITLE, MONTHLY_LISTENERS];

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".jss589").expect("valid row selector"));
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h3, .jss590, .MuiTypography-root").expect("valid title selector")
});
static COUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(\.\d+)?[KMkm]?").expect("valid count pattern"));

/// Title text of a row, trimmed.
fn title_of(row: ElementRef<'_>) -> String {
    row.select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Whether a raw text node looks like a listener count.
pub fn looks_like_listener_count(text: &str) -> bool {
    let trimmed = text.trim();
    COUNT_PATTERN.is_match(trimmed)
        && ((trimmed.chars().count() > 1 && text.contains('K'))
            || text.contains('M')
            || text.contains('.'))
}

fn listeners_of(row: ElementRef<'_>) -> String {
    row.text()
        .find(|t| looks_like_listener_count(t))
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Extract one record per ranked row of a Podscribe page.
///
/// # Errors
///
/// [`ChartError::UnexpectedShape`] when no row matches the expected class.
pub fn parse_rows(html: &str) -> Result<Vec<NormalizedRecord>, ChartError> {
    let document = Html::parse_document(html);
    let records: Vec<NormalizedRecord> = document
        .select(&ROW_SELECTOR)
        .map(|row| {
            NormalizedRecord::new()
                .with(PODCAST_TITLE, title_of(row))
                .with(MONTHLY_LISTENERS, listeners_of(row))
        })
        .collect();

    if records.is_empty() {
        return Err(ChartError::UnexpectedShape(
            "no podcast rows found with the expected class; the HTML structure might have changed"
                .into(),
        ));
    }
    debug!(rows = records.len(), "Parsed Podscribe rows");
    Ok(records)
}

/// Run the Podscribe pipeline against a saved page. Returns `None` when the
/// run ended without writing a CSV.
pub async fn run(html_file: &Path, ctx: &RunContext, reporter: &dyn Reporter) -> Option<PipelineOutcome> {
    match try_run(html_file, ctx, reporter).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!(pipeline = NAME, error = %e, "Pipeline ended without output");
            reporter.failure(NAME, &e.to_string());
            None
        }
    }
}

#[instrument(level = "info", skip_all, fields(pipeline = NAME, file = %html_file.display()))]
async fn try_run(
    html_file: &Path,
    ctx: &RunContext,
    reporter: &dyn Reporter,
) -> Result<PipelineOutcome, ChartError> {
    let html = read_html(html_file).await?;
    let records = parse_rows(&html)?;
    info!(count = records.len(), "Extracted Podscribe rows");

    let table = RankedTable::new(&COLUMNS, records);
    write_outputs(
        NAME,
        FILE_PREFIX,
        None,
        "Podscribe Top Podcasts",
        &[],
        &table,
        SourceVariant::Primary,
        ctx,
        reporter,
    )
    .await
}
