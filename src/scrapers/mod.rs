//! Chart scrapers, one per source.
//!
//! Each scraper runs the same straight line: read the source, normalize its
//! entries, tabulate, then preview and write the CSV.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Fallback |
//! |--------|--------|--------|----------|
//! | Apple Podcasts | [`apple`] | iTunes RSS JSON API | genre-filtered feed |
//! | Spotify Podcast Charts | [`spotify`] | charts JSON API | trending chart |
//! | Podscribe | [`podscribe`] | saved HTML page | none |
//!
//! The two JSON sources implement [`JsonChart`] and share [`run_json_chart`].
//! A failing run is logged and reported, and yields `None`; it never stops
//! the scrapers that come after it.

use crate::error::ChartError;
use crate::fetch::HttpSource;
use crate::models::{PUBLISHER, PODCAST_TITLE, PipelineOutcome, RankedTable, SourceVariant};
use crate::normalize::{FieldRule, columns_of, normalize_all};
use crate::outputs::{csv_file, dump, preview};
use crate::report::Reporter;
use crate::utils::{dated_filename, truncate_for_log};
use chrono::NaiveDate;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};

pub mod apple;
pub mod podscribe;
pub mod spotify;

/// Where and how a run writes its results.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub output_dir: PathBuf,
    pub preview_rows: usize,
    /// Date stamped into output filenames.
    pub date: NaiveDate,
}

/// Primary and fallback URLs of a JSON chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub primary: String,
    pub fallback: String,
}

/// A JSON chart API and how to read it.
pub trait JsonChart {
    /// Short name used in logs, reports and the debug dump filename.
    const NAME: &'static str;
    /// Filename prefix of the CSV output.
    const FILE_PREFIX: &'static str;
    /// Filename segment marking data that came from the fallback endpoint.
    const FALLBACK_LABEL: &'static str;
    const DEFAULT_PRIMARY: &'static str;
    const DEFAULT_FALLBACK: &'static str;
    /// Sent as `Referer` on every request, if set.
    const REFERER: Option<&'static str> = None;

    /// Locate the entry list inside a decoded response.
    fn entries(raw: &Value) -> Result<Vec<&Value>, ChartError>;

    /// Field rules for the data returned by `variant`.
    fn rules(variant: SourceVariant) -> &'static [FieldRule];

    /// Columns shown in the console preview; empty means all.
    fn preview_columns() -> &'static [&'static str] {
        &[]
    }

    fn heading(variant: SourceVariant) -> &'static str;

    fn default_endpoints() -> Endpoints {
        Endpoints {
            primary: Self::DEFAULT_PRIMARY.to_string(),
            fallback: Self::DEFAULT_FALLBACK.to_string(),
        }
    }
}

/// Run a JSON chart end to end. Returns `None` when the run ended without
/// writing a CSV; the reason has been logged and reported.
pub async fn run_json_chart<C: JsonChart>(
    source: &HttpSource,
    endpoints: &Endpoints,
    ctx: &RunContext,
    reporter: &dyn Reporter,
) -> Option<PipelineOutcome> {
    match try_run_json_chart::<C>(source, endpoints, ctx, reporter).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!(pipeline = C::NAME, error = %e, "Pipeline ended without output");
            reporter.failure(C::NAME, &e.to_string());
            None
        }
    }
}

#[instrument(level = "info", skip_all, fields(pipeline = C::NAME))]
async fn try_run_json_chart<C: JsonChart>(
    source: &HttpSource,
    endpoints: &Endpoints,
    ctx: &RunContext,
    reporter: &dyn Reporter,
) -> Result<PipelineOutcome, ChartError> {
    info!(url = %endpoints.primary, "Fetching chart");
    let (raw, variant) = source
        .get_json_with_fallback(&endpoints.primary, &endpoints.fallback)
        .await?;
    if let Some(obj) = raw.as_object() {
        debug!(keys = ?obj.keys().collect::<Vec<_>>(), "Response structure");
    }

    let entries = C::entries(&raw)?;
    if entries.is_empty() {
        return Err(ChartError::NoRecords);
    }
    debug!(
        first = %truncate_for_log(&entries[0].to_string(), 500),
        "First entry structure"
    );

    let rules = C::rules(variant);
    let records = normalize_all(rules, entries.iter().copied());
    if records.is_empty() {
        return Err(ChartError::NoRecords);
    }
    for (i, record) in records.iter().take(3).enumerate() {
        debug!(
            position = i + 1,
            title = record.get(PODCAST_TITLE).unwrap_or_default(),
            publisher = record.get(PUBLISHER).unwrap_or_default(),
            "Normalized podcast"
        );
    }

    let table = RankedTable::new(&columns_of(rules), records);
    let variant_label = match variant {
        SourceVariant::Primary => None,
        SourceVariant::Fallback => Some(C::FALLBACK_LABEL),
    };
    let outcome = write_outputs(
        C::NAME,
        C::FILE_PREFIX,
        variant_label,
        C::heading(variant),
        C::preview_columns(),
        &table,
        variant,
        ctx,
        reporter,
    )
    .await?;

    if !table.all_titles_unknown() {
        return Ok(outcome);
    }

    warn!(pipeline = C::NAME, "All podcast titles are 'Unknown'; the API structure may have changed");
    let dump_path = ctx
        .output_dir
        .join(format!("{}_api_response_debug.json", C::NAME));
    reporter.warning(
        C::NAME,
        &format!(
            "All podcast titles are 'Unknown'. The API structure may have changed. Dumping raw data to '{}' for inspection",
            dump_path.display()
        ),
    );
    match dump::dump_raw(&raw, &dump_path).await {
        Ok(()) => Ok(PipelineOutcome {
            debug_dump: Some(dump_path),
            ..outcome
        }),
        Err(e) => {
            error!(error = %e, path = %dump_path.display(), "Failed writing debug dump");
            Ok(outcome)
        }
    }
}

/// Preview `table` and write it as `<prefix>_<variant?>_<date>.csv`.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn write_outputs(
    name: &str,
    prefix: &str,
    variant_label: Option<&str>,
    heading: &str,
    preview_columns: &[&str],
    table: &RankedTable,
    variant: SourceVariant,
    ctx: &RunContext,
    reporter: &dyn Reporter,
) -> Result<PipelineOutcome, ChartError> {
    reporter.preview(
        heading,
        &preview::render_preview(table, preview_columns, ctx.preview_rows),
    );

    let csv_path = ctx
        .output_dir
        .join(dated_filename(prefix, variant_label, ctx.date, "csv"));
    csv_file::write_table(table, &csv_path).await?;
    info!(pipeline = name, rows = table.len(), path = %csv_path.display(), "Extracted podcasts");
    reporter.success(name, table.len(), &csv_path);

    Ok(PipelineOutcome {
        csv_path,
        rows: table.len(),
        variant,
        debug_dump: None,
    })
}
