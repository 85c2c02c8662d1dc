//! Data models shared by the chart pipelines.
//!
//! - [`NormalizedRecord`]: one source entry flattened to named string fields
//! - [`RankedTable`]: ordered records plus a position-derived `Rank` column
//! - [`SourceVariant`] / [`PipelineOutcome`]: what a pipeline run produced
//!
//! Every value is a `String`. CSV has no richer type and the sources do not
//! guarantee one either.

use std::path::PathBuf;

/// Column holding the 1-based position of a row in its table.
pub const RANK: &str = "Rank";
pub const PODCAST_TITLE: &str = "Podcast Title";
pub const PUBLISHER: &str = "Publisher";
pub const CATEGORY: &str = "Category";
pub const IMAGE_URL: &str = "Image URL";
pub const APPLE_URL: &str = "Apple URL";
pub const RELEASE_DATE: &str = "Release Date";
pub const SUMMARY: &str = "Summary";
pub const SPOTIFY_ID: &str = "Spotify ID";
pub const DESCRIPTION: &str = "Description";
pub const RANK_MOVEMENT: &str = "Rank Movement";
pub const MONTHLY_LISTENERS: &str = "Monthly Listeners";

/// Sentinel for a missing title or publisher.
pub const UNKNOWN: &str = "Unknown";
/// Sentinel for every other missing field.
pub const NOT_AVAILABLE: &str = "N/A";

/// A single source entry after normalization.
///
/// Fields keep the order in which they were pushed, which is the order of the
/// pipeline's rule table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRecord {
    fields: Vec<(&'static str, String)>,
}

impl NormalizedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: &'static str, value: impl Into<String>) {
        self.fields.push((column, value.into()));
    }

    /// Builder-style variant of [`push`](Self::push).
    pub fn with(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.push(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Records in source order with a fixed column layout.
///
/// The first column is always [`RANK`], derived from row position. The rest
/// follow the column list handed to [`RankedTable::new`]. Input order is the
/// ranking; nothing is sorted, merged or dropped.
#[derive(Debug, Clone)]
pub struct RankedTable {
    columns: Vec<&'static str>,
    records: Vec<NormalizedRecord>,
}

impl RankedTable {
    pub fn new(record_columns: &[&'static str], records: Vec<NormalizedRecord>) -> Self {
        let mut columns = Vec::with_capacity(record_columns.len() + 1);
        columns.push(RANK);
        columns.extend(record_columns.iter().copied().filter(|c| *c != RANK));
        Self { columns, records }
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row `index` (0-based) as strings in column order, rank included.
    /// A column the record lacks is rendered empty.
    pub fn row(&self, index: usize) -> Option<Vec<String>> {
        let record = self.records.get(index)?;
        Some(
            self.columns
                .iter()
                .map(|column| {
                    if *column == RANK {
                        (index + 1).to_string()
                    } else {
                        record.get(column).unwrap_or_default().to_string()
                    }
                })
                .collect(),
        )
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        (0..self.records.len()).filter_map(|i| self.row(i))
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.columns.iter().position(|c| *c == column) else {
            return Vec::new();
        };
        self.rows().map(|mut row| row.swap_remove(idx)).collect()
    }

    /// True when the table has rows and every title fell back to
    /// [`UNKNOWN`], which usually means the upstream field names moved.
    pub fn all_titles_unknown(&self) -> bool {
        !self.records.is_empty()
            && self
                .records
                .iter()
                .all(|r| r.get(PODCAST_TITLE) == Some(UNKNOWN))
    }
}

/// Which endpoint produced the data of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceVariant {
    Primary,
    Fallback,
}

/// Result of a pipeline run that wrote its CSV.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub csv_path: PathBuf,
    pub rows: usize,
    pub variant: SourceVariant,
    /// Raw-response dump written when every title was unknown.
    pub debug_dump: Option<PathBuf>,
}
