//! Apple Podcasts top chart scraper.
//!
//! Reads the iTunes RSS generator's JSON rendering of the US top podcasts
//! chart. Entries live under `feed.entry`; most fields are wrapped as
//! `{"label": ...}` objects and the category sits one level deeper, under
//! `category.attributes.label`.
//!
//! If the main chart cannot be reached, the genre-filtered chart of the same
//! host is used instead. That feed is written with a shorter column set and a
//! `genre` filename segment.

use super::JsonChart;
use crate::error::ChartError;
use crate::models::{
    APPLE_URL, CATEGORY, IMAGE_URL, NOT_AVAILABLE, PODCAST_TITLE, PUBLISHER, RANK, RELEASE_DATE,
    SUMMARY, SourceVariant, UNKNOWN,
};
use crate::normalize::{FieldRule, Step};
use serde_json::Value;

/// Full rule table of the main chart. The genre chart uses the first
/// [`GENRE_FIELD_COUNT`] rules.
pub static RULES: [FieldRule; 7] = [
    FieldRule::new(PODCAST_TITLE, &[&[Step::Key("title"), Step::Key("label")]], UNKNOWN),
    FieldRule::new(PUBLISHER, &[&[Step::Key("im:artist"), Step::Key("label")]], UNKNOWN),
    FieldRule::new(
        CATEGORY,
        &[&[Step::Key("category"), Step::Key("attributes"), Step::Key("label")]],
        NOT_AVAILABLE,
    ),
    // Image variants are ordered smallest first.
    FieldRule::new(
        IMAGE_URL,
        &[&[Step::Key("im:image"), Step::Last, Step::Key("label")]],
        NOT_AVAILABLE,
    ),
    FieldRule::new(APPLE_URL, &[&[Step::Key("id"), Step::Key("label")]], NOT_AVAILABLE),
    FieldRule::new(
        RELEASE_DATE,
        &[&[Step::Key("im:releaseDate"), Step::Key("label")]],
        NOT_AVAILABLE,
    ),
    FieldRule::new(SUMMARY, &[&[Step::Key("summary"), Step::Key("label")]], NOT_AVAILABLE),
];

pub const GENRE_FIELD_COUNT: usize = 5;

#[derive(Debug)]
pub struct AppleChart;

impl JsonChart for AppleChart {
    const NAME: &'static str = "apple";
    const FILE_PREFIX: &'static str = "apple_podcast_rankings";
    const FALLBACK_LABEL: &'static str = "genre";
    const DEFAULT_PRIMARY: &'static str = "https://itunes.apple.com/us/rss/toppodcasts/limit=100/json";
    const DEFAULT_FALLBACK: &'static str =
        "https://itunes.apple.com/us/rss/toppodcasts/genre=1310/limit=100/json";

    /// `feed.entry` is normally an array; a feed with a single entry carries
    /// the bare object instead.
    fn entries(raw: &Value) -> Result<Vec<&Value>, ChartError> {
        let feed = raw
            .get("feed")
            .ok_or_else(|| ChartError::UnexpectedShape("missing `feed` object".into()))?;
        match feed.get("entry") {
            Some(Value::Array(items)) => Ok(items.iter().collect()),
            Some(single @ Value::Object(_)) => Ok(vec![single]),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(ChartError::UnexpectedShape(format!(
                "`feed.entry` is a {}",
                crate::error::json_kind(other)
            ))),
        }
    }

    fn rules(variant: SourceVariant) -> &'static [FieldRule] {
        match variant {
            SourceVariant::Primary => &RULES,
            SourceVariant::Fallback => &RULES[..GENRE_FIELD_COUNT],
        }
    }

    fn preview_columns() -> &'static [&'static str] {
        &[RANK, PODCAST_TITLE, PUBLISHER, CATEGORY]
    }

    fn heading(variant: SourceVariant) -> &'static str {
        match variant {
            SourceVariant::Primary => "Apple Podcasts Rankings",
            SourceVariant::Fallback => "Apple Podcasts Rankings (from genre API)",
        }
    }
}
