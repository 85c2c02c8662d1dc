//! Utility functions for output naming, log truncation, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Date-stamped output filenames
//! - String truncation for logging and preview cells
//! - File system validation for the output directory

use chrono::{Local, NaiveDate};
use std::error::Error;
use std::fs as stdfs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Today's local date, the stamp every output file carries.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Build `<prefix>_<variant>_<YYYY-MM-DD>.<ext>`, omitting the variant part
/// when there is none.
///
/// # Examples
///
/// ```ignore
/// let d = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
/// assert_eq!(dated_filename("apple_podcast_rankings", None, d, "csv"),
///            "apple_podcast_rankings_2025-03-14.csv");
/// assert_eq!(dated_filename("apple_podcast_rankings", Some("genre"), d, "csv"),
///            "apple_podcast_rankings_genre_2025-03-14.csv");
/// ```
pub fn dated_filename(prefix: &str, variant: Option<&str>, date: NaiveDate, ext: &str) -> String {
    let stamp = date.format("%Y-%m-%d");
    match variant {
        Some(v) if !v.is_empty() => format!("{prefix}_{v}_{stamp}.{ext}"),
        _ => format!("{prefix}_{stamp}.{ext}"),
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes on a character boundary with
/// an ellipsis and the count of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Shorten a preview cell to `max` characters, ending in `…` when cut.
pub fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path: PathBuf = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
