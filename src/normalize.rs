//! Tolerant field extraction from loosely-shaped JSON entries.
//!
//! Each pipeline declares a table of [`FieldRule`]s. A rule lists candidate
//! key paths in order of preference; the first path that lands on a scalar
//! wins, otherwise the rule's sentinel is used. Every rule always yields a
//! value, so a record has every column no matter how the entry drifted.
//!
//! ```ignore
//! const TITLE: FieldRule = FieldRule::new(
//!     models::PODCAST_TITLE,
//!     &[&[Step::Key("showName")], &[Step::Key("name")]],
//!     models::UNKNOWN,
//! );
//! ```

use crate::error::{ChartError, json_kind};
use crate::models::NormalizedRecord;
use serde_json::Value;
use tracing::{debug, warn};

/// One hop of a key path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Descend into an object member.
    Key(&'static str),
    /// Take the final element of an array. Fails on an empty array or a
    /// non-array.
    Last,
}

pub type KeyPath = &'static [Step];

/// Declarative mapping from candidate key paths to one output column.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub column: &'static str,
    pub candidates: &'static [KeyPath],
    pub sentinel: &'static str,
    /// Applied to a resolved value only, never to the sentinel.
    pub transform: Option<fn(&str) -> String>,
}

impl FieldRule {
    pub const fn new(
        column: &'static str,
        candidates: &'static [KeyPath],
        sentinel: &'static str,
    ) -> Self {
        Self {
            column,
            candidates,
            sentinel,
            transform: None,
        }
    }

    pub const fn with_transform(mut self, transform: fn(&str) -> String) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Resolve this rule against `entry`.
    pub fn extract(&self, entry: &Value) -> String {
        for path in self.candidates {
            if let Some(value) = resolve(entry, path) {
                return match self.transform {
                    Some(f) => f(&value),
                    None => value,
                };
            }
        }
        self.sentinel.to_string()
    }
}

/// Follow `path` from `value` and render the scalar found there.
///
/// Strings come back as-is, numbers and booleans as their JSON text. `null`,
/// objects, arrays and missing members all count as unresolved.
pub fn resolve(value: &Value, path: &[Step]) -> Option<String> {
    let mut current = value;
    for step in path {
        current = match step {
            Step::Key(key) => current.as_object()?.get(*key)?,
            Step::Last => current.as_array()?.last()?,
        };
    }
    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Normalize one entry. Only non-object entries are rejected; any object,
/// however sparse, produces a full record.
pub fn normalize_entry(
    rules: &[FieldRule],
    entry: &Value,
    position: usize,
) -> Result<NormalizedRecord, ChartError> {
    if !entry.is_object() {
        return Err(ChartError::MalformedEntry {
            position,
            kind: json_kind(entry),
        });
    }
    let mut record = NormalizedRecord::new();
    for rule in rules {
        record.push(rule.column, rule.extract(entry));
    }
    Ok(record)
}

/// Normalize every entry in order, skipping malformed ones with a warning.
/// `position` in logs is 1-based, matching the source's chart position.
pub fn normalize_all<'a>(
    rules: &[FieldRule],
    entries: impl IntoIterator<Item = &'a Value>,
) -> Vec<NormalizedRecord> {
    let mut records = Vec::new();
    let mut seen = 0usize;
    for (i, entry) in entries.into_iter().enumerate() {
        seen += 1;
        match normalize_entry(rules, entry, i + 1) {
            Ok(record) => records.push(record),
            Err(e) => warn!(position = i + 1, error = %e, "Skipping malformed entry"),
        }
    }
    debug!(entries = seen, records = records.len(), "Normalized entries");
    records
}

/// Column names of a rule table, in order.
pub fn columns_of(rules: &[FieldRule]) -> Vec<&'static str> {
    rules.iter().map(|r| r.column).collect()
}

/// Remove a URI-scheme prefix such as `spotify:show:` when present.
pub fn strip_prefix_or_keep(value: &str, prefix: &str) -> String {
    value.strip_prefix(prefix).unwrap_or(value).to_string()
}
