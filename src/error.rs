//! Error taxonomy shared by every pipeline.
//!
//! Errors fall into three families: reaching a source (transport, status,
//! missing file), understanding what came back (decode, unexpected shape,
//! malformed entries, nothing extracted), and writing results (I/O, CSV).
//! Pipelines catch all of them at their own boundary; nothing here is
//! surfaced past a single scraper run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The payload decoded but the record list could not be located.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("file {} not found", .0.display())]
    MissingFile(PathBuf),

    #[error("entry at position {position} is a {kind}, expected an object")]
    MalformedEntry { position: usize, kind: &'static str },

    #[error("no podcast data could be extracted")]
    NoRecords,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl ChartError {
    /// Only failures to obtain a successful response switch a pipeline to
    /// its fallback endpoint.
    pub fn triggers_fallback(&self) -> bool {
        matches!(self, ChartError::Transport { .. } | ChartError::Status { .. })
    }
}

/// Name of a JSON value's type, used when reporting malformed entries.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
