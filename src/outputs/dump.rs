//! Raw response dumps for offline inspection.
//!
//! Written when a run normalized every title to the `Unknown` sentinel, which
//! almost always means the upstream payload changed shape.

use crate::error::ChartError;
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::{instrument, warn};

/// Pretty-print `raw` into `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn dump_raw(raw: &Value, path: &Path) -> Result<(), ChartError> {
    let pretty = serde_json::to_string_pretty(raw).map_err(std::io::Error::from)?;
    fs::write(path, pretty).await?;
    warn!("Dumped raw response for inspection");
    Ok(())
}
