//! CSV serialization of ranked tables.
//!
//! One header row (the table's columns) followed by one row per record,
//! comma-delimited UTF-8. An existing file with the same name is replaced.

use crate::error::ChartError;
use crate::models::RankedTable;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Render `table` as CSV bytes.
pub fn table_to_csv(table: &RankedTable) -> Result<Vec<u8>, ChartError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ChartError::Io(e.into_error()))
}

/// Write `table` to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = table.len()))]
pub async fn write_table(table: &RankedTable, path: &Path) -> Result<(), ChartError> {
    let bytes = table_to_csv(table)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, bytes).await?;
    info!("Wrote CSV");
    Ok(())
}
