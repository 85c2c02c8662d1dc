//! Compact text rendering of a ranked table for a quick visual check.

use crate::models::RankedTable;
use crate::utils::clip;
use itertools::Itertools;

/// Widest a preview cell may get before it is clipped.
pub const MAX_CELL_WIDTH: usize = 40;

/// Render the first `max_rows` rows of `table`, restricted to `columns`
/// (all columns when empty). Unknown column names are ignored.
///
/// ```text
/// Rank  Podcast Title             Publisher
/// 1     The Daily                 The New York Times
/// 2     Crime Junkie              audiochuck
/// ... 98 more rows
/// ```
pub fn render_preview(table: &RankedTable, columns: &[&str], max_rows: usize) -> String {
    let indices: Vec<usize> = if columns.is_empty() {
        (0..table.columns().len()).collect()
    } else {
        columns
            .iter()
            .filter_map(|c| table.columns().iter().position(|t| t == c))
            .collect()
    };

    let header: Vec<String> = indices
        .iter()
        .map(|&i| table.columns()[i].to_string())
        .collect();
    let body: Vec<Vec<String>> = table
        .rows()
        .take(max_rows)
        .map(|row| indices.iter().map(|&i| clip(&row[i], MAX_CELL_WIDTH)).collect())
        .collect();

    let widths: Vec<usize> = (0..indices.len())
        .map(|col| {
            std::iter::once(&header)
                .chain(body.iter())
                .map(|r| r[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |row: &Vec<String>| {
        row.iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines: Vec<String> = std::iter::once(&header)
        .chain(body.iter())
        .map(format_row)
        .collect();

    let hidden = table.len().saturating_sub(max_rows);
    if hidden > 0 {
        lines.push(format!("... {hidden} more rows"));
    }
    if table.is_empty() {
        lines.push("(no rows)".to_string());
    }
    lines.join("\n")
}
