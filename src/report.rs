//! Human-facing run output.
//!
//! Logs go through `tracing`; what an operator reads to check a run (the
//! preview table, the "wrote N podcasts" line, failure notices) goes through
//! a [`Reporter`] so it can be swapped out or captured.

use std::path::Path;

pub trait Reporter {
    /// A rendered preview block with its heading.
    fn preview(&self, heading: &str, body: &str);

    /// A pipeline wrote `rows` records to `path`.
    fn success(&self, pipeline: &str, rows: usize, path: &Path);

    /// Something the operator should look at, the run continues.
    fn warning(&self, pipeline: &str, message: &str);

    /// The pipeline ended without writing its CSV.
    fn failure(&self, pipeline: &str, message: &str);
}

/// Writes to standard output / standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn preview(&self, heading: &str, body: &str) {
        println!("\n{heading}:");
        println!("{body}");
    }

    fn success(&self, _pipeline: &str, rows: usize, path: &Path) {
        println!("Successfully extracted {rows} podcasts to {}", path.display());
    }

    fn warning(&self, pipeline: &str, message: &str) {
        eprintln!("WARNING [{pipeline}]: {message}");
    }

    fn failure(&self, pipeline: &str, message: &str) {
        eprintln!("Error [{pipeline}]: {message}");
    }
}
