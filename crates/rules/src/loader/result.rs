//! Per-file load outcomes.

use std::path::PathBuf;

/// Outcome of loading a single file.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug, PartialEq)]
pub enum LoadStatus {
    /// The file produced this many documents.
    Loaded { documents: usize },
    /// File was skipped during a directory scan (dotfile, unknown extension).
    Skipped { reason: String },
}
