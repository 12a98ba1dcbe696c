use std::path::PathBuf;
use std::time::Duration;

use crate::error::GenError;

/// The outcome of a completed generation run.
pub struct Report {
    /// The written `.vcxitems` file.
    pub project_file: PathBuf,

    /// The written `.vcxitems.filters` file.
    pub filters_file: PathBuf,

    /// What went into the two documents.
    pub stats: ScanStats,

    /// Recoverable anomalies left out of the project (symlink loops).
    /// Use [`GenError::path`] to show "Skipped: <path>".
    pub skipped: Vec<GenError>,
}

/// Counts for a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanStats {
    /// Folders visited, the input folder included.
    pub folders: usize,

    /// Filter declarations written. One less than `folders` when the input
    /// folder is the root prefix, since the root gets no filter.
    pub filters: usize,

    pub headers: usize,
    pub sources: usize,
    pub others: usize,

    /// Wall-clock time from the start of the walk to the second file landing.
    pub duration: Duration,
}

impl ScanStats {
    /// Total number of items written to each document.
    pub fn files(&self) -> usize {
        self.headers + self.sources + self.others
    }
}
