//! Event type definitions for progress reporting.

use crate::core::catalog::FileRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by a scan or organize run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A file was fingerprinted
    FileProcessed(FileRecord),
    /// Terminal status line for one file
    Status(StatusLine),
    /// Free-form message for the user
    Message(String),
    /// An identity key gained its second member
    DuplicateFound { key: String, count: usize },
    /// The run finished normally
    Completed(RunSummary),
    /// The run stopped because it was cancelled
    Cancelled(RunSummary),
    /// The run could not start or hit a fatal error
    Failed { message: String },
}

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Added to the identity catalog (scan mode)
    Catalogued,
    /// Copied to a fresh destination
    Copied,
    /// Moved to a fresh destination
    Moved,
    /// Replaced an existing file at the destination
    Overwritten,
    /// Placed under a checksum-prefixed name to avoid a collision
    Renamed,
    /// Filtered out or already present at the destination
    Skipped,
    /// Something went wrong; the run continues
    Failed,
}

impl Outcome {
    /// Check if the file ended up written at the destination
    pub fn wrote_file(&self) -> bool {
        matches!(
            self,
            Outcome::Copied | Outcome::Moved | Outcome::Overwritten | Outcome::Renamed
        )
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Catalogued => write!(f, "Catalogued"),
            Outcome::Copied => write!(f, "Copied"),
            Outcome::Moved => write!(f, "Moved"),
            Outcome::Overwritten => write!(f, "Overwritten"),
            Outcome::Renamed => write!(f, "Renamed"),
            Outcome::Skipped => write!(f, "Skipped"),
            Outcome::Failed => write!(f, "Failed"),
        }
    }
}

/// Human-readable status for one processed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusLine {
    /// The source file
    pub path: PathBuf,
    /// Machine-distinguishable result
    pub outcome: Outcome,
    /// Where the file ended up, if anywhere
    pub destination: Option<PathBuf>,
    /// Line to show the user
    pub message: String,
}

impl StatusLine {
    pub fn new(path: PathBuf, outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            path,
            outcome,
            destination: None,
            message: message.into(),
        }
    }

    pub fn with_destination(mut self, destination: PathBuf) -> Self {
        self.destination = Some(destination);
        self
    }
}

/// Counters reported when a run ends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Files that produced a terminal status line
    pub files_processed: usize,
    /// Files written at the destination (organize mode)
    pub files_written: usize,
    /// Files filtered out or already present
    pub files_skipped: usize,
    /// Per-file failures
    pub errors: usize,
    /// Duplicate sets found (scan mode)
    pub duplicate_sets: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}
