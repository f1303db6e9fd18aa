//! Sync outcome reporting

use crate::manifest::DiffResult;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// What happened to one kind of action during a sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Applied,
    Declined,
    NothingToDo,
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Applied => f.write_str("applied"),
            ActionOutcome::Declined => f.write_str("declined"),
            ActionOutcome::NothingToDo => f.write_str("nothing to do"),
        }
    }
}

/// Result of reconciling a local tree against a source
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub local_root: PathBuf,
    pub source: String,
    pub type_tag: String,
    pub diff: DiffResult,
    pub download: ActionOutcome,
    pub deletion: ActionOutcome,
    pub files_transferred: usize,
    pub bytes_transferred: u64,
    pub paths_removed: usize,
    /// Source files not placed because a kept local directory is in the way
    pub skipped: Vec<String>,
    pub manifest_regenerated: bool,
}

impl SyncReport {
    /// True when the local tree was changed
    pub fn mutated(&self) -> bool {
        self.download == ActionOutcome::Applied || self.deletion == ActionOutcome::Applied
    }
}
