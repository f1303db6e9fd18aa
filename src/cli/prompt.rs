//! Interactive confirmation for sync.

use crate::cli::presentation::human_size;
use crate::error::SyncError;
use crate::sync::{Confirm, Decision, SyncProposal};

/// Deleted paths listed before asking
const MAX_LISTED_DELETIONS: usize = 20;

/// Asks on the terminal, separately for downloads and deletions
pub struct DialoguerConfirm {
    allow_delete: bool,
}

impl DialoguerConfirm {
    pub fn new(allow_delete: bool) -> Self {
        Self { allow_delete }
    }

    fn ask(prompt: String) -> Result<bool, SyncError> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| SyncError::Prompt(format!("Failed to get user input: {}", e)))
    }
}

impl Confirm for DialoguerConfirm {
    fn confirm(&self, proposal: &SyncProposal<'_>) -> Result<Decision, SyncError> {
        let mut decision = Decision::DECLINE_ALL;

        if proposal.has_downloads() {
            eprintln!(
                "{} files ({}) and {} directories to fetch from {}",
                proposal.download_count(),
                human_size(proposal.download_bytes()),
                proposal.diff.added_directories.len(),
                proposal.source
            );
            decision.download = Self::ask("Download?".to_string())?;
        }

        if proposal.has_deletions() {
            let deletions = proposal.deletions();
            eprintln!("{} local paths are not in the source:", deletions.len());
            for path in deletions.iter().take(MAX_LISTED_DELETIONS) {
                eprintln!("  - {}", path);
            }
            if deletions.len() > MAX_LISTED_DELETIONS {
                eprintln!("  ... and {} more", deletions.len() - MAX_LISTED_DELETIONS);
            }
            if self.allow_delete {
                decision.delete = Self::ask(format!("Delete {} paths?", deletions.len()))?;
            } else {
                eprintln!("Deletion disabled; keeping them.");
            }
        }

        Ok(decision)
    }
}
