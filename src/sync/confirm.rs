//! Go/no-go decisions for a pending sync

use crate::error::SyncError;
use crate::fetch::Location;
use crate::manifest::DiffResult;

/// What a sync would do, presented to the confirmation collaborator
pub struct SyncProposal<'a> {
    pub source: &'a Location,
    pub diff: &'a DiffResult,
}

impl SyncProposal<'_> {
    pub fn has_downloads(&self) -> bool {
        self.diff.has_downloads()
    }

    pub fn has_deletions(&self) -> bool {
        !self.diff.deleted.is_empty()
    }

    pub fn download_bytes(&self) -> u64 {
        self.diff.download_bytes()
    }

    pub fn download_count(&self) -> usize {
        self.diff.download_count()
    }

    pub fn deletions(&self) -> &[String] {
        &self.diff.deleted
    }
}

/// Independent answers for downloads and deletions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub download: bool,
    pub delete: bool,
}

impl Decision {
    pub const APPROVE_ALL: Decision = Decision {
        download: true,
        delete: true,
    };

    pub const DECLINE_ALL: Decision = Decision {
        download: false,
        delete: false,
    };
}

/// Decides whether a proposed sync may download and/or delete
pub trait Confirm {
    fn confirm(&self, proposal: &SyncProposal<'_>) -> Result<Decision, SyncError>;
}

/// A fixed decision answers every proposal the same way
impl Confirm for Decision {
    fn confirm(&self, _proposal: &SyncProposal<'_>) -> Result<Decision, SyncError> {
        Ok(*self)
    }
}
