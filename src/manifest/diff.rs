//! Manifest comparison
//!
//! Path equality is the sole identity criterion. A renamed file shows up as
//! one deletion plus one addition.

use crate::error::ManifestError;
use crate::manifest::{EntryKind, Manifest, ManifestEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// A source entry that has to be fetched or replaced locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryChange {
    pub path: String,
    pub kind: EntryKind,
    pub digest: String,
    pub size: u64,
}

impl From<&ManifestEntry> for EntryChange {
    fn from(entry: &ManifestEntry) -> Self {
        Self {
            path: entry.path.clone(),
            kind: entry.kind,
            digest: entry.digest.clone(),
            size: entry.size,
        }
    }
}

/// Classification of every path in a local/source manifest pair
///
/// The four lists are pairwise disjoint. Source paths not listed are
/// unchanged; local paths not listed in `deleted` are matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub added_files: Vec<EntryChange>,
    pub added_directories: Vec<String>,
    pub deleted: Vec<String>,
    pub modified: Vec<EntryChange>,
    pub unchanged: usize,
}

impl DiffResult {
    /// True when the local side already matches the source
    pub fn is_empty(&self) -> bool {
        self.added_files.is_empty()
            && self.added_directories.is_empty()
            && self.deleted.is_empty()
            && self.modified.is_empty()
    }

    /// Whether applying downloads would change anything
    pub fn has_downloads(&self) -> bool {
        !self.added_files.is_empty() || !self.added_directories.is_empty() || !self.modified.is_empty()
    }

    /// Total bytes to transfer: added files plus modified files
    pub fn download_bytes(&self) -> u64 {
        self.added_files
            .iter()
            .chain(self.modified.iter())
            .map(|c| c.size)
            .sum()
    }

    /// Number of files whose content has to be fetched
    pub fn download_count(&self) -> usize {
        self.added_files.len()
            + self
                .modified
                .iter()
                .filter(|c| c.kind == EntryKind::File)
                .count()
    }
}

/// Compare `local` against `source`
///
/// Fails with `TypeMismatch` before classifying anything if the type tags
/// differ, and with `DigestMismatch` if the file digests were produced by
/// different algorithms.
#[instrument(skip_all, fields(local_entries = local.len(), source_entries = source.len()))]
pub fn diff(local: &Manifest, source: &Manifest) -> Result<DiffResult, ManifestError> {
    if local.type_tag() != source.type_tag() {
        return Err(ManifestError::TypeMismatch {
            local_tag: local.type_tag().to_string(),
            source_tag: source.type_tag().to_string(),
        });
    }
    if local.digest() != source.digest() {
        return Err(ManifestError::DigestMismatch {
            local_digest: local.digest(),
            source_digest: source.digest(),
        });
    }

    // path -> (entry, seen)
    let mut source_map: HashMap<&str, (&ManifestEntry, bool)> = source
        .entries()
        .iter()
        .map(|e| (e.path.as_str(), (e, false)))
        .collect();

    let mut result = DiffResult::default();

    for local_entry in local.entries() {
        match source_map.get_mut(local_entry.path.as_str()) {
            Some((source_entry, seen)) => {
                *seen = true;
                if local_entry.same_content(source_entry) {
                    result.unchanged += 1;
                } else {
                    result.modified.push(EntryChange::from(*source_entry));
                }
            }
            None => result.deleted.push(local_entry.path.clone()),
        }
    }

    // Walk the source in its own order so additions keep walk order
    for source_entry in source.entries() {
        let (_, seen) = source_map[source_entry.path.as_str()];
        if seen {
            continue;
        }
        match source_entry.kind {
            EntryKind::Directory => result.added_directories.push(source_entry.path.clone()),
            EntryKind::File => result.added_files.push(EntryChange::from(source_entry)),
        }
    }

    debug!(
        added_files = result.added_files.len(),
        added_directories = result.added_directories.len(),
        modified = result.modified.len(),
        deleted = result.deleted.len(),
        unchanged = result.unchanged,
        "Diff computed"
    );

    Ok(result)
}
