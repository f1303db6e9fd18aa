//! Manifest model
//!
//! A manifest is a typed, ordered snapshot of a directory tree: one entry per
//! file or directory, identified solely by its canonical path. Parent/child
//! relationships are implied by path prefixes and computed on demand.

pub mod diff;
pub mod format;
pub mod store;

use crate::error::ManifestError;
use crate::tree::hasher::DigestAlgorithm;
use crate::tree::path;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub use diff::{diff, DiffResult, EntryChange};

/// Default manifest file name written at the root of a tree
pub const DEFAULT_MANIFEST_NAME: &str = ".dmanifest";

/// Digest placeholder carried by directory entries
pub const DIRECTORY_DIGEST: &str = "-";

/// Kind of a manifest entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Single-character tag used in the serialized form
    pub fn tag(&self) -> &'static str {
        match self {
            EntryKind::File => "f",
            EntryKind::Directory => "d",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "f" => Some(EntryKind::File),
            "d" => Some(EntryKind::Directory),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("directory"),
        }
    }
}

/// One file or directory record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    pub kind: EntryKind,
    pub digest: String,
    pub size: u64,
}

impl ManifestEntry {
    pub fn file(path: impl Into<String>, digest: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            digest: digest.into(),
            size,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            digest: DIRECTORY_DIGEST.to_string(),
            size: 0,
        }
    }

    /// The synthetic root entry; never serialized
    pub fn root() -> Self {
        Self::directory(path::ROOT_PATH)
    }

    pub fn is_root(&self) -> bool {
        self.path == path::ROOT_PATH
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Final path segment
    pub fn name(&self) -> &str {
        path::file_name(&self.path)
    }

    /// Path of the enclosing directory, or `None` for the root
    pub fn parent_path(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            Some(path::parent(&self.path))
        }
    }

    /// True when both entries describe the same content
    pub fn same_content(&self, other: &ManifestEntry) -> bool {
        self.kind == other.kind && self.digest == other.digest
    }
}

/// Typed, ordered collection of manifest entries
///
/// Immutable once constructed; a changed tree produces a new manifest.
/// File digests are only comparable between manifests built with the same
/// algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    type_tag: String,
    message: String,
    digest: DigestAlgorithm,
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Build a manifest, enforcing unique paths and a well-formed type tag
    pub fn new(
        type_tag: impl Into<String>,
        message: impl Into<String>,
        entries: Vec<ManifestEntry>,
    ) -> Result<Self, ManifestError> {
        let type_tag = type_tag.into();
        validate_type_tag(&type_tag)?;

        let mut message: String = message.into();
        message.retain(|c| c != '\n' && c != '\r');

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.is_root() {
                return Err(ManifestError::InvalidPath(
                    "the root entry is implicit and cannot be listed".to_string(),
                ));
            }
            if !seen.insert(entry.path.as_str()) {
                return Err(ManifestError::DuplicatePath(entry.path.clone()));
            }
        }

        Ok(Self {
            type_tag,
            message,
            digest: DigestAlgorithm::default(),
            entries,
        })
    }

    /// Record the algorithm that produced the file digests
    pub fn with_digest(mut self, algorithm: DigestAlgorithm) -> Self {
        self.digest = algorithm;
        self
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn digest(&self) -> DigestAlgorithm {
        self.digest
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Entries in walk order, excluding the synthetic root
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn root(&self) -> ManifestEntry {
        ManifestEntry::root()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Immediate children of the directory at `dir`
    pub fn children<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a ManifestEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.parent_path() == Some(dir))
    }

    /// Every entry beneath the directory at `dir`
    pub fn descendants<'a>(
        &'a self,
        dir: &'a str,
    ) -> impl Iterator<Item = &'a ManifestEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| path::is_descendant(&e.path, dir))
    }

    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_directory()).count()
    }

    pub fn directory_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_directory()).count()
    }

    /// Sum of all file sizes
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

/// A type tag must be non-empty and must not collide with the header syntax
pub fn validate_type_tag(tag: &str) -> Result<(), ManifestError> {
    if tag.is_empty() || tag.contains('#') || tag.chars().any(char::is_control) {
        return Err(ManifestError::InvalidTypeTag(tag.to_string()));
    }
    Ok(())
}
