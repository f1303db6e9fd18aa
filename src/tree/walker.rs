//! Filesystem walker for enumerating a manifest root

use crate::error::ManifestError;
use crate::tree::path;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Filesystem entry types found during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A regular file with its host path, manifest path, and size
    File {
        path: PathBuf,
        manifest_path: String,
        size: u64,
    },
    /// A directory with its host path and manifest path
    Directory {
        path: PathBuf,
        manifest_path: String,
    },
}

impl Entry {
    pub fn manifest_path(&self) -> &str {
        match self {
            Entry::File { manifest_path, .. } | Entry::Directory { manifest_path, .. } => {
                manifest_path
            }
        }
    }
}

/// Depth-first walker over a manifest root
///
/// Symbolic links are never followed and never listed. Within a directory,
/// sub-directories come before files and each group is sorted by name, so a
/// directory's own entry always precedes its descendants and the order is
/// stable across runs.
pub struct Walker {
    root: PathBuf,
    manifest_name: String,
}

impl Walker {
    /// Create a walker for `root` that skips the manifest file `manifest_name`
    pub fn new(root: impl Into<PathBuf>, manifest_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            manifest_name: manifest_name.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the filesystem and collect all entries in walk order
    ///
    /// The enumeration completes before any file content is read.
    pub fn walk(&self) -> Result<Vec<Entry>, ManifestError> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .min_depth(1)
            .sort_by(directories_first);

        for entry in walker {
            let entry = entry.map_err(|e| {
                let at = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                let source = e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop detected")
                });
                ManifestError::io(at, source)
            })?;

            if self.is_manifest_file(&entry) {
                trace!(path = %entry.path().display(), "Skipping manifest file");
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                debug!(path = %entry.path().display(), "Skipping symbolic link");
                continue;
            }

            let manifest_path = path::manifest_path(&self.root, entry.path())?;

            if file_type.is_dir() {
                entries.push(Entry::Directory {
                    path: entry.path().to_path_buf(),
                    manifest_path,
                });
            } else if file_type.is_file() {
                let metadata = entry
                    .metadata()
                    .map_err(|e| ManifestError::io(entry.path(), e.into()))?;
                entries.push(Entry::File {
                    path: entry.path().to_path_buf(),
                    manifest_path,
                    size: metadata.len(),
                });
            } else {
                debug!(path = %entry.path().display(), "Skipping special file");
            }
        }

        Ok(entries)
    }

    fn is_manifest_file(&self, entry: &DirEntry) -> bool {
        entry.depth() == 1
            && entry.file_type().is_file()
            && entry.file_name().to_str() == Some(self.manifest_name.as_str())
    }
}

fn directories_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir();
    let b_dir = b.file_type().is_dir();
    b_dir
        .cmp(&a_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}
