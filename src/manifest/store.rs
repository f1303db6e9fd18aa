//! Reading and writing manifest files on disk

use crate::error::ManifestError;
use crate::manifest::{format, Manifest};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Location of the manifest file for a tree rooted at `root`
pub fn manifest_file(root: &Path, manifest_name: &str) -> PathBuf {
    root.join(manifest_name)
}

/// Read and parse a manifest file
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let text = fs::read_to_string(path).map_err(|e| ManifestError::io(path, e))?;
    let manifest = format::parse(&text)?;
    debug!(entries = manifest.len(), "Manifest loaded");
    Ok(manifest)
}

/// Read the manifest stored at the root of a tree, if there is one
pub fn read_tree_manifest(
    root: &Path,
    manifest_name: &str,
) -> Result<Option<Manifest>, ManifestError> {
    let path = manifest_file(root, manifest_name);
    match fs::metadata(&path) {
        Ok(_) => read_manifest(&path).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ManifestError::io(path, e)),
    }
}

/// Write a manifest, replacing any existing file atomically
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<(), ManifestError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ManifestError::io(dir, e))?;
    format::write_to(manifest, tmp.as_file_mut()).map_err(|e| ManifestError::io(tmp.path(), e))?;
    tmp.as_file_mut()
        .sync_all()
        .map_err(|e| ManifestError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| ManifestError::io(path, e.error))?;

    debug!(entries = manifest.len(), "Manifest written");
    Ok(())
}

/// Write the text form of `manifest` to an arbitrary writer (e.g. stdout)
pub fn print_manifest<W: Write>(manifest: &Manifest, writer: W) -> Result<(), ManifestError> {
    format::write_to(manifest, writer).map_err(|e| ManifestError::io("<output>", e))
}
