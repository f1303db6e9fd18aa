//! Manifest builder: walks a tree and hashes its files

use crate::error::ManifestError;
use crate::manifest::{store, Manifest, ManifestEntry, DEFAULT_MANIFEST_NAME};
use crate::tree::hasher::{ContentHasher, DigestAlgorithm};
use crate::tree::walker::{Entry, Walker};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Builds a fresh manifest for a directory tree
pub struct ManifestBuilder {
    root: PathBuf,
    manifest_name: String,
    hasher: ContentHasher,
}

impl ManifestBuilder {
    /// Create a builder for `root` using the default manifest name and digest
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            hasher: ContentHasher::default(),
        }
    }

    /// Name of the manifest file to skip while walking (and to write)
    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn with_digest(mut self, algorithm: DigestAlgorithm) -> Self {
        self.hasher = ContentHasher::new(algorithm);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_name(&self) -> &str {
        &self.manifest_name
    }

    /// Walk the tree and build its manifest
    ///
    /// The full enumeration is collected before any file is hashed. A file
    /// that cannot be read fails the whole build.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn build(&self, type_tag: &str, message: &str) -> Result<Manifest, ManifestError> {
        let start = Instant::now();
        info!("Starting manifest build");

        let walker = Walker::new(self.root.clone(), self.manifest_name.clone());
        let entries = match walker.walk() {
            Ok(e) => {
                debug!(entry_count = e.len(), "Walked filesystem");
                e
            }
            Err(e) => {
                error!("Filesystem walk failed: {}", e);
                return Err(e);
            }
        };

        let mut manifest_entries = Vec::with_capacity(entries.len());
        for entry in entries {
            manifest_entries.push(self.to_manifest_entry(entry)?);
        }

        let manifest =
            Manifest::new(type_tag, message, manifest_entries)?.with_digest(self.hasher.algorithm());

        info!(
            entries = manifest.len(),
            files = manifest.file_count(),
            bytes = manifest.total_size(),
            digest = %self.hasher.algorithm(),
            duration_ms = start.elapsed().as_millis(),
            "Manifest build completed"
        );

        Ok(manifest)
    }

    /// Build the manifest and write it to the root of the tree
    pub fn build_and_write(&self, type_tag: &str, message: &str) -> Result<Manifest, ManifestError> {
        let manifest = self.build(type_tag, message)?;
        store::write_manifest(&manifest, &store::manifest_file(&self.root, &self.manifest_name))?;
        Ok(manifest)
    }

    fn to_manifest_entry(&self, entry: Entry) -> Result<ManifestEntry, ManifestError> {
        match entry {
            Entry::Directory { manifest_path, .. } => Ok(ManifestEntry::directory(manifest_path)),
            Entry::File {
                path,
                manifest_path,
                size,
            } => {
                let digest = self
                    .hasher
                    .hash_file(&path)
                    .map_err(|e| ManifestError::io(&path, e))?;
                debug!(path = %manifest_path, size, "Hashed file");
                Ok(ManifestEntry::file(manifest_path, digest, size))
            }
        }
    }
}
