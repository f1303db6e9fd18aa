//! Reconciliation of a local tree against a source tree
//!
//! A sync loads both manifests, diffs them, asks the confirmation
//! collaborator, applies deletions and then downloads, and finally
//! regenerates the local manifest from the filesystem. Any failure aborts
//! before the manifest is rewritten, so the manifest on disk always describes
//! a state the tree was intentionally brought to.

mod confirm;
mod report;

pub use confirm::{Confirm, Decision, SyncProposal};
pub use report::{ActionOutcome, SyncReport};

use crate::error::SyncError;
use crate::fetch::{Fetch, Location};
use crate::manifest::{
    diff, format, store, DiffResult, EntryChange, EntryKind, Manifest, DEFAULT_MANIFEST_NAME,
};
use crate::tree::builder::ManifestBuilder;
use crate::tree::hasher::{DigestAlgorithm, StreamingDigest, BLOCK_SIZE};
use crate::tree::path;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, trace, warn};

/// Per-sync settings
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Manifest file name at the local root
    pub manifest_name: String,
    /// Manifest file name at the source
    pub source_manifest_name: String,
    /// Check each download against the source manifest's digest
    pub verify_digests: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            source_manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            verify_digests: true,
        }
    }
}

/// Local and source manifests plus their diff
pub struct SyncPlan {
    pub local: Manifest,
    pub source: Manifest,
    pub diff: DiffResult,
    /// The local tree had no usable manifest and was walked instead
    pub local_manifest_missing: bool,
}

/// Orchestrates diffing and reconciling a local tree
pub struct SyncEngine<F: Fetch> {
    fetcher: F,
    options: SyncOptions,
}

impl<F: Fetch> SyncEngine<F> {
    pub fn new(fetcher: F, options: SyncOptions) -> Self {
        Self { fetcher, options }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Fetch and parse the manifest published at `source`
    pub fn load_source_manifest(&self, source: &Location) -> Result<Manifest, SyncError> {
        self.load_manifest(source, &self.options.source_manifest_name)
    }

    /// Fetch and parse the manifest named `manifest_name` at `location`
    ///
    /// A local location naming a regular file is read as the manifest itself.
    #[instrument(skip(self), fields(location = %location))]
    pub fn load_manifest(
        &self,
        location: &Location,
        manifest_name: &str,
    ) -> Result<Manifest, SyncError> {
        let manifest_location = match location {
            Location::LocalPath(p) if p.is_file() => location.clone(),
            _ => location.join(manifest_name)?,
        };

        let mut reader = self.fetcher.fetch(&manifest_location)?;
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| SyncError::transfer(&manifest_location, e.to_string()))?;

        let manifest = format::parse(&text)?;
        debug!(entries = manifest.len(), type_tag = manifest.type_tag(), "Manifest loaded");
        Ok(manifest)
    }

    /// Load the local manifest, walking the tree if none has been written
    ///
    /// A stored manifest hashed with another algorithm than `digest` is
    /// replaced by a fresh walk so that its digests stay comparable. Returns
    /// the manifest and whether it had to be generated.
    pub fn load_local_manifest(
        &self,
        local_root: &Path,
        type_tag: &str,
        digest: DigestAlgorithm,
    ) -> Result<(Manifest, bool), SyncError> {
        if let Some(manifest) = store::read_tree_manifest(local_root, &self.options.manifest_name)? {
            if manifest.digest() == digest {
                return Ok((manifest, false));
            }
            info!(
                root = %local_root.display(),
                stored = %manifest.digest(),
                wanted = %digest,
                "Local manifest uses another digest; walking tree"
            );
        } else {
            info!(root = %local_root.display(), "No local manifest; walking tree");
        }

        let manifest = if local_root.is_dir() {
            self.builder(local_root, digest).build(type_tag, "")?
        } else {
            Manifest::new(type_tag, "", Vec::new())?.with_digest(digest)
        };
        Ok((manifest, true))
    }

    /// Load both manifests and diff them
    #[instrument(skip(self), fields(local = %local_root.display(), source = %source))]
    pub fn plan(&self, local_root: &Path, source: &Location) -> Result<SyncPlan, SyncError> {
        let source_manifest = self.load_source_manifest(source)?;
        let (local_manifest, local_manifest_missing) = self.load_local_manifest(
            local_root,
            source_manifest.type_tag(),
            source_manifest.digest(),
        )?;
        let diff = diff(&local_manifest, &source_manifest)?;

        Ok(SyncPlan {
            local: local_manifest,
            source: source_manifest,
            diff,
            local_manifest_missing,
        })
    }

    /// Reconcile `local_root` with `source`
    #[instrument(skip(self, confirm), fields(local = %local_root.display(), source = %source))]
    pub fn sync(
        &self,
        local_root: &Path,
        source: &Location,
        confirm: &dyn Confirm,
    ) -> Result<SyncReport, SyncError> {
        let plan = self.plan(local_root, source)?;
        let diff = plan.diff;

        info!(
            added_files = diff.added_files.len(),
            added_directories = diff.added_directories.len(),
            modified = diff.modified.len(),
            deleted = diff.deleted.len(),
            download_bytes = diff.download_bytes(),
            "Sync plan ready"
        );

        let decision = if diff.is_empty() {
            Decision::DECLINE_ALL
        } else {
            confirm.confirm(&SyncProposal {
                source,
                diff: &diff,
            })?
        };

        let mut report = SyncReport {
            local_root: local_root.to_path_buf(),
            source: source.to_string(),
            type_tag: plan.source.type_tag().to_string(),
            download: outcome(diff.has_downloads(), decision.download),
            deletion: outcome(!diff.deleted.is_empty(), decision.delete),
            diff,
            files_transferred: 0,
            bytes_transferred: 0,
            paths_removed: 0,
            skipped: Vec::new(),
            manifest_regenerated: false,
        };

        if report.deletion == ActionOutcome::Applied {
            report.paths_removed = self.apply_deletions(local_root, &report.diff.deleted)?;
        }

        if report.download == ActionOutcome::Applied {
            let applied = self.apply_downloads(
                local_root,
                &source.tree_root(),
                &report.diff,
                plan.source.digest(),
                decision.delete,
            )?;
            report.files_transferred = applied.files;
            report.bytes_transferred = applied.bytes;
            report.skipped = applied.skipped;
        }

        if report.mutated() || (plan.local_manifest_missing && local_root.is_dir()) {
            let message = format!(
                "synced from {} at {}",
                source,
                chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
            );
            self.builder(local_root, plan.source.digest())
                .build_and_write(plan.source.type_tag(), &message)?;
            report.manifest_regenerated = true;
        }

        info!(
            download = %report.download,
            deletion = %report.deletion,
            files_transferred = report.files_transferred,
            bytes_transferred = report.bytes_transferred,
            paths_removed = report.paths_removed,
            skipped = report.skipped.len(),
            manifest_regenerated = report.manifest_regenerated,
            "Sync completed"
        );

        Ok(report)
    }

    fn builder(&self, root: &Path, digest: DigestAlgorithm) -> ManifestBuilder {
        ManifestBuilder::new(root)
            .with_manifest_name(self.options.manifest_name.clone())
            .with_digest(digest)
    }

    /// Remove every deleted path; returns the number of paths removed
    ///
    /// Paths beneath a directory removed earlier in the pass are skipped.
    fn apply_deletions(&self, local_root: &Path, deleted: &[String]) -> Result<usize, SyncError> {
        let mut ordered: Vec<&str> = deleted.iter().map(String::as_str).collect();
        ordered.sort_unstable();

        let mut removed_dirs: Vec<&str> = Vec::new();
        let mut removed = 0;

        for manifest_path in ordered {
            if removed_dirs
                .iter()
                .any(|dir| path::is_descendant(manifest_path, dir))
            {
                trace!(path = manifest_path, "Already removed with parent directory");
                continue;
            }

            let local = path::to_local_path(local_root, manifest_path)?;
            match fs::symlink_metadata(&local) {
                Ok(meta) if meta.is_dir() => {
                    fs::remove_dir_all(&local).map_err(|e| SyncError::io(&local, e))?;
                    removed_dirs.push(manifest_path);
                    debug!(path = manifest_path, "Removed directory");
                }
                Ok(_) => {
                    fs::remove_file(&local).map_err(|e| SyncError::io(&local, e))?;
                    debug!(path = manifest_path, "Removed file");
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(path = manifest_path, "Path to delete is already absent");
                    continue;
                }
                Err(e) => return Err(SyncError::io(&local, e)),
            }
            removed += 1;
        }

        info!(removed, "Deletions applied");
        Ok(removed)
    }

    /// Create new directories, then fetch added and modified files
    ///
    /// The first failed transfer aborts the remaining ones. Unless
    /// `allow_delete` is set, a source file never replaces a non-empty local
    /// directory; such paths are returned as skipped.
    fn apply_downloads(
        &self,
        local_root: &Path,
        source: &Location,
        diff: &DiffResult,
        digest: DigestAlgorithm,
        allow_delete: bool,
    ) -> Result<AppliedDownloads, SyncError> {
        fs::create_dir_all(local_root).map_err(|e| SyncError::io(local_root, e))?;

        let mut directories: Vec<&str> = diff
            .added_directories
            .iter()
            .map(String::as_str)
            .chain(
                diff.modified
                    .iter()
                    .filter(|c| c.kind == EntryKind::Directory)
                    .map(|c| c.path.as_str()),
            )
            .collect();
        directories.sort_unstable();

        for manifest_path in directories {
            let local = path::to_local_path(local_root, manifest_path)?;
            match fs::symlink_metadata(&local) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    // A file now replaced by a directory
                    fs::remove_file(&local).map_err(|e| SyncError::io(&local, e))?;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(SyncError::io(&local, e)),
            }
            fs::create_dir_all(&local).map_err(|e| SyncError::io(&local, e))?;
            debug!(path = manifest_path, "Created directory");
        }

        let mut applied = AppliedDownloads::default();
        let changes = diff
            .added_files
            .iter()
            .chain(diff.modified.iter().filter(|c| c.kind == EntryKind::File));

        for change in changes {
            let local = path::to_local_path(local_root, &change.path)?;
            if let Ok(meta) = fs::symlink_metadata(&local) {
                if meta.is_dir() {
                    // A directory now replaced by a file
                    if allow_delete {
                        fs::remove_dir_all(&local).map_err(|e| SyncError::io(&local, e))?;
                    } else if fs::remove_dir(&local).is_err() {
                        warn!(
                            path = %change.path,
                            "Keeping directory a source file would replace; deletions declined"
                        );
                        applied.skipped.push(change.path.clone());
                        continue;
                    }
                }
            }
            applied.bytes += self.download_file(source, change, &local, digest)?;
            applied.files += 1;
        }

        info!(
            files = applied.files,
            bytes = applied.bytes,
            skipped = applied.skipped.len(),
            "Downloads applied"
        );
        Ok(applied)
    }

    /// Stream one file from the source into place, verifying its digest
    fn download_file(
        &self,
        source: &Location,
        change: &EntryChange,
        local: &Path,
        algorithm: DigestAlgorithm,
    ) -> Result<u64, SyncError> {
        let remote = source.join(&change.path)?;
        let dir = local.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir).map_err(|e| SyncError::io(dir, e))?;

        let mut reader = self.fetcher.fetch(&remote)?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SyncError::io(dir, e))?;
        let mut digest = StreamingDigest::new(algorithm);
        let mut buffer = vec![0u8; BLOCK_SIZE];
        let mut written: u64 = 0;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(SyncError::transfer(&remote, e.to_string())),
            };
            digest.update(&buffer[..n]);
            tmp.write_all(&buffer[..n])
                .map_err(|e| SyncError::io(tmp.path(), e))?;
            written += n as u64;
        }
        tmp.flush().map_err(|e| SyncError::io(tmp.path(), e))?;

        if self.options.verify_digests {
            let actual = digest.finalize_hex();
            if actual != change.digest {
                return Err(SyncError::transfer(
                    &remote,
                    format!("digest mismatch: expected {}, got {}", change.digest, actual),
                ));
            }
        }

        tmp.persist(local)
            .map_err(|e| SyncError::io(local, e.error))?;
        debug!(path = %change.path, bytes = written, "Downloaded file");
        Ok(written)
    }
}

/// Compare a tree against its own stored manifest
///
/// In the result, `added_*` are paths on disk that the manifest does not
/// list, `deleted` are listed paths missing from disk, and `modified` are
/// paths whose content changed.
#[instrument(skip(options), fields(root = %local_root.display()))]
pub fn verify(local_root: &Path, options: &SyncOptions) -> Result<DiffResult, SyncError> {
    let stored_path = store::manifest_file(local_root, &options.manifest_name);
    let stored = store::read_manifest(&stored_path)?;
    let fresh = ManifestBuilder::new(local_root)
        .with_manifest_name(options.manifest_name.clone())
        .with_digest(stored.digest())
        .build(stored.type_tag(), "")?;
    Ok(diff(&stored, &fresh)?)
}

#[derive(Debug, Default)]
struct AppliedDownloads {
    files: usize,
    bytes: u64,
    skipped: Vec<String>,
}

fn outcome(needed: bool, approved: bool) -> ActionOutcome {
    match (needed, approved) {
        (false, _) => ActionOutcome::NothingToDo,
        (true, true) => ActionOutcome::Applied,
        (true, false) => ActionOutcome::Declined,
    }
}
