//! Error types for manifest creation, diffing, and synchronization.

use crate::tree::hasher::DigestAlgorithm;
use std::path::PathBuf;
use thiserror::Error;

/// Manifest-level errors: building, parsing, and comparing manifests
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest (line {line}): {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Manifest type mismatch: local is '{local_tag}', source is '{source_tag}'")]
    TypeMismatch {
        local_tag: String,
        source_tag: String,
    },

    #[error("Manifest digest mismatch: local uses {local_digest}, source uses {source_digest}")]
    DigestMismatch {
        local_digest: DigestAlgorithm,
        source_digest: DigestAlgorithm,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid type tag: {0:?}")]
    InvalidTypeTag(String),

    #[error("Duplicate path in manifest: {0}")]
    DuplicatePath(String),
}

impl ManifestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        ManifestError::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the sync engine and the CLI
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Transfer failed for {location}: {reason}")]
    Transfer { location: String, reason: String },

    #[error("Cannot resolve location '{0}' as a URL or an existing path")]
    UnresolvedLocation(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// A tree no longer matches its own manifest; carries the rendered drift
    #[error("{0}")]
    Verification(String),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn transfer(location: impl ToString, reason: impl Into<String>) -> Self {
        SyncError::Transfer {
            location: location.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for SyncError {
    fn from(err: config::ConfigError) -> Self {
        SyncError::ConfigError(err.to_string())
    }
}
