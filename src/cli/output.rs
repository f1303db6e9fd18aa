//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ManifestError, SyncError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &SyncError) -> String {
    match e {
        SyncError::Manifest(ManifestError::TypeMismatch { .. }) => {
            format!("{}\nThe trees hold different kinds of data; refusing to compare.", e)
        }
        SyncError::Manifest(ManifestError::DigestMismatch { .. }) => {
            format!("{}\nRecreate one manifest with the other's --digest.", e)
        }
        SyncError::UnresolvedLocation(_) => {
            format!("{}\nPass an http(s):// URL, a file:// URL, or an existing path.", e)
        }
        _ => e.to_string(),
    }
}
