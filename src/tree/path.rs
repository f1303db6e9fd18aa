//! Canonical manifest paths
//!
//! Manifest paths are relative to the manifest root and always use `/` as the
//! separator, whatever the host's native path syntax. They must map back onto
//! the local filesystem without escaping the root.

use crate::error::ManifestError;
use std::path::{Component, Path, PathBuf};

/// Separator used in serialized manifest paths
pub const SEPARATOR: char = '/';

/// Path of the synthetic root entry
pub const ROOT_PATH: &str = ".";

/// Build the canonical manifest path for `path`, which must lie under `root`
pub fn manifest_path(root: &Path, path: &Path) -> Result<String, ManifestError> {
    let relative = path.strip_prefix(root).map_err(|_| {
        ManifestError::InvalidPath(format!(
            "{} is not under {}",
            path.display(),
            root.display()
        ))
    })?;
    relative_manifest_path(relative)
}

/// Build the canonical manifest path from a root-relative host path
pub fn relative_manifest_path(relative: &Path) -> Result<String, ManifestError> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let name = name.to_str().ok_or_else(|| {
                    ManifestError::InvalidPath(format!(
                        "{} is not valid UTF-8",
                        relative.display()
                    ))
                })?;
                validate_segment(name)?;
                segments.push(name);
            }
            Component::CurDir => {}
            _ => {
                return Err(ManifestError::InvalidPath(format!(
                    "{} is not a plain relative path",
                    relative.display()
                )))
            }
        }
    }

    if segments.is_empty() {
        return Err(ManifestError::InvalidPath(
            "empty path refers to the manifest root".to_string(),
        ));
    }

    Ok(segments.join("/"))
}

/// Join a parent manifest path with a child name
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() || parent == ROOT_PATH {
        name.to_string()
    } else {
        format!("{}{}{}", parent, SEPARATOR, name)
    }
}

/// Parent of a manifest path; top-level entries have the root as parent
pub fn parent(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[..idx],
        None => ROOT_PATH,
    }
}

/// Final segment of a manifest path
pub fn file_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// True when `path` lies strictly beneath the directory `ancestor`
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT_PATH {
        return path != ROOT_PATH;
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == SEPARATOR as u8
}

/// Check that a serialized manifest path is safe to materialize
pub fn validate(path: &str) -> Result<(), ManifestError> {
    if path.is_empty() {
        return Err(ManifestError::InvalidPath("empty path".to_string()));
    }
    for segment in path.split(SEPARATOR) {
        validate_segment(segment).map_err(|_| {
            ManifestError::InvalidPath(format!("unsafe manifest path {:?}", path))
        })?;
    }
    Ok(())
}

fn validate_segment(segment: &str) -> Result<(), ManifestError> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(ManifestError::InvalidPath(format!(
            "invalid path segment {:?}",
            segment
        )));
    }
    if segment.contains('\\') || segment.chars().any(char::is_control) {
        return Err(ManifestError::InvalidPath(format!(
            "path segment {:?} contains a reserved character",
            segment
        )));
    }
    Ok(())
}

/// Map a manifest path onto the host filesystem beneath `root`
pub fn to_local_path(root: &Path, path: &str) -> Result<PathBuf, ManifestError> {
    validate(path)?;
    let mut local = root.to_path_buf();
    for segment in path.split(SEPARATOR) {
        local.push(segment);
    }
    Ok(local)
}
