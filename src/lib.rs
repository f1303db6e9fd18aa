//! dmanifest: Directory Manifests
//!
//! Describes a directory tree as a flat, text manifest of paths, kinds, and
//! content digests, compares two manifests, and brings a local tree in line
//! with a source tree served from disk or over HTTP.

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod manifest;
pub mod sync;
pub mod tree;

pub use error::{ManifestError, SyncError};
pub use fetch::{DefaultFetcher, Fetch, Location};
pub use manifest::{diff, DiffResult, Manifest, ManifestEntry};
pub use sync::{Confirm, Decision, SyncEngine, SyncOptions, SyncReport};
