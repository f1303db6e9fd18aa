//! Source locations and the byte-transport used to read from them
//!
//! A location is resolved once, URL first and then filesystem, into a tagged
//! value that every later fetch reuses.

use crate::error::SyncError;
use crate::tree::path;
use reqwest::blocking::Client;
use reqwest::Url;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

/// A resolved source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    LocalPath(PathBuf),
    RemoteAddress(Url),
    Unresolved(String),
}

impl Location {
    /// Resolve a user-supplied location string
    ///
    /// `http`/`https` URLs become remote addresses, `file` URLs and existing
    /// paths become local paths; anything else is unresolved.
    pub fn resolve(raw: &str) -> Self {
        if let Ok(url) = Url::parse(raw) {
            match url.scheme() {
                "http" | "https" => return Location::RemoteAddress(url),
                "file" => {
                    if let Ok(local) = url.to_file_path() {
                        return Location::LocalPath(local);
                    }
                }
                // Anything else (including Windows drive letters) is tried as a path
                _ => {}
            }
        }

        let candidate = Path::new(raw);
        if candidate.exists() {
            let local = dunce::canonicalize(candidate).unwrap_or_else(|_| candidate.to_path_buf());
            Location::LocalPath(local)
        } else {
            Location::Unresolved(raw.to_string())
        }
    }

    /// Location of `manifest_path` beneath this location
    pub fn join(&self, manifest_path: &str) -> Result<Location, SyncError> {
        match self {
            Location::LocalPath(root) => Ok(Location::LocalPath(path::to_local_path(
                root,
                manifest_path,
            )?)),
            Location::RemoteAddress(base) => {
                path::validate(manifest_path)?;
                let mut url = base.clone();
                url.path_segments_mut()
                    .map_err(|_| {
                        SyncError::transfer(base, "URL cannot be used as a base for file paths")
                    })?
                    .pop_if_empty()
                    .extend(manifest_path.split(path::SEPARATOR));
                Ok(Location::RemoteAddress(url))
            }
            Location::Unresolved(raw) => Err(SyncError::UnresolvedLocation(raw.clone())),
        }
    }

    /// Directory that entry paths are joined onto
    ///
    /// A local location naming the manifest file itself maps to the
    /// directory that holds it.
    pub fn tree_root(&self) -> Location {
        match self {
            Location::LocalPath(p) if p.is_file() => match p.parent() {
                Some(parent) => Location::LocalPath(parent.to_path_buf()),
                None => self.clone(),
            },
            _ => self.clone(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Location::RemoteAddress(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::LocalPath(p) => write!(f, "{}", p.display()),
            Location::RemoteAddress(url) => write!(f, "{}", url),
            Location::Unresolved(raw) => write!(f, "{}", raw),
        }
    }
}

/// Byte-transport capability: open a stream over the content at a location
pub trait Fetch {
    fn fetch(&self, location: &Location) -> Result<Box<dyn Read>, SyncError>;
}

/// HTTP client settings for remote fetches
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
        }
    }
}

/// Fetcher serving local paths from disk and remote addresses over HTTP
pub struct DefaultFetcher {
    client: Client,
}

impl DefaultFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self, SyncError> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(concat!("dmanifest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Fetch for DefaultFetcher {
    #[instrument(skip(self), fields(location = %location))]
    fn fetch(&self, location: &Location) -> Result<Box<dyn Read>, SyncError> {
        match location {
            Location::LocalPath(p) => {
                let file = File::open(p).map_err(|e| SyncError::transfer(location, e.to_string()))?;
                debug!("Opened local source");
                Ok(Box::new(file))
            }
            Location::RemoteAddress(url) => {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| map_http_error(location, e))?;
                debug!(status = %response.status(), "Remote source responded");
                Ok(Box::new(response))
            }
            Location::Unresolved(raw) => Err(SyncError::UnresolvedLocation(raw.clone())),
        }
    }
}

fn map_http_error(location: &Location, error: reqwest::Error) -> SyncError {
    let reason = if let Some(status) = error.status() {
        format!("server returned {}", status)
    } else if error.is_timeout() {
        format!("request timeout: {}", error)
    } else if error.is_connect() {
        format!("connection error: {}", error)
    } else {
        format!("HTTP error: {}", error)
    };
    SyncError::transfer(location, reason)
}
