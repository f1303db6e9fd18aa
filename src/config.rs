//! Configuration System
//!
//! Layered configuration: built-in defaults, the user's global config file,
//! a project `dmanifest.toml` in the invocation directory, then
//! `DMANIFEST__*` environment variables.
//! CLI flags are applied on top by the binary.

use crate::error::SyncError;
use crate::fetch::HttpSettings;
use crate::logging::LoggingConfig;
use crate::manifest::{validate_type_tag, DEFAULT_MANIFEST_NAME};
use crate::sync::SyncOptions;
use crate::tree::hasher::DigestAlgorithm;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::workspace_file::WORKSPACE_CONFIG_NAME;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DmanifestConfig {
    /// Manifest naming and hashing
    #[serde(default)]
    pub manifest: ManifestConfig,

    /// Source fetching
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Manifest naming and hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Manifest file name at the local root
    #[serde(default = "default_manifest_name")]
    pub file_name: String,

    /// Manifest file name at a source
    #[serde(default = "default_manifest_name")]
    pub source_file_name: String,

    /// Type tag written into newly created manifests
    #[serde(default = "default_type_tag")]
    pub type_tag: String,

    /// Digest algorithm for file entries
    #[serde(default)]
    pub digest: DigestAlgorithm,
}

fn default_manifest_name() -> String {
    DEFAULT_MANIFEST_NAME.to_string()
}

fn default_type_tag() -> String {
    "generic".to_string()
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            file_name: default_manifest_name(),
            source_file_name: default_manifest_name(),
            type_tag: default_type_tag(),
            digest: DigestAlgorithm::default(),
        }
    }
}

/// Source fetching settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Check downloaded content against the source manifest
    #[serde(default = "default_true")]
    pub verify_digests: bool,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            verify_digests: default_true(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Manifest(String),
    Transfer(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Manifest(msg) => write!(f, "manifest: {}", msg),
            ValidationError::Transfer(msg) => write!(f, "transfer: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ManifestConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (key, name) in [
            ("file_name", &self.file_name),
            ("source_file_name", &self.source_file_name),
        ] {
            if name.is_empty() {
                return Err(format!("{} cannot be empty", key));
            }
            if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
                return Err(format!("{} must be a plain file name, got {:?}", key, name));
            }
        }
        validate_type_tag(&self.type_tag).map_err(|e| e.to_string())
    }
}

impl TransferConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err("timeouts must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

impl DmanifestConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.manifest.validate() {
            errors.push(ValidationError::Manifest(e));
        }
        if let Err(e) = self.transfer.validate() {
            errors.push(ValidationError::Transfer(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding all problems into one error
    pub fn ensure_valid(&self) -> Result<(), SyncError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            SyncError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })
    }

    /// Sync settings derived from this configuration
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            manifest_name: self.manifest.file_name.clone(),
            source_manifest_name: self.manifest.source_file_name.clone(),
            verify_digests: self.transfer.verify_digests,
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, SyncError> {
        toml::to_string_pretty(self).map_err(|e| SyncError::ConfigError(e.to_string()))
    }
}
