//! Config facade: assembles sources in precedence order and deserializes.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::DmanifestConfig;
use config::{ConfigError, File};
use std::path::Path;
use tracing::debug;

/// Loads `DmanifestConfig` from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for an invocation from `project_dir`
    ///
    /// Precedence (lowest to highest): defaults, global file,
    /// `<project_dir>/dmanifest.toml`, `DMANIFEST__*` environment variables.
    pub fn load(project_dir: &Path) -> Result<DmanifestConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, project_dir)?;
        let builder = environment::add_to_builder(builder);

        let config: DmanifestConfig = builder.build()?.try_deserialize()?;
        debug!(project_dir = %project_dir.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load configuration from an explicit file, replacing the file layers
    pub fn load_from_file(path: &Path) -> Result<DmanifestConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder);

        let config: DmanifestConfig = builder.build()?.try_deserialize()?;
        debug!(path = %path.display(), "Configuration loaded from file");
        Ok(config)
    }
}
