//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("manifest.file_name", ".dmanifest")?
        .set_default("manifest.source_file_name", ".dmanifest")?
        .set_default("manifest.type_tag", "generic")?
        .set_default("manifest.digest", "sha256")
}
