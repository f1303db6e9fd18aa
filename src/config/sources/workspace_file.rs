//! Project config file source: `dmanifest.toml` in the invocation directory

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;

/// File name of the project configuration file
pub const WORKSPACE_CONFIG_NAME: &str = "dmanifest.toml";

/// Add the project config file to the builder when present.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    project_dir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = project_dir.join(WORKSPACE_CONFIG_NAME);
    if path.is_file() {
        return Ok(builder.add_source(File::from(path).required(false)));
    }
    Ok(builder)
}
