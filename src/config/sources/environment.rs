//! Environment source: `DMANIFEST__<SECTION>__<KEY>` overrides.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("DMANIFEST")
            .separator("__")
            .try_parsing(true),
    )
}
