//! Environment variable source: SAFEWRITE_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `SAFEWRITE_CACHE__DIR` maps to `cache.dir`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        Environment::with_prefix("SAFEWRITE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    ))
}
