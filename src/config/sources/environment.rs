//! Environment variable source: TOOLBOX_NOTES__* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `TOOLBOX_NOTES__USERNOTES__PAGE=notes` sets `usernotes.page`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("TOOLBOX_NOTES")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
