//! Built-in defaults at the bottom of every config stack.

use crate::config::{
    DEFAULT_IDENTIFIER, MAX_WIKI_SIZE, SETTINGS_PAGE, SETTINGS_SCHEMA, USERNOTES_PAGE,
    USERNOTES_QUOTA_MULTIPLIER, USERNOTES_SCHEMA, ZLIB_COMPRESSION_LEVEL,
};
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// Builder seeded with the defaults every later source may override.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("usernotes.page", USERNOTES_PAGE)?
        .set_default("usernotes.schema_version", i64::from(USERNOTES_SCHEMA))?
        .set_default("usernotes.quota_multiplier", USERNOTES_QUOTA_MULTIPLIER as i64)?
        .set_default("usernotes.compression_level", i64::from(ZLIB_COMPRESSION_LEVEL))?
        .set_default("usernotes.missing_page", "create")?
        .set_default("usernotes.identifier", DEFAULT_IDENTIFIER)?
        .set_default("settings.page", SETTINGS_PAGE)?
        .set_default("settings.schema_version", i64::from(SETTINGS_SCHEMA))?
        .set_default("wiki.max_page_size", MAX_WIKI_SIZE as i64)
}
