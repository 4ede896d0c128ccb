//! Configuration
//!
//! One immutable [`ToolboxConfig`] is built at startup and handed to the
//! stores. Sources are layered by the merge service: built-in defaults, the
//! global config file, an explicit file, then `TOOLBOX_NOTES__*` variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Usernotes schema version this engine reads and writes.
pub const USERNOTES_SCHEMA: u32 = 6;
/// Settings page schema version.
pub const SETTINGS_SCHEMA: u32 = 1;
/// Base wiki page quota in bytes.
pub const MAX_WIKI_SIZE: usize = 524_288;
/// The usernotes page may grow to this many times the base quota.
pub const USERNOTES_QUOTA_MULTIPLIER: usize = 2;
pub const ZLIB_COMPRESSION_LEVEL: u32 = 9;
pub const USERNOTES_PAGE: &str = "usernotes";
pub const SETTINGS_PAGE: &str = "toolbox";
/// Appended to every edit reason.
pub const DEFAULT_IDENTIFIER: &str = "via toolbox-notes";
pub const REDDIT_BASE_URL: &str = "https://oauth.reddit.com";

/// What `load()` does when the usernotes page does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingPagePolicy {
    /// Write an empty document at the current schema version and continue
    #[default]
    Create,
    Fail,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolboxConfig {
    #[serde(default)]
    pub usernotes: UsernotesConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub wiki: WikiConfig,
    #[serde(default)]
    pub reddit: RedditConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsernotesConfig {
    #[serde(default = "default_usernotes_page")]
    pub page: String,

    #[serde(default = "default_usernotes_schema")]
    pub schema_version: u32,

    #[serde(default = "default_quota_multiplier")]
    pub quota_multiplier: usize,

    /// zlib level for the blob, 0-9
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    #[serde(default)]
    pub missing_page: MissingPagePolicy,

    #[serde(default = "default_identifier")]
    pub identifier: String,

    /// Moderator recorded on notes that do not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_moderator: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_settings_page")]
    pub page: String,

    #[serde(default = "default_settings_schema")]
    pub schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    /// Base page quota in bytes
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Pre-obtained OAuth bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_usernotes_page() -> String {
    USERNOTES_PAGE.to_string()
}

fn default_usernotes_schema() -> u32 {
    USERNOTES_SCHEMA
}

fn default_quota_multiplier() -> usize {
    USERNOTES_QUOTA_MULTIPLIER
}

fn default_compression_level() -> u32 {
    ZLIB_COMPRESSION_LEVEL
}

fn default_identifier() -> String {
    DEFAULT_IDENTIFIER.to_string()
}

fn default_settings_page() -> String {
    SETTINGS_PAGE.to_string()
}

fn default_settings_schema() -> u32 {
    SETTINGS_SCHEMA
}

fn default_max_page_size() -> usize {
    MAX_WIKI_SIZE
}

fn default_base_url() -> String {
    REDDIT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("toolbox-notes/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for UsernotesConfig {
    fn default() -> Self {
        Self {
            page: default_usernotes_page(),
            schema_version: default_usernotes_schema(),
            quota_multiplier: default_quota_multiplier(),
            compression_level: default_compression_level(),
            missing_page: MissingPagePolicy::default(),
            identifier: default_identifier(),
            default_moderator: None,
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            page: default_settings_page(),
            schema_version: default_settings_schema(),
        }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ToolboxConfig {
    /// Largest serialized usernotes page `save()` will push.
    pub fn usernotes_page_limit(&self) -> usize {
        self.wiki
            .max_page_size
            .saturating_mul(self.usernotes.quota_multiplier)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.usernotes.page.trim().is_empty() {
            return Err("usernotes.page cannot be empty".to_string());
        }
        if self.settings.page.trim().is_empty() {
            return Err("settings.page cannot be empty".to_string());
        }
        if self.usernotes.compression_level > 9 {
            return Err(format!(
                "usernotes.compression_level must be 0-9, got {}",
                self.usernotes.compression_level
            ));
        }
        if self.usernotes.quota_multiplier == 0 {
            return Err("usernotes.quota_multiplier must be at least 1".to_string());
        }
        if self.wiki.max_page_size == 0 {
            return Err("wiki.max_page_size must be positive".to_string());
        }
        Ok(())
    }

    /// Render as TOML, token omitted.
    pub fn to_toml_string(&self) -> Result<String, crate::error::ToolboxError> {
        let mut redacted = self.clone();
        redacted.reddit.access_token = None;
        toml::to_string_pretty(&redacted).map_err(|e| {
            crate::error::ToolboxError::ConfigError(format!("Failed to serialize config: {}", e))
        })
    }
}
