//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::ToolboxConfig;
use crate::error::ToolboxError;
use std::path::{Path, PathBuf};

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Global config file path (~/.config/toolbox-notes/config.toml)
    pub fn global_config_path() -> Result<PathBuf, ToolboxError> {
        super::paths::global_config_path()
    }

    /// Load configuration from the global file and environment, plus an
    /// explicit file when one is given.
    pub fn load(explicit: Option<&Path>) -> Result<ToolboxConfig, ToolboxError> {
        MergeService::load(explicit)
    }

    /// Load configuration from a specific file with environment overlay only.
    pub fn load_from_file(path: &Path) -> Result<ToolboxConfig, ToolboxError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> ToolboxConfig {
        ToolboxConfig::default()
    }
}
