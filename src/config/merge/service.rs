//! MergeService: orchestrates sources, applies merge policy, deserializes to ToolboxConfig.

use crate::config::sources::{environment, explicit_file, global_file};
use crate::config::ToolboxConfig;
use crate::error::ToolboxError;
use std::path::Path;

use super::policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from standard sources.
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<ToolboxConfig, ToolboxError> {
        let builder = policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => explicit_file::add_to_builder(builder, path)?,
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        let config: ToolboxConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(ToolboxError::ConfigError)?;
        Ok(config)
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<ToolboxConfig, ToolboxError> {
        let builder = policy::builder_with_defaults()?;
        let builder = explicit_file::add_to_builder(builder, path)?;
        let builder = environment::add_to_builder(builder)?;

        let config: ToolboxConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(ToolboxError::ConfigError)?;
        Ok(config)
    }
}
