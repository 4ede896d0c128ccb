//! Toolbox settings page
//!
//! Only the parts the usernotes engine needs are interpreted: the schema
//! version and the usernote types (`usernoteColors`), whose keys are the
//! warning kinds a moderator may pick. Everything else stays raw JSON.

use crate::config::ToolboxConfig;
use crate::error::ToolboxError;
use crate::wiki::WikiPageStore;
use serde::{Deserialize, Serialize};

/// One usernote type from the settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernoteType {
    pub key: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ToolboxSettings {
    version: u64,
    usernote_types: Vec<UsernoteType>,
    raw: serde_json::Value,
}

impl ToolboxSettings {
    pub fn load(wiki: &dyn WikiPageStore, config: &ToolboxConfig) -> Result<Self, ToolboxError> {
        let page = &config.settings.page;
        let content = wiki.fetch_page(page)?;
        let settings = Self::parse(page, &content, config.settings.schema_version)?;
        tracing::debug!(
            page = %page,
            usernote_types = settings.usernote_types.len(),
            "Loaded toolbox settings"
        );
        Ok(settings)
    }

    pub fn parse(page: &str, content: &str, expected: u32) -> Result<Self, ToolboxError> {
        let raw: serde_json::Value = serde_json::from_str(content)?;
        let found = raw.get("ver").and_then(serde_json::Value::as_u64).ok_or_else(|| {
            ToolboxError::CorruptDocument(format!("page '{}' has no integer 'ver' field", page))
        })?;
        if found != u64::from(expected) {
            return Err(ToolboxError::SchemaVersionMismatch {
                page: page.to_string(),
                expected,
                found,
            });
        }

        let usernote_types = match raw.get("usernoteColors") {
            Some(colors) => Vec::<UsernoteType>::deserialize(colors)?,
            None => Vec::new(),
        };

        Ok(Self {
            version: found,
            usernote_types,
            raw,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn usernote_types(&self) -> &[UsernoteType] {
        &self.usernote_types
    }

    /// Warning kinds declared by the subreddit, in page order.
    pub fn warning_kinds(&self) -> Vec<String> {
        self.usernote_types.iter().map(|t| t.key.clone()).collect()
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }
}
