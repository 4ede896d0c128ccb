//! Filesystem page store: one file per page under a directory.
//!
//! Used for offline work on an exported usernotes page. Every write also
//! appends the edit reason to `<page>.log` next to the page file.

use crate::error::ToolboxError;
use crate::wiki::contract::WikiPageStore;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct DirectoryWikiStore {
    root: PathBuf,
}

impl DirectoryWikiStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under the platform data directory, one folder per subreddit.
    pub fn for_subreddit(subreddit: &str) -> Result<Self, ToolboxError> {
        let project_dirs = directories::ProjectDirs::from("", "toolbox-notes", "toolbox-notes")
            .ok_or_else(|| {
                ToolboxError::ConfigError(
                    "Could not determine platform data directory for pages".to_string(),
                )
            })?;
        Ok(Self::new(project_dirs.data_dir().join(subreddit)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Page file path. Page ids may contain `/` for nested pages.
    pub fn path_for(&self, page: &str) -> Result<PathBuf, ToolboxError> {
        if page.is_empty() || page.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return Err(ToolboxError::ConfigError(format!(
                "Invalid wiki page id: {:?}",
                page
            )));
        }
        Ok(self.root.join(format!("{}.md", page)))
    }

    fn write_page(&self, page: &str, content: &str, reason: &str) -> Result<(), ToolboxError> {
        let path = self.path_for(page)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ToolboxError::ConfigError(format!(
                    "Failed to create page directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        std::fs::write(&path, content)?;

        let log_path = path.with_extension("log");
        let mut log = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        writeln!(log, "{}\t{}", chrono::Utc::now().to_rfc3339(), reason)?;

        tracing::debug!(page = page, path = %path.display(), "Wrote wiki page");
        Ok(())
    }
}

impl WikiPageStore for DirectoryWikiStore {
    fn fetch_page(&self, page: &str) -> Result<String, ToolboxError> {
        let path = self.path_for(page)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ToolboxError::PageNotFound {
                    page: page.to_string(),
                })
            }
            Err(e) => Err(ToolboxError::Io(e)),
        }
    }

    fn create_page(&self, page: &str, content: &str, reason: &str) -> Result<(), ToolboxError> {
        self.write_page(page, content, reason)
    }

    fn edit_page(&self, page: &str, content: &str, reason: &str) -> Result<(), ToolboxError> {
        self.write_page(page, content, reason)
    }

    fn submit_raw_edit(
        &self,
        page: &str,
        content: &str,
        reason: &str,
    ) -> Result<(), ToolboxError> {
        self.write_page(page, content, reason)
    }
}
