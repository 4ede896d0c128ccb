//! In-process page store.

use crate::error::ToolboxError;
use crate::wiki::contract::{EditPath, WikiPageStore};
use parking_lot::RwLock;
use std::collections::HashMap;

/// One accepted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    pub page: String,
    pub content: String,
    pub reason: String,
    pub path: EditPath,
}

/// Page store backed by a map, recording every write.
#[derive(Default)]
pub struct MemoryWikiStore {
    pages: RwLock<HashMap<String, String>>,
    edits: RwLock<Vec<EditRecord>>,
    fetches: RwLock<usize>,
    fail_primary_edits: RwLock<bool>,
}

impl MemoryWikiStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a page without recording an edit.
    pub fn with_page(self, page: &str, content: impl Into<String>) -> Self {
        self.pages.write().insert(page.to_string(), content.into());
        self
    }

    /// Make `edit_page` fail with a transport error.
    pub fn fail_primary_edits(&self, fail: bool) {
        *self.fail_primary_edits.write() = fail;
    }

    pub fn page(&self, page: &str) -> Option<String> {
        self.pages.read().get(page).cloned()
    }

    pub fn edits(&self) -> Vec<EditRecord> {
        self.edits.read().clone()
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.read()
    }

    fn write(&self, page: &str, content: &str, reason: &str, path: EditPath) {
        self.pages
            .write()
            .insert(page.to_string(), content.to_string());
        self.edits.write().push(EditRecord {
            page: page.to_string(),
            content: content.to_string(),
            reason: reason.to_string(),
            path,
        });
    }
}

impl WikiPageStore for MemoryWikiStore {
    fn fetch_page(&self, page: &str) -> Result<String, ToolboxError> {
        *self.fetches.write() += 1;
        self.page(page).ok_or_else(|| ToolboxError::PageNotFound {
            page: page.to_string(),
        })
    }

    fn create_page(&self, page: &str, content: &str, reason: &str) -> Result<(), ToolboxError> {
        self.write(page, content, reason, EditPath::Create);
        Ok(())
    }

    fn edit_page(&self, page: &str, content: &str, reason: &str) -> Result<(), ToolboxError> {
        if *self.fail_primary_edits.read() {
            return Err(ToolboxError::Transport(
                "connection reset by peer".to_string(),
            ));
        }
        self.write(page, content, reason, EditPath::Edit);
        Ok(())
    }

    fn submit_raw_edit(
        &self,
        page: &str,
        content: &str,
        reason: &str,
    ) -> Result<(), ToolboxError> {
        self.write(page, content, reason, EditPath::RawEdit);
        Ok(())
    }
}
