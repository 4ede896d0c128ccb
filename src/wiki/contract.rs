use crate::error::ToolboxError;

/// Which submission path wrote a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPath {
    Create,
    Edit,
    RawEdit,
}

/// Page-level access to one community's wiki.
pub trait WikiPageStore: Send + Sync {
    /// Raw page content; `PageNotFound` when the page does not exist.
    fn fetch_page(&self, page: &str) -> Result<String, ToolboxError>;

    fn create_page(&self, page: &str, content: &str, reason: &str) -> Result<(), ToolboxError>;

    fn edit_page(&self, page: &str, content: &str, reason: &str) -> Result<(), ToolboxError>;

    /// Lower-level submission used once when `edit_page` fails in transport.
    fn submit_raw_edit(&self, page: &str, content: &str, reason: &str)
        -> Result<(), ToolboxError>;
}
