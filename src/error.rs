//! Error types for usernotes operations.

use thiserror::Error;

/// Main error type for toolbox operations.
#[derive(Error, Debug)]
pub enum ToolboxError {
    /// The requested wiki page does not exist
    #[error("Wiki page not found: {page}")]
    PageNotFound { page: String },

    /// The page carries a schema version this engine does not speak
    #[error("Schema mismatch on page '{page}': requires version {expected}, page is version {found}")]
    SchemaVersionMismatch {
        page: String,
        expected: u32,
        found: u64,
    },

    #[error("{0} is not a valid warning kind")]
    InvalidWarningKind(String),

    #[error("Invalid link format: {0}")]
    InvalidLinkFormat(String),

    #[error("User has no notes: {0}")]
    UserNotFound(String),

    #[error("No note at {timestamp} on user '{user}'")]
    NoteNotFound { user: String, timestamp: i64 },

    /// Serialized page exceeds the configured quota
    #[error("Usernote data {} bytes too big to insert (size {size}, limit {limit})", .size.saturating_sub(*.limit))]
    DocumentTooLarge { size: usize, limit: usize },

    /// Connection-level failure talking to the page store
    #[error("Transport error: {0}")]
    Transport(String),

    /// The page store answered but refused the request
    #[error("Request rejected with status {status}: {message}")]
    RemoteRejected { status: u16, message: String },

    /// Index out of range or structurally invalid document content
    #[error("Corrupt usernotes document: {0}")]
    CorruptDocument(String),

    #[error("Usernotes have not been loaded")]
    NotLoaded,

    #[error("Note has no moderator and no default moderator is configured")]
    MissingModerator,

    #[error("User '{user}' has {count} notes, no note at position {position}")]
    NotePositionOutOfRange {
        user: String,
        position: usize,
        count: usize,
    },

    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Blob codec error: {0}")]
    Codec(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolboxError {
    /// Whether a failed edit may be retried through the fallback submission path.
    pub fn is_transport(&self) -> bool {
        matches!(self, ToolboxError::Transport(_))
    }
}

impl From<serde_json::Error> for ToolboxError {
    fn from(err: serde_json::Error) -> Self {
        ToolboxError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ToolboxError {
    fn from(err: config::ConfigError) -> Self {
        ToolboxError::ConfigError(err.to_string())
    }
}
