//! Expanded note and call-mode types.

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// A usernote as callers see it: names and URLs instead of indices and tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub user: String,
    pub note: String,
    pub time: Timestamp,
    /// `None` on write means "use the configured default moderator"
    pub moderator: Option<String>,
    pub warning: Option<String>,
    pub link: Option<String>,
}

impl Note {
    /// New note stamped with the current time.
    pub fn new(user: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            note: note.into(),
            time: chrono::Utc::now().timestamp(),
            moderator: None,
            warning: None,
            link: None,
        }
    }

    pub fn with_time(mut self, time: Timestamp) -> Self {
        self.time = time;
        self
    }

    pub fn with_moderator(mut self, moderator: impl Into<String>) -> Self {
        self.moderator = Some(moderator.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.user, self.note)
    }
}

/// Whether a mutation is saved immediately or left for a trailing `save()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Load, mutate, save
    #[default]
    Immediate,
    /// Mutate the in-memory document only
    Batch,
}

/// Whether a read uses the in-memory document or reloads the page first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    #[default]
    Local,
    Fresh,
}

/// Ordering of notes flattened across users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}
