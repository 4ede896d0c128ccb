//! Toolbox facade
//!
//! Ties the settings page to the usernotes store (the settings' usernote
//! types seed the allowed warning kinds) and adds bulk operations built on
//! the store: pruning old notes, searching and removing by list position.

use crate::config::ToolboxConfig;
use crate::error::ToolboxError;
use crate::settings::ToolboxSettings;
use crate::types::{Timestamp, WarningIndex};
use crate::usernotes::{Note, ReadMode, SortOrder, StoredNote, UsernotesStore, WriteMode};
use crate::wiki::WikiPageStore;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

const SECONDS_PER_DAY: i64 = 86_400;

/// Which notes a prune considers old.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneCutoff {
    /// Older than this many days before now
    Days(u32),
    /// At or before this unix timestamp
    Before(Timestamp),
}

impl PruneCutoff {
    pub fn timestamp(&self, now: Timestamp) -> Timestamp {
        match *self {
            PruneCutoff::Days(days) => now - i64::from(days) * SECONDS_PER_DAY,
            PruneCutoff::Before(ts) => ts,
        }
    }
}

impl fmt::Display for PruneCutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneCutoff::Days(days) => write!(f, "older than {} days", days),
            PruneCutoff::Before(ts) => write!(f, "older than {}", ts),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneOptions {
    pub cutoff: PruneCutoff,
    /// Warning kinds kept regardless of age
    pub exclude_kinds: Vec<String>,
    pub dry_run: bool,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self {
            cutoff: PruneCutoff::Days(180),
            exclude_kinds: Vec::new(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneReport {
    pub cutoff: Timestamp,
    pub notes_removed: usize,
    pub users_affected: usize,
    pub notes_preserved: usize,
    pub dry_run: bool,
    pub summary: String,
}

impl fmt::Display for PruneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

/// Note field a search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Note,
    User,
    Moderator,
    Warning,
    Link,
    /// Query is a unix timestamp; match notes strictly before it
    TimeBefore,
    /// Query is a unix timestamp; match notes strictly after it
    TimeAfter,
}

impl FromStr for SearchField {
    type Err = ToolboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "note" | "text" => Ok(SearchField::Note),
            "user" => Ok(SearchField::User),
            "moderator" | "mod" => Ok(SearchField::Moderator),
            "warning" => Ok(SearchField::Warning),
            "link" | "url" => Ok(SearchField::Link),
            "before" => Ok(SearchField::TimeBefore),
            "after" => Ok(SearchField::TimeAfter),
            other => Err(ToolboxError::InvalidQuery(format!(
                "unknown search field '{}' (note, user, moderator, warning, link, before, after)",
                other
            ))),
        }
    }
}

pub struct Toolbox {
    subreddit: String,
    wiki: Arc<dyn WikiPageStore>,
    config: Arc<ToolboxConfig>,
    settings: Option<ToolboxSettings>,
    usernotes: UsernotesStore,
}

impl Toolbox {
    pub fn new(
        subreddit: impl Into<String>,
        wiki: Arc<dyn WikiPageStore>,
        config: Arc<ToolboxConfig>,
    ) -> Self {
        let subreddit = subreddit.into();
        let usernotes = UsernotesStore::new(subreddit.clone(), wiki.clone(), config.clone());
        Self {
            subreddit,
            wiki,
            config,
            settings: None,
            usernotes,
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub fn config(&self) -> &ToolboxConfig {
        &self.config
    }

    /// Load settings, then usernotes.
    pub fn load(&mut self) -> Result<(), ToolboxError> {
        self.load_settings()?;
        self.usernotes.load()?;
        Ok(())
    }

    /// Read the settings page and pass its warning kinds to the store.
    /// A missing settings page leaves the document's own kinds as the only
    /// allowed ones.
    pub fn load_settings(&mut self) -> Result<Option<&ToolboxSettings>, ToolboxError> {
        match ToolboxSettings::load(self.wiki.as_ref(), &self.config) {
            Ok(settings) => {
                self.usernotes.set_allowed_warnings(settings.warning_kinds());
                self.settings = Some(settings);
            }
            Err(ToolboxError::PageNotFound { page }) => {
                warn!(page = %page, subreddit = %self.subreddit, "Toolbox settings page is missing");
                self.settings = None;
            }
            Err(e) => return Err(e),
        }
        Ok(self.settings.as_ref())
    }

    pub fn settings(&self) -> Option<&ToolboxSettings> {
        self.settings.as_ref()
    }

    pub fn usernotes(&self) -> &UsernotesStore {
        &self.usernotes
    }

    pub fn usernotes_mut(&mut self) -> &mut UsernotesStore {
        &mut self.usernotes
    }

    /// Remove old notes in one batch and save once.
    pub fn prune_notes(&mut self, options: &PruneOptions) -> Result<PruneReport, ToolboxError> {
        self.prune_notes_at(options, chrono::Utc::now().timestamp())
    }

    /// [`Toolbox::prune_notes`] against a fixed clock.
    pub fn prune_notes_at(
        &mut self,
        options: &PruneOptions,
        now: Timestamp,
    ) -> Result<PruneReport, ToolboxError> {
        let cutoff = options.cutoff.timestamp(now);
        self.usernotes.load()?;

        let excluded: Vec<WarningIndex> = self
            .usernotes
            .document()?
            .warnings()
            .kinds()
            .iter()
            .enumerate()
            .filter(|(_, kind)| {
                kind.as_ref()
                    .is_some_and(|kind| options.exclude_kinds.contains(kind))
            })
            .map(|(idx, _)| idx)
            .collect();

        let mut notes_preserved = 0;
        let keep = |_: &str, note: &StoredNote| {
            if note.time > cutoff {
                return true;
            }
            if excluded.contains(&note.warning) {
                notes_preserved += 1;
                return true;
            }
            false
        };
        let removed = if options.dry_run {
            self.usernotes.document()?.clone().retain_notes(keep)
        } else {
            self.usernotes.retain_notes(keep)?
        };
        let notes_removed: usize = removed.iter().map(|(_, count)| count).sum();
        let users_affected = removed.len();

        let summary = if options.dry_run {
            format!(
                "prune would bulk delete {} notes on {} users {}",
                notes_removed, users_affected, options.cutoff
            )
        } else {
            format!(
                "bulk deleted {} notes on {} users {}",
                notes_removed, users_affected, options.cutoff
            )
        };

        if !options.dry_run && notes_removed > 0 {
            self.usernotes.save(&format!("\"{}\"", summary))?;
        }
        info!(
            removed = notes_removed,
            users = users_affected,
            preserved = notes_preserved,
            dry_run = options.dry_run,
            "Pruned usernotes"
        );

        Ok(PruneReport {
            cutoff,
            notes_removed,
            users_affected,
            notes_preserved,
            dry_run: options.dry_run,
            summary,
        })
    }

    /// Notes matching `query`, newest first.
    ///
    /// Text fields match case-insensitively on substrings; the time fields
    /// parse the query as a unix timestamp.
    pub fn search_notes(
        &mut self,
        query: &str,
        field: SearchField,
        read: ReadMode,
    ) -> Result<Vec<Note>, ToolboxError> {
        let matcher = Matcher::new(query, field)?;
        let notes = self.usernotes.list_all_notes(read, SortOrder::NewestFirst)?;
        Ok(notes.into_iter().filter(|n| matcher.matches(n)).collect())
    }

    /// Remove the note at `position` in the user's newest-first list.
    pub fn remove_note_at(
        &mut self,
        user: &str,
        position: usize,
        mode: WriteMode,
    ) -> Result<String, ToolboxError> {
        self.usernotes.remove_at(user, position, mode)
    }
}

enum Matcher {
    Text(SearchField, String),
    Before(Timestamp),
    After(Timestamp),
}

impl Matcher {
    fn new(query: &str, field: SearchField) -> Result<Self, ToolboxError> {
        let parse_time = || {
            query.trim().parse::<Timestamp>().map_err(|_| {
                ToolboxError::InvalidQuery(format!("'{}' is not a unix timestamp", query))
            })
        };
        Ok(match field {
            SearchField::TimeBefore => Matcher::Before(parse_time()?),
            SearchField::TimeAfter => Matcher::After(parse_time()?),
            text => Matcher::Text(text, query.to_lowercase()),
        })
    }

    fn matches(&self, note: &Note) -> bool {
        match self {
            Matcher::Before(ts) => note.time < *ts,
            Matcher::After(ts) => note.time > *ts,
            Matcher::Text(field, needle) => {
                let haystack = match field {
                    SearchField::Note => Some(note.note.as_str()),
                    SearchField::User => Some(note.user.as_str()),
                    SearchField::Moderator => note.moderator.as_deref(),
                    SearchField::Warning => note.warning.as_deref(),
                    SearchField::Link => note.link.as_deref(),
                    SearchField::TimeBefore | SearchField::TimeAfter => None,
                };
                haystack.is_some_and(|h| h.to_lowercase().contains(needle.as_str()))
            }
        }
    }
}
