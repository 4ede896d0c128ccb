//! Usernotes store
//!
//! Owns one [`NotesDocument`] and moves it between the wiki page and memory:
//! `load()` fetches, checks the schema version and unpacks the blob; `save()`
//! packs the blob, enforces the page quota and pushes the page.
//!
//! There is no concurrency token. Another writer editing the page between
//! `load()` and `save()` is overwritten (last write wins).

use crate::config::{MissingPagePolicy, ToolboxConfig};
use crate::error::ToolboxError;
use crate::types::Timestamp;
use crate::usernotes::blob::{BlobCodec, WireDocument};
use crate::usernotes::document::{NotesDocument, StoredNote};
use crate::usernotes::index::{KnownWarnings, WarningTable};
use crate::usernotes::link::LinkCodec;
use crate::usernotes::note::{Note, ReadMode, SortOrder, WriteMode};
use crate::wiki::WikiPageStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct UsernotesStore {
    wiki: Arc<dyn WikiPageStore>,
    config: Arc<ToolboxConfig>,
    links: LinkCodec,
    codec: BlobCodec,
    document: Option<NotesDocument>,
    allowed_warnings: Vec<String>,
    known_warnings: KnownWarnings,
}

impl UsernotesStore {
    /// Unloaded store for one subreddit's usernotes page.
    pub fn new(
        subreddit: impl Into<String>,
        wiki: Arc<dyn WikiPageStore>,
        config: Arc<ToolboxConfig>,
    ) -> Self {
        let codec = BlobCodec::new(config.usernotes.compression_level);
        Self {
            wiki,
            links: LinkCodec::new(subreddit),
            codec,
            config,
            document: None,
            allowed_warnings: Vec::new(),
            known_warnings: KnownWarnings::default(),
        }
    }

    /// Warning kinds allowed beyond those already in the document, usually
    /// the settings page's usernote types.
    pub fn set_allowed_warnings(&mut self, kinds: Vec<String>) {
        self.allowed_warnings = kinds;
        self.refresh_known_warnings();
    }

    pub fn links(&self) -> &LinkCodec {
        &self.links
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Result<&NotesDocument, ToolboxError> {
        self.document.as_ref().ok_or(ToolboxError::NotLoaded)
    }

    /// Fetch the page and replace the in-memory document.
    pub fn load(&mut self) -> Result<&NotesDocument, ToolboxError> {
        let page = self.config.usernotes.page.clone();
        let content = match self.wiki.fetch_page(&page) {
            Ok(content) => content,
            Err(ToolboxError::PageNotFound { .. })
                if self.config.usernotes.missing_page == MissingPagePolicy::Create =>
            {
                self.initialize_page(&page)?
            }
            Err(e) => return Err(e),
        };

        let doc = self.decode(&page, &content)?;
        info!(
            page = %page,
            users = doc.users().len(),
            moderators = doc.moderators().len(),
            "Loaded usernotes"
        );
        self.document = Some(doc);
        self.refresh_known_warnings();
        self.document()
    }

    /// Push the in-memory document. Nothing is sent when encoding or the
    /// size check fails.
    pub fn save(&self, reason: &str) -> Result<(), ToolboxError> {
        let doc = self.document()?;
        let content = self.encode(doc)?;

        let limit = self.config.usernotes_page_limit();
        if content.len() > limit {
            return Err(ToolboxError::DocumentTooLarge {
                size: content.len(),
                limit,
            });
        }

        let page = &self.config.usernotes.page;
        let reason = format!("{} {}", reason, self.config.usernotes.identifier);
        match self.wiki.edit_page(page, &content, &reason) {
            Ok(()) => {}
            Err(e) if e.is_transport() => {
                warn!(page = %page, error = %e, "Wiki edit failed, retrying via raw edit");
                self.wiki.submit_raw_edit(page, &content, &reason)?;
            }
            Err(e) => return Err(e),
        }
        info!(page = %page, bytes = content.len(), reason = %reason, "Saved usernotes");
        Ok(())
    }

    /// Add a note; returns the edit reason.
    pub fn add(&mut self, note: Note, mode: WriteMode) -> Result<String, ToolboxError> {
        let moderator = note
            .moderator
            .clone()
            .or_else(|| self.config.usernotes.default_moderator.clone())
            .ok_or(ToolboxError::MissingModerator)?;
        self.prepare_write(mode)?;

        let doc = self.document.as_mut().ok_or(ToolboxError::NotLoaded)?;
        let snapshot = (mode == WriteMode::Immediate).then(|| doc.clone());
        let reason = match doc.users().find_key(&note.user) {
            Some(_) => format!("\"create new note on user '{}'\"", note.user),
            None => format!("\"create new note on new user '{}'\"", note.user),
        };
        doc.add_note(&note, &moderator, &self.known_warnings, &self.links)?;
        self.refresh_known_warnings();

        self.finish_write(mode, &reason, snapshot)?;
        Ok(reason)
    }

    /// Remove the note on `user` written at `timestamp`; returns the edit reason.
    pub fn remove(
        &mut self,
        user: &str,
        timestamp: Timestamp,
        mode: WriteMode,
    ) -> Result<String, ToolboxError> {
        self.prepare_write(mode)?;
        let doc = self.document.as_mut().ok_or(ToolboxError::NotLoaded)?;
        let snapshot = (mode == WriteMode::Immediate).then(|| doc.clone());
        let reason = if doc.remove_note(user, timestamp)? {
            format!("\"delete all notes on user '{}'\"", user)
        } else {
            format!("\"delete note {} on user '{}'\"", timestamp, user)
        };

        self.finish_write(mode, &reason, snapshot)?;
        Ok(reason)
    }

    /// Remove the note at `position` in the user's newest-first listing;
    /// returns the edit reason.
    pub fn remove_at(
        &mut self,
        user: &str,
        position: usize,
        mode: WriteMode,
    ) -> Result<String, ToolboxError> {
        self.prepare_write(mode)?;
        let doc = self.document.as_mut().ok_or(ToolboxError::NotLoaded)?;
        let snapshot = (mode == WriteMode::Immediate).then(|| doc.clone());
        let reason = match doc.remove_note_at(user, position)? {
            (_, true) => format!("\"delete all notes on user '{}'\"", user),
            (removed, false) => {
                format!("\"delete note {} on user '{}'\"", removed.time, user)
            }
        };

        self.finish_write(mode, &reason, snapshot)?;
        Ok(reason)
    }

    /// Drop every note `keep` rejects from the loaded document without
    /// saving. Returns the notes removed per user.
    pub fn retain_notes(
        &mut self,
        keep: impl FnMut(&str, &StoredNote) -> bool,
    ) -> Result<Vec<(String, usize)>, ToolboxError> {
        self.prepare_write(WriteMode::Batch)?;
        let doc = self.document.as_mut().ok_or(ToolboxError::NotLoaded)?;
        let removed = doc.retain_notes(keep);
        debug!(users = removed.len(), "Batched usernotes bulk removal");
        Ok(removed)
    }

    /// Remove every note on `user`; returns the edit reason.
    pub fn purge(&mut self, user: &str, mode: WriteMode) -> Result<String, ToolboxError> {
        self.prepare_write(mode)?;
        let doc = self.document.as_mut().ok_or(ToolboxError::NotLoaded)?;
        let snapshot = (mode == WriteMode::Immediate).then(|| doc.clone());
        doc.remove_all_notes(user)?;
        let reason = format!("\"delete all notes on user '{}'\"", user);

        self.finish_write(mode, &reason, snapshot)?;
        Ok(reason)
    }

    pub fn list_notes(&mut self, user: &str, read: ReadMode) -> Result<Vec<Note>, ToolboxError> {
        self.prepare_read(read)?;
        self.document()?.list_notes(user, &self.links)
    }

    pub fn list_users(&mut self, read: ReadMode) -> Result<Vec<String>, ToolboxError> {
        self.prepare_read(read)?;
        Ok(self.document()?.list_users())
    }

    pub fn list_all_notes(
        &mut self,
        read: ReadMode,
        order: SortOrder,
    ) -> Result<Vec<Note>, ToolboxError> {
        self.prepare_read(read)?;
        self.document()?.list_all_notes(order, &self.links)
    }

    /// Warning kinds a new note may carry, `None` included.
    pub fn warnings(&mut self, read: ReadMode) -> Result<Vec<Option<String>>, ToolboxError> {
        self.prepare_read(read)?;
        Ok(self.known_warnings.kinds().to_vec())
    }

    fn prepare_read(&mut self, read: ReadMode) -> Result<(), ToolboxError> {
        if read == ReadMode::Fresh || !self.is_loaded() {
            self.load()?;
        }
        Ok(())
    }

    fn prepare_write(&mut self, mode: WriteMode) -> Result<(), ToolboxError> {
        match mode {
            WriteMode::Immediate => {
                self.load()?;
            }
            WriteMode::Batch => {
                if !self.is_loaded() {
                    self.load()?;
                }
            }
        }
        Ok(())
    }

    /// Save after an immediate mutation, putting the snapshot back if the
    /// page could not be written.
    fn finish_write(
        &mut self,
        mode: WriteMode,
        reason: &str,
        snapshot: Option<NotesDocument>,
    ) -> Result<(), ToolboxError> {
        if mode == WriteMode::Batch {
            debug!(reason = %reason, "Batched usernotes mutation");
            return Ok(());
        }
        if let Err(e) = self.save(reason) {
            if let Some(previous) = snapshot {
                self.document = Some(previous);
                self.refresh_known_warnings();
            }
            return Err(e);
        }
        Ok(())
    }

    fn refresh_known_warnings(&mut self) {
        self.known_warnings = match &self.document {
            Some(doc) => KnownWarnings::compute(doc.warnings(), &self.allowed_warnings),
            None => KnownWarnings::compute(&WarningTable::new(), &self.allowed_warnings),
        };
    }

    fn initialize_page(&self, page: &str) -> Result<String, ToolboxError> {
        let doc = NotesDocument::new(self.config.usernotes.schema_version);
        let content = self.encode(&doc)?;
        let reason = format!(
            "\"initialize usernotes page\" {}",
            self.config.usernotes.identifier
        );
        self.wiki.create_page(page, &content, &reason)?;
        info!(page = %page, "Created empty usernotes page");
        Ok(content)
    }

    fn decode(&self, page: &str, content: &str) -> Result<NotesDocument, ToolboxError> {
        let raw: serde_json::Value = serde_json::from_str(content)?;
        let expected = self.config.usernotes.schema_version;
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

        let wire: WireDocument = serde_json::from_value(raw)?;
        let doc = self.codec.expand(wire)?;
        doc.validate()?;
        Ok(doc)
    }

    fn encode(&self, doc: &NotesDocument) -> Result<String, ToolboxError> {
        let wire = self.codec.compress(doc)?;
        Ok(serde_json::to_string(&wire)?)
    }
}
