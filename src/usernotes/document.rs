//! Usernotes document model
//!
//! In-memory (expanded) form of the usernotes page: the schema version, the
//! two constants tables and the per-user note lists that live inside the
//! compressed blob on the wire.

use crate::error::ToolboxError;
use crate::types::{ModIndex, Timestamp, WarningIndex};
use crate::usernotes::index::{KnownWarnings, ModeratorTable, WarningTable};
use crate::usernotes::link::LinkCodec;
use crate::usernotes::note::{Note, SortOrder};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Compact on-disk note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNote {
    #[serde(rename = "t")]
    pub time: Timestamp,
    #[serde(rename = "n")]
    pub text: String,
    #[serde(rename = "m")]
    pub moderator: ModIndex,
    #[serde(rename = "w")]
    pub warning: WarningIndex,
    /// Shortlink token, empty when the note has no link
    #[serde(rename = "l", default, deserialize_with = "null_as_empty")]
    pub link: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Notes on one user, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "ns", default)]
    pub notes: Vec<StoredNote>,
}

/// Username → record mapping that keeps page order through a round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserMap {
    entries: Vec<(String, UserRecord)>,
}

impl UserMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored key matching `user` ignoring case.
    pub fn find_key(&self, user: &str) -> Option<&str> {
        let wanted = user.to_lowercase();
        self.entries
            .iter()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .map(|(name, _)| name.as_str())
    }

    fn position(&self, user: &str) -> Option<usize> {
        let wanted = user.to_lowercase();
        self.entries
            .iter()
            .position(|(name, _)| name.to_lowercase() == wanted)
    }

    pub fn get(&self, user: &str) -> Option<&UserRecord> {
        self.position(user).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, user: &str) -> Option<&mut UserRecord> {
        self.position(user).map(move |idx| &mut self.entries[idx].1)
    }

    /// Record for `user`, created under the supplied casing if no key matches.
    pub fn entry(&mut self, user: &str) -> &mut UserRecord {
        let idx = match self.position(user) {
            Some(idx) => idx,
            None => {
                self.entries.push((user.to_string(), UserRecord::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn remove(&mut self, user: &str) -> Option<(String, UserRecord)> {
        self.position(user).map(|idx| self.entries.remove(idx))
    }

    pub fn insert(&mut self, user: String, record: UserRecord) {
        match self.position(&user) {
            Some(idx) => self.entries[idx].1 = record,
            None => self.entries.push((user, record)),
        }
    }

    /// Keep only the records `keep` accepts.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &UserRecord) -> bool) {
        self.entries.retain(|(name, record)| keep(name, record));
    }

    /// Drop users whose note list is empty; returns their names.
    pub fn drop_empty(&mut self) -> Vec<String> {
        let mut dropped = Vec::new();
        self.entries.retain(|(name, record)| {
            if record.notes.is_empty() {
                dropped.push(name.clone());
                false
            } else {
                true
            }
        });
        dropped
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserRecord)> {
        self.entries.iter().map(|(name, rec)| (name.as_str(), rec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for UserMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, record) in &self.entries {
            map.serialize_entry(name, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for UserMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UserMapVisitor;

        impl<'de> Visitor<'de> for UserMapVisitor {
            type Value = UserMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of usernames to note records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<UserMap, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, record)) = access.next_entry::<String, UserRecord>()? {
                    entries.push((name, record));
                }
                Ok(UserMap { entries })
            }
        }

        deserializer.deserialize_map(UserMapVisitor)
    }
}

/// The full usernotes document in expanded form.
#[derive(Debug, Clone, PartialEq)]
pub struct NotesDocument {
    pub(crate) version: u32,
    pub(crate) moderators: ModeratorTable,
    pub(crate) warnings: WarningTable,
    pub(crate) users: UserMap,
    /// Top-level and constants keys this engine does not interpret, written back as-is
    pub(crate) extra: serde_json::Map<String, serde_json::Value>,
    pub(crate) extra_constants: serde_json::Map<String, serde_json::Value>,
}

impl NotesDocument {
    /// Empty document at the given schema version.
    pub fn new(version: u32) -> Self {
        Self {
            version,
            moderators: ModeratorTable::new(),
            warnings: WarningTable::new(),
            users: UserMap::new(),
            extra: serde_json::Map::new(),
            extra_constants: serde_json::Map::new(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn moderators(&self) -> &ModeratorTable {
        &self.moderators
    }

    pub fn warnings(&self) -> &WarningTable {
        &self.warnings
    }

    pub fn users(&self) -> &UserMap {
        &self.users
    }

    /// Check every stored index against the constants tables.
    pub fn validate(&self) -> Result<(), ToolboxError> {
        for (_, record) in self.users.iter() {
            for note in &record.notes {
                self.moderators.value_at(note.moderator)?;
                self.warnings.value_at(note.warning)?;
            }
        }
        Ok(())
    }

    /// Add a note at the head of the user's list.
    ///
    /// Nothing is mutated when the warning kind or link is rejected.
    pub fn add_note(
        &mut self,
        note: &Note,
        moderator: &str,
        known: &KnownWarnings,
        links: &LinkCodec,
    ) -> Result<(), ToolboxError> {
        let link = match note.link.as_deref() {
            Some(url) => links.compress(url)?,
            None => String::new(),
        };

        let warning = self.warnings.index_of(note.warning.as_deref(), known)?;
        let moderator = self.moderators.index_of(moderator);

        let stored = StoredNote {
            time: note.time,
            text: note.note.clone(),
            moderator,
            warning,
            link,
        };
        self.users.entry(&note.user).notes.insert(0, stored);
        Ok(())
    }

    /// Remove the first note on `user` written at `timestamp`.
    ///
    /// Returns true when the user's last note went with it.
    pub fn remove_note(&mut self, user: &str, timestamp: Timestamp) -> Result<bool, ToolboxError> {
        let record = self
            .users
            .get_mut(user)
            .ok_or_else(|| ToolboxError::UserNotFound(user.to_string()))?;
        let idx = record
            .notes
            .iter()
            .position(|n| n.time == timestamp)
            .ok_or_else(|| ToolboxError::NoteNotFound {
                user: user.to_string(),
                timestamp,
            })?;
        record.notes.remove(idx);

        if record.notes.is_empty() {
            self.users.remove(user);
            return Ok(true);
        }
        Ok(false)
    }

    /// Remove the note at `position` in the user's newest-first listing.
    ///
    /// Notes sharing a timestamp keep their stored order in the listing, so
    /// the position always names exactly one stored entry. Returns the
    /// removed note and whether the user's last note went with it.
    pub fn remove_note_at(
        &mut self,
        user: &str,
        position: usize,
    ) -> Result<(StoredNote, bool), ToolboxError> {
        let record = self
            .users
            .get_mut(user)
            .ok_or_else(|| ToolboxError::UserNotFound(user.to_string()))?;
        let idx = newest_first_order(&record.notes)
            .get(position)
            .copied()
            .ok_or_else(|| ToolboxError::NotePositionOutOfRange {
                user: user.to_string(),
                position,
                count: record.notes.len(),
            })?;
        let removed = record.notes.remove(idx);

        if record.notes.is_empty() {
            self.users.remove(user);
            return Ok((removed, true));
        }
        Ok((removed, false))
    }

    /// Keep only the notes `keep` accepts, judging each stored entry on its
    /// own. Users left without notes are dropped. Returns how many notes each
    /// affected user lost, in page order.
    pub fn retain_notes(
        &mut self,
        mut keep: impl FnMut(&str, &StoredNote) -> bool,
    ) -> Vec<(String, usize)> {
        let mut removed = Vec::new();
        let names: Vec<String> = self.users.names().map(str::to_string).collect();
        for name in names {
            let Some(record) = self.users.get_mut(&name) else {
                continue;
            };
            let before = record.notes.len();
            record.notes.retain(|note| keep(&name, note));
            let lost = before - record.notes.len();
            if lost > 0 {
                removed.push((name, lost));
            }
        }
        self.users.retain(|_, record| !record.notes.is_empty());
        removed
    }

    /// Drop a user and every note on them.
    pub fn remove_all_notes(&mut self, user: &str) -> Result<UserRecord, ToolboxError> {
        self.users
            .remove(user)
            .map(|(_, record)| record)
            .ok_or_else(|| ToolboxError::UserNotFound(user.to_string()))
    }

    /// Notes on `user`, newest first. Unknown users have no notes.
    pub fn list_notes(&self, user: &str, links: &LinkCodec) -> Result<Vec<Note>, ToolboxError> {
        let Some(key) = self.users.find_key(user) else {
            return Ok(Vec::new());
        };
        let record = self.users.get(key).map(|r| r.notes.as_slice()).unwrap_or(&[]);
        newest_first_order(record)
            .into_iter()
            .map(|idx| self.expand_note(key, &record[idx], links))
            .collect()
    }

    pub fn list_users(&self) -> Vec<String> {
        self.users.names().map(str::to_string).collect()
    }

    pub fn list_all_notes(
        &self,
        order: SortOrder,
        links: &LinkCodec,
    ) -> Result<Vec<Note>, ToolboxError> {
        let mut notes = Vec::new();
        for (name, record) in self.users.iter() {
            for stored in &record.notes {
                notes.push(self.expand_note(name, stored, links)?);
            }
        }
        match order {
            SortOrder::NewestFirst => notes.sort_by(|a, b| b.time.cmp(&a.time)),
            SortOrder::OldestFirst => notes.sort_by(|a, b| a.time.cmp(&b.time)),
        }
        Ok(notes)
    }

    fn expand_note(
        &self,
        user: &str,
        stored: &StoredNote,
        links: &LinkCodec,
    ) -> Result<Note, ToolboxError> {
        Ok(Note {
            user: user.to_string(),
            note: stored.text.clone(),
            time: stored.time,
            moderator: Some(self.moderators.value_at(stored.moderator)?.to_string()),
            warning: self.warnings.value_at(stored.warning)?.map(str::to_string),
            link: links.expand(&stored.link),
        })
    }
}

/// Stored indices of `notes` sorted newest first; ties keep stored order.
fn newest_first_order(notes: &[StoredNote]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..notes.len()).collect();
    order.sort_by(|&a, &b| notes[b].time.cmp(&notes[a].time));
    order
}
