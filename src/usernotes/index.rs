//! Constants tables
//!
//! Notes store moderators and warning kinds as integer positions into two
//! append-only arrays kept in the document's `constants` section. Entries are
//! never removed or reordered, so an index stays valid for the lifetime of a
//! loaded document.

use crate::error::ToolboxError;
use crate::types::{ModIndex, WarningIndex};
use serde::{Deserialize, Serialize};

/// Append-only lookup-by-value array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexTable<T> {
    entries: Vec<T>,
}

impl<T: PartialEq> IndexTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn from_entries(entries: Vec<T>) -> Self {
        Self { entries }
    }

    /// Position of the first entry equal to `value`.
    pub fn position(&self, value: &T) -> Option<usize> {
        self.entries.iter().position(|entry| entry == value)
    }

    /// Position of `value`, appending it first when absent.
    pub fn position_or_append(&mut self, value: T) -> usize {
        match self.position(&value) {
            Some(idx) => idx,
            None => {
                self.entries.push(value);
                self.entries.len() - 1
            }
        }
    }

    pub fn value_at(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.position(value).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }
}

/// Moderator names. Unknown moderators are registered on first use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeratorTable(IndexTable<String>);

impl ModeratorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names(names: Vec<String>) -> Self {
        Self(IndexTable::from_entries(names))
    }

    pub fn index_of(&mut self, moderator: &str) -> ModIndex {
        self.0.position_or_append(moderator.to_string())
    }

    pub fn value_at(&self, index: ModIndex) -> Result<&str, ToolboxError> {
        self.0.value_at(index).map(String::as_str).ok_or_else(|| {
            ToolboxError::CorruptDocument(format!(
                "moderator index {} out of range ({} moderators)",
                index,
                self.0.len()
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        self.0.entries()
    }
}

/// Warning kinds; `None` is the "no warning" kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarningTable(IndexTable<Option<String>>);

impl WarningTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_kinds(kinds: Vec<Option<String>>) -> Self {
        Self(IndexTable::from_entries(kinds))
    }

    /// Index of a warning kind.
    ///
    /// A kind missing from the table is only registered when `known` allows
    /// it; otherwise the write must fail before anything is mutated.
    pub fn index_of(
        &mut self,
        kind: Option<&str>,
        known: &KnownWarnings,
    ) -> Result<WarningIndex, ToolboxError> {
        let value = kind.map(str::to_string);
        if let Some(idx) = self.0.position(&value) {
            return Ok(idx);
        }
        if !known.contains(kind) {
            return Err(ToolboxError::InvalidWarningKind(
                kind.unwrap_or("none").to_string(),
            ));
        }
        Ok(self.0.position_or_append(value))
    }

    pub fn value_at(&self, index: WarningIndex) -> Result<Option<&str>, ToolboxError> {
        self.0
            .value_at(index)
            .map(Option::as_deref)
            .ok_or_else(|| {
                ToolboxError::CorruptDocument(format!(
                    "warning index {} out of range ({} warnings)",
                    index,
                    self.0.len()
                ))
            })
    }

    pub fn contains(&self, kind: Option<&str>) -> bool {
        self.0.contains(&kind.map(str::to_string))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn kinds(&self) -> &[Option<String>] {
        self.0.entries()
    }
}

/// Warning kinds a write may use: the document table plus an externally
/// supplied allowed set (usually the settings page). Always includes `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownWarnings {
    kinds: Vec<Option<String>>,
}

impl Default for KnownWarnings {
    fn default() -> Self {
        Self { kinds: vec![None] }
    }
}

impl KnownWarnings {
    pub fn compute(table: &WarningTable, allowed: &[String]) -> Self {
        let mut known = Self::default();
        for kind in table.kinds() {
            known.insert(kind.clone());
        }
        for kind in allowed {
            known.insert(Some(kind.clone()));
        }
        known
    }

    fn insert(&mut self, kind: Option<String>) {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
    }

    pub fn contains(&self, kind: Option<&str>) -> bool {
        self.kinds.iter().any(|k| k.as_deref() == kind)
    }

    pub fn kinds(&self) -> &[Option<String>] {
        &self.kinds
    }
}
