//! Session-scoped handle directory.
//!
//! Entries live in a single arena; the row-id and identifier indexes point into
//! it, so both lookups see the same entry. The directory is built once per
//! session and is read-only afterwards.

use std::collections::HashMap;

use crate::models::{HandleEntry, RawRow};

/// Bidirectional lookup `row_id <-> identifier` over the handle table.
#[derive(Debug, Clone, Default)]
pub struct HandleDirectory {
    entries: Vec<HandleEntry>,
    by_row_id: HashMap<i64, usize>,
    by_identifier: HashMap<String, usize>,
}

impl HandleDirectory {
    /// Build from loaded entries. On duplicate keys the last entry wins.
    ///
    /// `handle` is unique on `(id, service)`, so one number registered for both
    /// iMessage and SMS shows up twice; the later row answers identifier lookups.
    #[must_use]
    pub fn build(entries: impl IntoIterator<Item = HandleEntry>) -> Self {
        let mut directory = Self::default();
        for entry in entries {
            let index = directory.entries.len();
            directory.by_row_id.insert(entry.row_id, index);
            if let Some(identifier) = &entry.identifier {
                directory.by_identifier.insert(identifier.clone(), index);
            }
            directory.entries.push(entry);
        }
        directory
    }

    /// Build from raw handle rows, skipping rows without a row id.
    #[must_use]
    pub fn from_rows(rows: &[RawRow]) -> Self {
        Self::build(rows.iter().filter_map(HandleEntry::from_raw))
    }

    /// An empty directory: every lookup misses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entry for a handle row id
    #[must_use]
    pub fn by_row_id(&self, row_id: i64) -> Option<&HandleEntry> {
        self.by_row_id.get(&row_id).map(|&index| &self.entries[index])
    }

    /// Entry for an identifier
    #[must_use]
    pub fn by_identifier(&self, identifier: &str) -> Option<&HandleEntry> {
        self.by_identifier.get(identifier).map(|&index| &self.entries[index])
    }

    /// Number of loaded entries, duplicates included
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
