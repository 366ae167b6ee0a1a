//! Text catalog: creature template -> text group -> ordered entries.

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::schema::broadcast_text::BroadcastTextStore;
use crate::schema::text::{TextEntry, TextRow};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextError {
    #[error("no texts for creature template {template}")]
    NoTexts { template: u32 },
    #[error("no text group {group} for creature template {template}")]
    NoGroup { template: u32, group: u8 },
    #[error("text group {group} of creature template {template} is empty")]
    EmptyGroup { template: u32, group: u8 },
}

/// Entries sharing a template and group, in insertion order.
pub type TextGroup = Vec<TextEntry>;

/// Immutable-after-load mapping of every creature line.
#[derive(Debug, Clone, Default)]
pub struct TextCatalog {
    templates: FxHashMap<u32, FxHashMap<u8, TextGroup>>,
}

impl TextCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from storage rows, dropping malformed ones.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = TextRow>,
    {
        let mut catalog = Self::new();
        for row in rows {
            catalog.insert_row(row);
        }
        debug!(
            entries = catalog.len(),
            groups = catalog.group_count(),
            "loaded creature texts"
        );
        catalog
    }

    /// Insert one row. Returns false if the row was rejected.
    pub fn insert_row(&mut self, row: TextRow) -> bool {
        if !row.weight.is_finite() || row.weight < 0.0 {
            warn!(
                entry = row.entry,
                group = row.group,
                id = row.id,
                weight = row.weight,
                "creature text has an invalid weight, skipped"
            );
            return false;
        }

        let group = self
            .templates
            .entry(row.entry)
            .or_default()
            .entry(row.group)
            .or_default();
        if group.iter().any(|e| e.id == row.id) {
            warn!(
                entry = row.entry,
                group = row.group,
                id = row.id,
                "duplicate creature text id, skipped"
            );
            return false;
        }

        group.push(TextEntry::from(row));
        true
    }

    /// Entries of a group in catalog order.
    pub fn group(&self, template: u32, group: u8) -> Result<&[TextEntry], TextError> {
        let holder = self
            .templates
            .get(&template)
            .ok_or(TextError::NoTexts { template })?;
        let entries = holder
            .get(&group)
            .ok_or(TextError::NoGroup { template, group })?;
        if entries.is_empty() {
            return Err(TextError::EmptyGroup { template, group });
        }
        Ok(entries)
    }

    /// Direct lookup by id. Weight has no effect here.
    pub fn entry(&self, template: u32, group: u8, id: u8) -> Option<&TextEntry> {
        self.templates
            .get(&template)?
            .get(&group)?
            .iter()
            .find(|e| e.id == id)
    }

    /// Returns true if the template has a non-empty group with this id.
    pub fn exists(&self, template: u32, group: u8) -> bool {
        self.group(template, group).is_ok()
    }

    /// Group ids defined for a template, sorted.
    pub fn group_ids(&self, template: u32) -> Vec<u8> {
        let mut ids: Vec<u8> = self
            .templates
            .get(&template)
            .map(|h| h.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Every entry, grouped but in no particular group order.
    pub fn entries(&self) -> impl Iterator<Item = &TextEntry> {
        self.templates
            .values()
            .flat_map(|h| h.values())
            .flat_map(|g| g.iter())
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn group_count(&self) -> usize {
        self.templates.values().map(|h| h.len()).sum()
    }

    /// Reset broadcast references that the catalog cannot resolve.
    pub fn validate_broadcast_ids(&mut self, store: &dyn BroadcastTextStore) -> usize {
        let mut reset = 0;
        for entry in self.entries_mut() {
            if entry.broadcast_text_id != 0 && store.lookup(entry.broadcast_text_id).is_none() {
                warn!(
                    entry = entry.template,
                    group = entry.group,
                    id = entry.id,
                    broadcast_text_id = entry.broadcast_text_id,
                    "creature text references a missing broadcast text, reference cleared"
                );
                entry.broadcast_text_id = 0;
                reset += 1;
            }
        }
        reset
    }

    /// Link entries without a broadcast reference to the broadcast text
    /// whose default-locale wording matches their literal text.
    pub fn fill_missing_broadcast_texts(&mut self, store: &dyn BroadcastTextStore) -> usize {
        let mut filled = 0;
        for entry in self.entries_mut() {
            if entry.broadcast_text_id != 0 || entry.text.is_empty() {
                continue;
            }
            if let Some(bct) = store.records().find(|b| b.matches_default_text(&entry.text)) {
                entry.broadcast_text_id = bct.id;
                filled += 1;
            }
        }
        if filled > 0 {
            debug!(filled, "linked creature texts to broadcast texts");
        }
        filled
    }

    fn entries_mut(&mut self) -> impl Iterator<Item = &mut TextEntry> {
        self.templates
            .values_mut()
            .flat_map(|h| h.values_mut())
            .flat_map(|g| g.iter_mut())
    }
}
