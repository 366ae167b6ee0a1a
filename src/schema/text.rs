use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::chat::{ChatKind, Language, Locale};

/// One candidate line within a creature's text group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEntry {
    /// Creature template that owns the line.
    pub template: u32,
    pub group: u8,
    /// Unique within the group.
    pub id: u8,
    /// Literal text. Empty when the line is sourced from the broadcast
    /// text catalog.
    pub text: String,
    pub kind: ChatKind,
    pub language: Language,
    /// Selection weight. Zero keeps the entry addressable by id but out of
    /// random draws.
    pub weight: f32,
    pub emote: u32,
    /// How long the line holds the speaker, in milliseconds.
    pub duration: u32,
    pub sound: u32,
    /// Reference into the broadcast text catalog, 0 for none.
    pub broadcast_text_id: u32,
}

impl TextEntry {
    pub fn key(&self) -> TextKey {
        TextKey::new(self.template, self.group, self.id)
    }

    pub fn is_drawable(&self) -> bool {
        self.weight > 0.0
    }
}

/// Composite key addressing a single entry.
///
/// Ordering is lexicographic over (template, group, id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextKey {
    pub template: u32,
    pub group: u8,
    pub id: u8,
}

impl TextKey {
    pub fn new(template: u32, group: u8, id: u8) -> Self {
        Self {
            template,
            group,
            id,
        }
    }
}

/// A persisted text row as it comes out of storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRow {
    pub entry: u32,
    pub group: u8,
    pub id: u8,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub kind: ChatKind,
    #[serde(default)]
    pub language: u32,
    #[serde(default)]
    pub weight: f32,
    #[serde(default)]
    pub emote: u32,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub sound: u32,
    #[serde(default)]
    pub broadcast_text_id: u32,
}

impl From<TextRow> for TextEntry {
    fn from(row: TextRow) -> Self {
        TextEntry {
            template: row.entry,
            group: row.group,
            id: row.id,
            text: row.text,
            kind: row.kind,
            language: Language(row.language),
            weight: row.weight,
            emote: row.emote,
            duration: row.duration,
            sound: row.sound,
            broadcast_text_id: row.broadcast_text_id,
        }
    }
}

/// A persisted locale override row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleRow {
    pub entry: u32,
    pub group: u8,
    pub id: u8,
    pub texts: BTreeMap<Locale, String>,
}

impl LocaleRow {
    pub fn key(&self) -> TextKey {
        TextKey::new(self.entry, self.group, self.id)
    }
}
