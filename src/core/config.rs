//! Engine configuration, loadable from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::loader::{read_ron, LoadError};
use crate::schema::chat::ChatKind;

/// Hearing distances for proximity chat, in yards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListenRanges {
    #[serde(default = "default_say")]
    pub say: f32,
    #[serde(default = "default_yell")]
    pub yell: f32,
    #[serde(default = "default_text_emote")]
    pub text_emote: f32,
}

fn default_say() -> f32 {
    25.0
}

fn default_yell() -> f32 {
    300.0
}

fn default_text_emote() -> f32 {
    25.0
}

impl Default for ListenRanges {
    fn default() -> Self {
        Self {
            say: default_say(),
            yell: default_yell(),
            text_emote: default_text_emote(),
        }
    }
}

impl ListenRanges {
    /// Proximity radius for a chat kind. Kinds without a dedicated range
    /// use the say range.
    pub fn for_kind(&self, kind: ChatKind) -> f32 {
        match kind {
            ChatKind::Yell => self.yell,
            ChatKind::Emote | ChatKind::RaidBossEmote => self.text_emote,
            _ => self.say,
        }
    }
}

/// Tunables for the text engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    #[serde(default)]
    pub listen_ranges: ListenRanges,
    /// Longest recent-id window kept per speaker and group.
    #[serde(default = "default_repeat_window")]
    pub repeat_window: usize,
    /// Speakers with repeat history kept before the least recent is evicted.
    #[serde(default = "default_max_tracked_speakers")]
    pub max_tracked_speakers: usize,
    /// RNG seed for line selection.
    #[serde(default)]
    pub seed: u64,
}

fn default_repeat_window() -> usize {
    u8::MAX as usize
}

fn default_max_tracked_speakers() -> usize {
    65_536
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            listen_ranges: ListenRanges::default(),
            repeat_window: default_repeat_window(),
            max_tracked_speakers: default_max_tracked_speakers(),
            seed: 0,
        }
    }
}

impl TextConfig {
    pub fn load_from_ron(path: &Path) -> Result<TextConfig, LoadError> {
        read_ron(path)
    }

    pub fn parse_ron(input: &str) -> Result<TextConfig, ron::error::SpannedError> {
        ron::from_str(input)
    }
}
