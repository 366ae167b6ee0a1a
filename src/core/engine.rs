//! The creature text engine: selection, localization and broadcast.
//!
//! Ties the published text tables, the repeat tracker and the broadcaster
//! together behind the calls game logic makes ("say group 2", "yell this
//! broadcast text", "whisper line 4 to this player").

use byteorder::{LittleEndian, WriteBytesExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::audience::{Audience, ChatBroadcaster};
use crate::core::config::TextConfig;
use crate::core::loader::{load_broadcast_texts, LoadError, RonTextSource, TextSource};
use crate::core::message::{BroadcastTextBuilder, CreatureTextBuilder, PlainChatBuilder};
use crate::core::repeat::RepeatTracker;
use crate::core::selection::select;
use crate::core::tables::TextTables;
use crate::core::world::{Speaker, WorldState};
use crate::schema::broadcast_text::{index_broadcast_texts, BroadcastText, BroadcastTextStore};
use crate::schema::chat::{ChatKind, Language, Locale, TextRange};
use crate::schema::entity::{Gender, Guid, Team};
use crate::schema::text::TextEntry;

/// Per-call options for sending a line.
///
/// `kind`, `language` and `sound` override the entry's own values when set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChatRequest {
    pub whisper_target: Guid,
    pub kind: Option<ChatKind>,
    pub language: Option<Language>,
    pub sound: Option<u32>,
    pub range: TextRange,
    pub team: Option<Team>,
    pub gm_only: bool,
}

impl ChatRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn whisper(mut self, target: Guid) -> Self {
        self.whisper_target = target;
        self
    }

    pub fn kind(mut self, kind: ChatKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn sound(mut self, sound: u32) -> Self {
        self.sound = Some(sound);
        self
    }

    pub fn range(mut self, range: TextRange) -> Self {
        self.range = range;
        self
    }

    pub fn team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    pub fn gm_only(mut self) -> Self {
        self.gm_only = true;
        self
    }

    fn audience(&self, kind: ChatKind) -> Audience {
        Audience {
            kind,
            target: self.whisper_target,
            range: self.range,
            team: self.team,
            gm_only: self.gm_only,
        }
    }
}

type SharedBroadcastTexts = Arc<dyn BroadcastTextStore + Send + Sync>;

/// The top-level text engine. Built via `CreatureTextEngine::builder()`.
///
/// Text tables are read-only once published; [`CreatureTextEngine::reload`]
/// replaces them whole. Selection mutates repeat history, so callers
/// serialize access per engine.
pub struct CreatureTextEngine {
    tables: Arc<TextTables>,
    broadcast_texts: SharedBroadcastTexts,
    repeats: RepeatTracker,
    config: TextConfig,
    rng: StdRng,
}

/// Builder for constructing a `CreatureTextEngine`.
#[derive(Default)]
pub struct CreatureTextEngineBuilder {
    texts_path: Option<PathBuf>,
    locales_path: Option<PathBuf>,
    broadcast_texts_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    /// Directly provided tables (for hosts with their own storage).
    tables: Option<TextTables>,
    /// Directly provided broadcast texts.
    broadcast_texts: Option<SharedBroadcastTexts>,
    /// Directly provided configuration.
    config: Option<TextConfig>,
}

impl CreatureTextEngine {
    pub fn builder() -> CreatureTextEngineBuilder {
        CreatureTextEngineBuilder::default()
    }

    pub fn tables(&self) -> Arc<TextTables> {
        Arc::clone(&self.tables)
    }

    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    pub fn broadcast_texts(&self) -> &dyn BroadcastTextStore {
        self.broadcast_texts.as_ref()
    }

    /// Publish freshly built tables. Repeat history is kept.
    pub fn reload(&mut self, tables: TextTables) {
        info!(
            entries = tables.catalog.len(),
            locales = tables.locales.len(),
            "creature text tables reloaded"
        );
        self.tables = Arc::new(tables);
    }

    /// Build tables from `source` and publish them. On error the current
    /// tables stay in place.
    pub fn reload_from(&mut self, source: &mut dyn TextSource) -> Result<(), LoadError> {
        let tables = TextTables::load(source, self.broadcast_texts.as_ref())?;
        self.reload(tables);
        Ok(())
    }

    /// Restart the selection RNG from `seed`. Repeat history is kept.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Drop repeat history for a destroyed speaker.
    pub fn forget_speaker(&mut self, speaker: Guid) {
        self.repeats.forget_speaker(speaker);
    }

    pub fn entry_exists(&self, template: u32, group: u8) -> bool {
        self.tables.catalog.exists(template, group)
    }

    /// Pick a line from a group for this speaker and remember it.
    pub fn select_entry(&mut self, speaker: Guid, template: u32, group: u8) -> Option<TextEntry> {
        let tables = Arc::clone(&self.tables);
        let entries = match tables.catalog.group(template, group) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(speaker = %speaker, error = %e, "no creature text to select");
                return None;
            }
        };

        let recent = self.repeats.recent(speaker, group);
        let selection = select(entries, recent, &mut self.rng)?;
        let entry = &entries[selection.index];

        if selection.tracked {
            if selection.window_reset {
                self.repeats.reset(speaker, group, true);
            }
            self.repeats.record(speaker, group, entry.id);
        }
        Some(entry.clone())
    }

    /// Select a line from `group` and send it. Returns the line's duration,
    /// or 0 if nothing was delivered.
    pub fn send_chat(
        &mut self,
        speaker: &dyn Speaker,
        group: u8,
        world: WorldState<'_>,
        request: &ChatRequest,
    ) -> u32 {
        match self.select_entry(speaker.guid(), speaker.template_id(), group) {
            Some(entry) => self.broadcast_entry(speaker, &entry, world, request),
            None => 0,
        }
    }

    /// Send one entry: its sound, its emote, then the localized chat line.
    ///
    /// Returns the entry's duration, or 0 when no recipient received the
    /// line.
    pub fn broadcast_entry(
        &self,
        speaker: &dyn Speaker,
        entry: &TextEntry,
        world: WorldState<'_>,
        request: &ChatRequest,
    ) -> u32 {
        let kind = request.kind.unwrap_or(entry.kind);
        let audience = request.audience(kind);
        let broadcaster = ChatBroadcaster::new(world, self.config.listen_ranges);

        let sound = request.sound.filter(|&s| s != 0).unwrap_or(entry.sound);
        if sound != 0 {
            self.play_sound(&broadcaster, speaker, sound, &audience);
        }
        if entry.emote != 0 {
            speaker.play_emote(entry.emote);
        }

        let builder = CreatureTextBuilder {
            speaker,
            tables: &self.tables,
            store: self.broadcast_texts.as_ref(),
            template: entry.template,
            group: entry.group,
            id: entry.id,
            kind,
            language: request.language.unwrap_or(entry.language),
            target: request.whisper_target,
            gender: speaker.gender(),
        };
        if broadcaster.send_chat(speaker, &builder, &audience) == 0 {
            return 0;
        }
        entry.duration
    }

    /// Send a specific line of a group, for scripted dialogue.
    pub fn broadcast_entry_by_id(
        &self,
        speaker: &dyn Speaker,
        group: u8,
        id: u8,
        world: WorldState<'_>,
        request: &ChatRequest,
    ) -> u32 {
        match self.tables.catalog.entry(speaker.template_id(), group, id) {
            Some(entry) => self.broadcast_entry(speaker, entry, world, request),
            None => {
                debug!(
                    speaker = %speaker.guid(),
                    template = speaker.template_id(),
                    group,
                    id,
                    "no creature text with this id"
                );
                0
            }
        }
    }

    /// Send every line of a group in catalog order. Returns the summed
    /// duration of the lines that were delivered.
    pub fn broadcast_group(
        &self,
        speaker: &dyn Speaker,
        group: u8,
        world: WorldState<'_>,
        request: &ChatRequest,
    ) -> u32 {
        let Ok(entries) = self.tables.catalog.group(speaker.template_id(), group) else {
            return 0;
        };
        entries
            .iter()
            .map(|entry| self.broadcast_entry(speaker, entry, world, request))
            .sum()
    }

    /// Send a broadcast text line directly by its catalog id. Yell unless
    /// the request says otherwise. Returns the number of deliveries.
    pub fn send_broadcast_text(
        &self,
        speaker: &dyn Speaker,
        broadcast_text_id: u32,
        world: WorldState<'_>,
        request: &ChatRequest,
    ) -> usize {
        let kind = request.kind.unwrap_or(ChatKind::Yell);
        let builder = BroadcastTextBuilder {
            speaker,
            kind,
            broadcast_text_id,
            target: request.whisper_target,
            gender: speaker.gender(),
            store: self.broadcast_texts.as_ref(),
        };
        ChatBroadcaster::new(world, self.config.listen_ranges).send_chat(
            speaker,
            &builder,
            &request.audience(kind),
        )
    }

    /// Send literal text that bypasses the catalog. Returns the number of
    /// deliveries.
    pub fn send_literal(
        &self,
        speaker: &dyn Speaker,
        text: &str,
        world: WorldState<'_>,
        request: &ChatRequest,
    ) -> usize {
        let kind = request.kind.unwrap_or(ChatKind::Say);
        let builder = PlainChatBuilder {
            speaker,
            kind,
            language: request.language.unwrap_or(Language::UNIVERSAL),
            text: text.to_string(),
            target: request.whisper_target,
        };
        ChatBroadcaster::new(world, self.config.listen_ranges).send_chat(
            speaker,
            &builder,
            &request.audience(kind),
        )
    }

    /// Play a sound for the audience of `request`. Returns the number of
    /// deliveries.
    pub fn send_sound(
        &self,
        speaker: &dyn Speaker,
        sound: u32,
        world: WorldState<'_>,
        request: &ChatRequest,
    ) -> usize {
        let audience = request.audience(request.kind.unwrap_or(ChatKind::Say));
        let broadcaster = ChatBroadcaster::new(world, self.config.listen_ranges);
        self.play_sound(&broadcaster, speaker, sound, &audience)
    }

    fn play_sound(
        &self,
        broadcaster: &ChatBroadcaster<'_>,
        speaker: &dyn Speaker,
        sound: u32,
        audience: &Audience,
    ) -> usize {
        let mut payload = Vec::with_capacity(4);
        if let Err(e) = payload.write_u32::<LittleEndian>(sound) {
            warn!(sound, error = %e, "failed to build sound payload");
            return 0;
        }
        broadcaster.send_packet(speaker, &payload, audience)
    }

    /// Play the emote of a specific line on the speaker. Returns false if
    /// the line does not exist or has no emote.
    pub fn send_broadcast_emote(
        &self,
        speaker: &dyn Speaker,
        template: u32,
        group: u8,
        id: u8,
    ) -> bool {
        match self.tables.catalog.entry(template, group, id) {
            Some(entry) if entry.emote != 0 => {
                speaker.play_emote(entry.emote);
                true
            }
            _ => false,
        }
    }

    /// Sound of a line: its own, else its broadcast text's, else 0.
    pub fn broadcast_sound(&self, template: u32, group: u8, id: u8) -> u32 {
        let Some(entry) = self.tables.catalog.entry(template, group, id) else {
            return 0;
        };
        if entry.sound != 0 {
            return entry.sound;
        }
        self.broadcast_texts
            .lookup(entry.broadcast_text_id)
            .map(|b| b.sound)
            .unwrap_or(0)
    }

    /// Display text of a line outside the broadcast path.
    pub fn localized_string(
        &self,
        template: u32,
        group: u8,
        id: u8,
        gender: Gender,
        locale: Locale,
    ) -> String {
        self.tables.localized_string(
            template,
            group,
            id,
            gender,
            locale,
            self.broadcast_texts.as_ref(),
        )
    }
}

impl CreatureTextEngineBuilder {
    pub fn texts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.texts_path = Some(path.into());
        self
    }

    pub fn locales_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.locales_path = Some(path.into());
        self
    }

    pub fn broadcast_texts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.broadcast_texts_path = Some(path.into());
        self
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Overrides the seed from the configuration.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Provide tables directly (for testing without files).
    pub fn with_tables(mut self, tables: TextTables) -> Self {
        self.tables = Some(tables);
        self
    }

    /// Provide the broadcast text catalog directly.
    pub fn with_broadcast_texts(mut self, store: SharedBroadcastTexts) -> Self {
        self.broadcast_texts = Some(store);
        self
    }

    /// Provide configuration directly.
    pub fn with_config(mut self, config: TextConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load configuration, broadcast texts, then creature texts and their
    /// locales, in that order.
    pub fn build(self) -> Result<CreatureTextEngine, LoadError> {
        let mut config = match (self.config, self.config_path.as_deref()) {
            (Some(config), _) => config,
            (None, Some(path)) => TextConfig::load_from_ron(path)?,
            (None, None) => TextConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        let broadcast_texts: SharedBroadcastTexts = match (self.broadcast_texts, self.broadcast_texts_path) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(index_broadcast_texts(load_broadcast_texts(&path)?)),
            (None, None) => Arc::new(FxHashMap::<u32, BroadcastText>::default()),
        };

        let tables = match (self.tables, self.texts_path) {
            (Some(tables), _) => tables,
            (None, Some(path)) => {
                let mut source = RonTextSource::new(path);
                if let Some(locales) = self.locales_path {
                    source = source.with_locales(locales);
                }
                TextTables::load(&mut source, broadcast_texts.as_ref())?
            }
            (None, None) => TextTables::default(),
        };

        info!(
            entries = tables.catalog.len(),
            groups = tables.catalog.group_count(),
            locales = tables.locales.len(),
            seed = config.seed,
            "creature text engine ready"
        );

        Ok(CreatureTextEngine {
            tables: Arc::new(tables),
            broadcast_texts,
            repeats: RepeatTracker::new(config.repeat_window, config.max_tracked_speakers),
            rng: StdRng::seed_from_u64(config.seed),
            config,
        })
    }
}

/// Convenience for tools: an engine over RON files in one directory
/// (`texts.ron`, optional `locales.ron`, `broadcast_texts.ron`, `config.ron`).
pub fn engine_from_dir(dir: &Path) -> Result<CreatureTextEngine, LoadError> {
    let mut builder = CreatureTextEngine::builder().texts_path(dir.join("texts.ron"));
    let locales = dir.join("locales.ron");
    if locales.exists() {
        builder = builder.locales_path(locales);
    }
    let broadcast_texts = dir.join("broadcast_texts.ron");
    if broadcast_texts.exists() {
        builder = builder.broadcast_texts_path(broadcast_texts);
    }
    let config = dir.join("config.ron");
    if config.exists() {
        builder = builder.config_file(config);
    }
    builder.build()
}
