//! Audience resolution and per-locale cached delivery.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::core::config::ListenRanges;
use crate::core::message::{MessageBuilder, RenderedMessage};
use crate::core::world::{Recipient, Speaker, WorldState};
use crate::schema::chat::{ChatKind, Locale, TextRange};
use crate::schema::entity::{Guid, Team};

/// Who a message is meant for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Audience {
    pub kind: ChatKind,
    /// Whisper target, or the identifier written into the target field.
    pub target: Guid,
    pub range: TextRange,
    /// `None` accepts every team.
    pub team: Option<Team>,
    pub gm_only: bool,
}

impl Audience {
    pub fn new(kind: ChatKind, range: TextRange) -> Self {
        Self {
            kind,
            target: Guid::EMPTY,
            range,
            team: None,
            gm_only: false,
        }
    }

    /// Whisper kinds on the normal range go to the target alone.
    fn is_direct_whisper(&self) -> bool {
        self.kind.is_whisper() && self.range == TextRange::Normal
    }

    fn accepts(&self, recipient: &dyn Recipient) -> bool {
        recipient.is_connected()
            && self.team.map_or(true, |team| recipient.team() == team)
            && (!self.gm_only || recipient.is_game_master())
    }
}

/// Renderings of one message, built lazily per recipient locale.
///
/// Lives for a single broadcast.
pub struct LocaleCache<'b> {
    builder: &'b dyn MessageBuilder,
    kind: ChatKind,
    rendered: FxHashMap<Locale, Option<RenderedMessage>>,
    delivered: usize,
}

impl<'b> LocaleCache<'b> {
    pub fn new(builder: &'b dyn MessageBuilder, kind: ChatKind) -> Self {
        Self {
            builder,
            kind,
            rendered: FxHashMap::default(),
            delivered: 0,
        }
    }

    /// Deliver the message in the recipient's locale.
    pub fn deliver(&mut self, recipient: &dyn Recipient) {
        let locale = recipient.locale();
        let builder = self.builder;
        let cached = self.rendered.entry(locale).or_insert_with(|| {
            match builder.render(locale) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!(locale = locale.code(), error = %e, "failed to render creature text");
                    None
                }
            }
        });
        let Some(message) = cached else {
            return;
        };

        if self.kind.is_whisper() {
            recipient.deliver(&message.patched_for(recipient.guid()));
        } else {
            recipient.deliver(&message.bytes);
        }
        self.delivered += 1;
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Distinct locales rendered so far.
    pub fn rendered_locales(&self) -> usize {
        self.rendered.len()
    }
}

/// Resolves audiences and drives delivery for one world view.
pub struct ChatBroadcaster<'a> {
    world: WorldState<'a>,
    ranges: ListenRanges,
}

impl<'a> ChatBroadcaster<'a> {
    pub fn new(world: WorldState<'a>, ranges: ListenRanges) -> Self {
        Self { world, ranges }
    }

    /// Send a localized chat message. Returns the number of deliveries.
    pub fn send_chat(
        &self,
        speaker: &dyn Speaker,
        builder: &dyn MessageBuilder,
        audience: &Audience,
    ) -> usize {
        let mut cache = LocaleCache::new(builder, audience.kind);
        self.for_each_recipient(speaker, audience, &mut |r| cache.deliver(r));
        debug!(
            speaker = %speaker.guid(),
            delivered = cache.delivered(),
            locales = cache.rendered_locales(),
            "sent creature chat"
        );
        cache.delivered()
    }

    /// Send a payload that does not vary by locale, such as a sound.
    pub fn send_packet(&self, speaker: &dyn Speaker, bytes: &[u8], audience: &Audience) -> usize {
        let mut delivered = 0;
        self.for_each_recipient(speaker, audience, &mut |r| {
            r.deliver(bytes);
            delivered += 1;
        });
        delivered
    }

    /// Visit every recipient the audience resolves to.
    pub fn for_each_recipient(
        &self,
        speaker: &dyn Speaker,
        audience: &Audience,
        visitor: &mut dyn FnMut(&dyn Recipient),
    ) {
        // Direct whispers ignore team and gm filters
        if audience.is_direct_whisper() {
            match self.world.sessions.find_connected(audience.target) {
                Some(player) if player.is_connected() => visitor(player),
                _ => debug!(whisper_target = %audience.target, "whisper target not connected"),
            }
            return;
        }

        let mut filtered = |r: &dyn Recipient| {
            if audience.accepts(r) {
                visitor(r);
            }
        };

        match audience.range {
            TextRange::Area => {
                let area = speaker.area_id();
                self.world.sessions.for_each_on_map(speaker.map_id(), &mut |r| {
                    if r.area_id() == area {
                        filtered(r);
                    }
                });
            }
            TextRange::Zone => {
                let zone = speaker.zone_id();
                self.world.sessions.for_each_on_map(speaker.map_id(), &mut |r| {
                    if r.zone_id() == zone {
                        filtered(r);
                    }
                });
            }
            TextRange::Map => {
                self.world
                    .sessions
                    .for_each_on_map(speaker.map_id(), &mut filtered);
            }
            TextRange::World => {
                self.world.sessions.for_each_connected(&mut filtered);
            }
            TextRange::Normal => {
                let radius = self.ranges.for_kind(audience.kind);
                self.world.spatial.visit_within_radius(
                    speaker.map_id(),
                    speaker.position(),
                    radius,
                    &mut filtered,
                );
            }
        }
    }
}
