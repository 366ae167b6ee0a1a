//! Host-side views the broadcaster consumes: speakers, recipients, the
//! session directory and the spatial index.

use crate::schema::chat::Locale;
use crate::schema::entity::{Gender, Guid, Position, Team};

/// A creature (or other world object) that speaks.
pub trait Speaker {
    fn guid(&self) -> Guid;
    /// Template id shared by every instance of this creature type.
    fn template_id(&self) -> u32;
    /// Display name in the given locale.
    fn name(&self, locale: Locale) -> String;
    fn gender(&self) -> Gender;
    fn position(&self) -> Position;
    fn map_id(&self) -> u32;
    fn zone_id(&self) -> u32;
    fn area_id(&self) -> u32;
    /// Play an emote animation on the speaker.
    fn play_emote(&self, emote: u32);
}

/// A connected player that can receive messages.
pub trait Recipient {
    fn guid(&self) -> Guid;
    fn locale(&self) -> Locale;
    fn team(&self) -> Team;
    fn map_id(&self) -> u32;
    fn zone_id(&self) -> u32;
    fn area_id(&self) -> u32;
    fn is_game_master(&self) -> bool;
    fn is_connected(&self) -> bool;
    /// Hand a fully built message to the recipient's connection.
    fn deliver(&self, bytes: &[u8]);
}

/// Lookup over connected sessions.
pub trait SessionDirectory {
    fn find_connected(&self, guid: Guid) -> Option<&dyn Recipient>;
    fn for_each_connected(&self, visitor: &mut dyn FnMut(&dyn Recipient));
    /// Players currently on a map.
    fn for_each_on_map(&self, map_id: u32, visitor: &mut dyn FnMut(&dyn Recipient));
}

/// Proximity queries around a point.
pub trait SpatialIndex {
    fn visit_within_radius(
        &self,
        map_id: u32,
        origin: Position,
        radius: f32,
        visitor: &mut dyn FnMut(&dyn Recipient),
    );
}

/// World views passed by the host for one broadcast.
#[derive(Clone, Copy)]
pub struct WorldState<'a> {
    pub sessions: &'a dyn SessionDirectory,
    pub spatial: &'a dyn SpatialIndex,
}
