//! Shared test doubles: a speaking creature, players with inboxes, and a
//! world that serves both the session directory and the spatial index.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use creature_text::core::world::{Recipient, SessionDirectory, SpatialIndex, Speaker, WorldState};
use creature_text::schema::chat::Locale;
use creature_text::schema::entity::{Gender, Guid, Position, Team};

pub struct TestCreature {
    pub guid: Guid,
    pub template: u32,
    pub gender: Gender,
    pub position: Position,
    pub map: u32,
    pub zone: u32,
    pub area: u32,
    pub emotes: RefCell<Vec<u32>>,
}

impl TestCreature {
    pub fn new(template: u32) -> Self {
        Self {
            guid: Guid(0xF130_0000_0000_0000 | template as u64),
            template,
            gender: Gender::Male,
            position: Position::default(),
            map: 0,
            zone: 12,
            area: 87,
            emotes: RefCell::new(Vec::new()),
        }
    }
}

impl Speaker for TestCreature {
    fn guid(&self) -> Guid {
        self.guid
    }
    fn template_id(&self) -> u32 {
        self.template
    }
    fn name(&self, locale: Locale) -> String {
        match locale {
            Locale::DeDe => "Stadtwache".to_string(),
            _ => "City Guard".to_string(),
        }
    }
    fn gender(&self) -> Gender {
        self.gender
    }
    fn position(&self) -> Position {
        self.position
    }
    fn map_id(&self) -> u32 {
        self.map
    }
    fn zone_id(&self) -> u32 {
        self.zone
    }
    fn area_id(&self) -> u32 {
        self.area
    }
    fn play_emote(&self, emote: u32) {
        self.emotes.borrow_mut().push(emote);
    }
}

pub struct TestPlayer {
    pub guid: Guid,
    pub locale: Locale,
    pub team: Team,
    pub position: Position,
    pub map: u32,
    pub zone: u32,
    pub area: u32,
    pub gm: bool,
    pub connected: bool,
    pub inbox: RefCell<Vec<Vec<u8>>>,
}

impl TestPlayer {
    pub fn new(guid: u64, locale: Locale) -> Self {
        Self {
            guid: Guid(guid),
            locale,
            team: Team::Alliance,
            position: Position::new(5.0, 0.0, 0.0),
            map: 0,
            zone: 12,
            area: 87,
            gm: false,
            connected: true,
            inbox: RefCell::new(Vec::new()),
        }
    }

    pub fn received(&self) -> usize {
        self.inbox.borrow().len()
    }

    pub fn last_message(&self) -> Vec<u8> {
        self.inbox.borrow().last().cloned().unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.inbox
            .borrow()
            .iter()
            .any(|m| m.windows(needle.len()).any(|w| w == needle.as_bytes()))
    }
}

impl Recipient for TestPlayer {
    fn guid(&self) -> Guid {
        self.guid
    }
    fn locale(&self) -> Locale {
        self.locale
    }
    fn team(&self) -> Team {
        self.team
    }
    fn map_id(&self) -> u32 {
        self.map
    }
    fn zone_id(&self) -> u32 {
        self.zone
    }
    fn area_id(&self) -> u32 {
        self.area
    }
    fn is_game_master(&self) -> bool {
        self.gm
    }
    fn is_connected(&self) -> bool {
        self.connected
    }
    fn deliver(&self, bytes: &[u8]) {
        self.inbox.borrow_mut().push(bytes.to_vec());
    }
}

#[derive(Default)]
pub struct TestWorld {
    pub players: Vec<TestPlayer>,
    pub radius_queries: Cell<usize>,
}

impl TestWorld {
    pub fn new(players: Vec<TestPlayer>) -> Self {
        Self {
            players,
            radius_queries: Cell::new(0),
        }
    }

    pub fn state(&self) -> WorldState<'_> {
        WorldState {
            sessions: self,
            spatial: self,
        }
    }

    pub fn total_received(&self) -> usize {
        self.players.iter().map(TestPlayer::received).sum()
    }
}

impl SessionDirectory for TestWorld {
    fn find_connected(&self, guid: Guid) -> Option<&dyn Recipient> {
        self.players
            .iter()
            .find(|p| p.guid == guid && p.connected)
            .map(|p| p as &dyn Recipient)
    }

    fn for_each_connected(&self, visitor: &mut dyn FnMut(&dyn Recipient)) {
        for p in self.players.iter().filter(|p| p.connected) {
            visitor(p as &dyn Recipient);
        }
    }

    fn for_each_on_map(&self, map_id: u32, visitor: &mut dyn FnMut(&dyn Recipient)) {
        for p in self.players.iter().filter(|p| p.map == map_id) {
            visitor(p as &dyn Recipient);
        }
    }
}

impl SpatialIndex for TestWorld {
    fn visit_within_radius(
        &self,
        map_id: u32,
        origin: Position,
        radius: f32,
        visitor: &mut dyn FnMut(&dyn Recipient),
    ) {
        self.radius_queries.set(self.radius_queries.get() + 1);
        for p in self
            .players
            .iter()
            .filter(|p| p.map == map_id && p.position.distance(&origin) <= radius)
        {
            visitor(p as &dyn Recipient);
        }
    }
}
