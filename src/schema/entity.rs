use serde::{Deserialize, Serialize};
use std::fmt;

/// Object identity shared by creatures and players.
///
/// The top 16 bits carry the object's high type; players use a zero high
/// part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Guid(pub u64);

impl Guid {
    pub const EMPTY: Guid = Guid(0);

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// High type part of the identity.
    pub fn high(&self) -> u16 {
        (self.0 >> 48) as u16
    }

    /// Returns true if this identity belongs to a player character.
    pub fn is_player(&self) -> bool {
        !self.is_empty() && self.high() == 0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

/// World coordinates of a speaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Grammatical gender used to pick between male and female text variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
    None,
}

/// Player faction. Audience filters take `Option<Team>`, where `None`
/// accepts every team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Alliance,
    Horde,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_guid_has_zero_high_part() {
        assert!(Guid(42).is_player());
        assert!(!Guid(0xF130_0000_0000_002A).is_player());
        assert!(!Guid::EMPTY.is_player());
    }

    #[test]
    fn high_part() {
        assert_eq!(Guid(0xF130_0000_0000_0001).high(), 0xF130);
        assert_eq!(Guid(7).high(), 0);
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Guid(255).to_string(), "0x00000000000000FF");
    }

    #[test]
    fn distance_between_positions() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn male_is_the_default_gender() {
        assert_eq!(Gender::default(), Gender::Male);
    }
}
