use serde::{Deserialize, Serialize};

/// The chat channel a creature line is sent on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatKind {
    #[default]
    Say,
    Party,
    Yell,
    Whisper,
    Emote,
    RaidBossEmote,
    RaidBossWhisper,
}

impl ChatKind {
    /// Channel byte written at the start of a chat message.
    pub fn wire_id(&self) -> u8 {
        match self {
            Self::Say => 0x0C,
            Self::Party => 0x0D,
            Self::Yell => 0x0E,
            Self::Whisper => 0x0F,
            Self::Emote => 0x10,
            Self::RaidBossEmote => 0x29,
            Self::RaidBossWhisper => 0x2A,
        }
    }

    pub fn from_wire_id(id: u8) -> Option<Self> {
        match id {
            0x0C => Some(Self::Say),
            0x0D => Some(Self::Party),
            0x0E => Some(Self::Yell),
            0x0F => Some(Self::Whisper),
            0x10 => Some(Self::Emote),
            0x29 => Some(Self::RaidBossEmote),
            0x2A => Some(Self::RaidBossWhisper),
            _ => None,
        }
    }

    /// Whisper kinds address a single target and carry a per-recipient
    /// target identifier.
    pub fn is_whisper(&self) -> bool {
        matches!(self, Self::Whisper | Self::RaidBossWhisper)
    }

    /// Raid boss kinds append an extra trailer to rich messages.
    pub fn is_raid_boss(&self) -> bool {
        matches!(self, Self::RaidBossEmote | Self::RaidBossWhisper)
    }
}

/// Spoken language id. Recipients who do not know the language see
/// garbled text; that is handled client side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language(pub u32);

impl Language {
    pub const UNIVERSAL: Language = Language(0);
}

/// Client display locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "enUS")]
    EnUs,
    #[serde(rename = "koKR")]
    KoKr,
    #[serde(rename = "frFR")]
    FrFr,
    #[serde(rename = "deDE")]
    DeDe,
    #[serde(rename = "zhCN")]
    ZhCn,
    #[serde(rename = "zhTW")]
    ZhTw,
    #[serde(rename = "esES")]
    EsEs,
    #[serde(rename = "esMX")]
    EsMx,
    #[serde(rename = "ruRU")]
    RuRu,
}

impl Locale {
    pub const DEFAULT: Locale = Locale::EnUs;
    pub const COUNT: usize = 9;
    pub const ALL: [Locale; Locale::COUNT] = [
        Locale::EnUs,
        Locale::KoKr,
        Locale::FrFr,
        Locale::DeDe,
        Locale::ZhCn,
        Locale::ZhTw,
        Locale::EsEs,
        Locale::EsMx,
        Locale::RuRu,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Locale> {
        Self::ALL.get(index).copied()
    }

    /// Short locale code, e.g. "deDE".
    pub fn code(&self) -> &'static str {
        match self {
            Self::EnUs => "enUS",
            Self::KoKr => "koKR",
            Self::FrFr => "frFR",
            Self::DeDe => "deDE",
            Self::ZhCn => "zhCN",
            Self::ZhTw => "zhTW",
            Self::EsEs => "esES",
            Self::EsMx => "esMX",
            Self::RuRu => "ruRU",
        }
    }

    pub fn from_code(code: &str) -> Option<Locale> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How far a line carries.
///
/// `Normal` is proximity chat (or a direct whisper for whisper kinds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextRange {
    #[default]
    Normal,
    Area,
    Zone,
    Map,
    World,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_ids_round_trip() {
        for kind in [
            ChatKind::Say,
            ChatKind::Party,
            ChatKind::Yell,
            ChatKind::Whisper,
            ChatKind::Emote,
            ChatKind::RaidBossEmote,
            ChatKind::RaidBossWhisper,
        ] {
            assert_eq!(ChatKind::from_wire_id(kind.wire_id()), Some(kind));
        }
        assert_eq!(ChatKind::from_wire_id(0xFF), None);
    }

    #[test]
    fn rows_without_a_kind_say_their_line() {
        assert_eq!(ChatKind::default(), ChatKind::Say);
    }

    #[test]
    fn whisper_and_raid_boss_classes() {
        assert!(ChatKind::Whisper.is_whisper());
        assert!(ChatKind::RaidBossWhisper.is_whisper());
        assert!(!ChatKind::Yell.is_whisper());
        assert!(ChatKind::RaidBossEmote.is_raid_boss());
        assert!(!ChatKind::Whisper.is_raid_boss());
    }

    #[test]
    fn locale_indices_are_dense() {
        for (i, locale) in Locale::ALL.iter().enumerate() {
            assert_eq!(locale.index(), i);
            assert_eq!(Locale::from_index(i), Some(*locale));
        }
        assert_eq!(Locale::from_index(Locale::COUNT), None);
    }

    #[test]
    fn locale_codes() {
        assert_eq!(Locale::DeDe.code(), "deDE");
        assert_eq!(Locale::from_code("ruRU"), Some(Locale::RuRu));
        assert_eq!(Locale::from_code("xxXX"), None);
    }

    #[test]
    fn locale_ron_names() {
        let locale: Locale = ron::from_str("deDE").unwrap();
        assert_eq!(locale, Locale::DeDe);
    }
}
