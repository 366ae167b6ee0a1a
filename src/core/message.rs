//! Message builders: render a chat message for one locale.
//!
//! Wire layout (little endian):
//!
//! ```text
//! u8   chat kind
//! u32  language
//! u64  speaker guid
//! u32  0
//! u32  name length + 1, name, NUL
//! u64  target guid                 <- target_offset
//! [u32 1, u8 0]                    target set and not a player
//! u32  text length + 1, text, NUL
//! u8   chat tag
//! [f32 0, u8 0]                    raid boss kinds, rich builders only
//! ```

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use crate::core::tables::TextTables;
use crate::core::world::Speaker;
use crate::schema::broadcast_text::BroadcastTextStore;
use crate::schema::chat::{ChatKind, Language, Locale};
use crate::schema::entity::{Gender, Guid};

/// A rendered message plus the position of its target identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub bytes: Vec<u8>,
    pub target_offset: usize,
}

impl RenderedMessage {
    /// Copy of the message with the target identifier replaced.
    pub fn patched_for(&self, target: Guid) -> Vec<u8> {
        let mut bytes = self.bytes.clone();
        LittleEndian::write_u64(&mut bytes[self.target_offset..self.target_offset + 8], target.0);
        bytes
    }

    pub fn target(&self) -> Guid {
        Guid(LittleEndian::read_u64(
            &self.bytes[self.target_offset..self.target_offset + 8],
        ))
    }
}

/// Renders a complete message for a locale.
///
/// Output must be identical for identical inputs: the broadcaster renders
/// once per locale and reuses the bytes for every recipient sharing it.
pub trait MessageBuilder {
    fn render(&self, locale: Locale) -> io::Result<RenderedMessage>;
}

/// Fields common to every chat message.
struct ChatHeader<'a> {
    kind: ChatKind,
    language: Language,
    speaker: Guid,
    speaker_name: &'a str,
    target: Guid,
}

fn write_chat_message(
    header: &ChatHeader<'_>,
    text: &str,
    raid_boss_trailer: bool,
) -> io::Result<RenderedMessage> {
    let mut data = Vec::with_capacity(64 + header.speaker_name.len() + text.len());
    data.write_u8(header.kind.wire_id())?;
    data.write_u32::<LittleEndian>(header.language.0)?;
    data.write_u64::<LittleEndian>(header.speaker.0)?;
    data.write_u32::<LittleEndian>(0)?;
    write_cstring(&mut data, header.speaker_name)?;

    let target_offset = data.len();
    data.write_u64::<LittleEndian>(header.target.0)?;
    if !header.target.is_empty() && !header.target.is_player() {
        data.write_u32::<LittleEndian>(1)?; // target name length
        data.write_u8(0)?; // target name
    }

    write_cstring(&mut data, text)?;
    data.write_u8(0)?; // chat tag
    if raid_boss_trailer && header.kind.is_raid_boss() {
        data.write_f32::<LittleEndian>(0.0)?;
        data.write_u8(0)?;
    }

    Ok(RenderedMessage {
        bytes: data,
        target_offset,
    })
}

/// Length-prefixed, NUL-terminated string.
fn write_cstring<W: Write>(writer: &mut W, s: &str) -> io::Result<()> {
    writer.write_u32::<LittleEndian>(s.len() as u32 + 1)?;
    writer.write_all(s.as_bytes())?;
    writer.write_u8(0)
}

/// Literal text that is the same in every locale. Only the speaker name is
/// localized.
pub struct PlainChatBuilder<'a> {
    pub speaker: &'a dyn Speaker,
    pub kind: ChatKind,
    pub language: Language,
    pub text: String,
    pub target: Guid,
}

impl MessageBuilder for PlainChatBuilder<'_> {
    fn render(&self, locale: Locale) -> io::Result<RenderedMessage> {
        let name = self.speaker.name(locale);
        let header = ChatHeader {
            kind: self.kind,
            language: self.language,
            speaker: self.speaker.guid(),
            speaker_name: &name,
            target: self.target,
        };
        write_chat_message(&header, &self.text, false)
    }
}

/// A line from the broadcast text catalog.
pub struct BroadcastTextBuilder<'a> {
    pub speaker: &'a dyn Speaker,
    pub kind: ChatKind,
    pub broadcast_text_id: u32,
    pub target: Guid,
    pub gender: Gender,
    pub store: &'a dyn BroadcastTextStore,
}

impl MessageBuilder for BroadcastTextBuilder<'_> {
    fn render(&self, locale: Locale) -> io::Result<RenderedMessage> {
        let name = self.speaker.name(locale);
        let bct = self.store.lookup(self.broadcast_text_id);
        let text = bct.map(|b| b.text(locale, self.gender)).unwrap_or("");
        let header = ChatHeader {
            kind: self.kind,
            language: bct.map(|b| b.language).unwrap_or(Language::UNIVERSAL),
            speaker: self.speaker.guid(),
            speaker_name: &name,
            target: self.target,
        };
        write_chat_message(&header, text, true)
    }
}

/// A catalog entry, with locale overrides applied per recipient locale.
pub struct CreatureTextBuilder<'a> {
    pub speaker: &'a dyn Speaker,
    pub tables: &'a TextTables,
    pub store: &'a dyn BroadcastTextStore,
    pub template: u32,
    pub group: u8,
    pub id: u8,
    pub kind: ChatKind,
    pub language: Language,
    pub target: Guid,
    pub gender: Gender,
}

impl MessageBuilder for CreatureTextBuilder<'_> {
    fn render(&self, locale: Locale) -> io::Result<RenderedMessage> {
        let name = self.speaker.name(locale);
        let text = self.tables.localized_string(
            self.template,
            self.group,
            self.id,
            self.gender,
            locale,
            self.store,
        );
        let header = ChatHeader {
            kind: self.kind,
            language: self.language,
            speaker: self.speaker.guid(),
            speaker_name: &name,
            target: self.target,
        };
        write_chat_message(&header, &text, true)
    }
}
