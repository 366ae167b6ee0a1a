use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::chat::{Language, Locale};
use super::entity::Gender;

/// A precomputed line from the shared broadcast text catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BroadcastText {
    pub id: u32,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub male_text: BTreeMap<Locale, String>,
    #[serde(default)]
    pub female_text: BTreeMap<Locale, String>,
    #[serde(default)]
    pub emote: u32,
    #[serde(default)]
    pub sound: u32,
}

impl BroadcastText {
    /// Text for a locale and speaker gender.
    ///
    /// Female speakers get the female variant when it has default-locale
    /// text. A locale without a translation falls back to the default locale.
    pub fn text(&self, locale: Locale, gender: Gender) -> &str {
        let variants = if gender == Gender::Female && has_default_text(&self.female_text) {
            &self.female_text
        } else {
            &self.male_text
        };
        variants
            .get(&locale)
            .filter(|s| !s.is_empty())
            .or_else(|| variants.get(&Locale::DEFAULT))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Returns true if `text` matches either default-locale variant.
    pub fn matches_default_text(&self, text: &str) -> bool {
        self.male_text.get(&Locale::DEFAULT).map(String::as_str) == Some(text)
            || self.female_text.get(&Locale::DEFAULT).map(String::as_str) == Some(text)
    }
}

fn has_default_text(variants: &BTreeMap<Locale, String>) -> bool {
    variants.get(&Locale::DEFAULT).is_some_and(|s| !s.is_empty())
}

/// Read access to the broadcast text catalog owned by the host.
pub trait BroadcastTextStore {
    fn lookup(&self, id: u32) -> Option<&BroadcastText>;

    /// Every record, in no particular order.
    fn records(&self) -> Box<dyn Iterator<Item = &BroadcastText> + '_>;
}

impl BroadcastTextStore for FxHashMap<u32, BroadcastText> {
    fn lookup(&self, id: u32) -> Option<&BroadcastText> {
        self.get(&id)
    }

    fn records(&self) -> Box<dyn Iterator<Item = &BroadcastText> + '_> {
        Box::new(self.values())
    }
}

/// Index a list of records by id.
pub fn index_broadcast_texts(texts: Vec<BroadcastText>) -> FxHashMap<u32, BroadcastText> {
    texts.into_iter().map(|t| (t.id, t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_text() -> BroadcastText {
        BroadcastText {
            id: 7,
            language: Language(7),
            male_text: BTreeMap::from([
                (Locale::EnUs, "You dare?".to_string()),
                (Locale::DeDe, "Ihr wagt es?".to_string()),
                (Locale::FrFr, String::new()),
            ]),
            female_text: BTreeMap::from([(Locale::EnUs, "You dare, girl?".to_string())]),
            emote: 0,
            sound: 1234,
        }
    }

    #[test]
    fn male_locale_text() {
        let text = make_text();
        assert_eq!(text.text(Locale::DeDe, Gender::Male), "Ihr wagt es?");
    }

    #[test]
    fn empty_locale_falls_back_to_default() {
        let text = make_text();
        assert_eq!(text.text(Locale::FrFr, Gender::Male), "You dare?");
        assert_eq!(text.text(Locale::RuRu, Gender::Male), "You dare?");
    }

    #[test]
    fn female_variant_preferred_when_present() {
        let text = make_text();
        assert_eq!(text.text(Locale::EnUs, Gender::Female), "You dare, girl?");
        // Female variants have no German text, so the default female line is used
        assert_eq!(text.text(Locale::DeDe, Gender::Female), "You dare, girl?");
    }

    #[test]
    fn genderless_speaker_gets_male_text() {
        let text = make_text();
        assert_eq!(text.text(Locale::EnUs, Gender::None), "You dare?");
        assert_eq!(text.text(Locale::DeDe, Gender::None), "Ihr wagt es?");
    }

    #[test]
    fn female_without_variants_uses_male() {
        let mut text = make_text();
        text.female_text.clear();
        assert_eq!(text.text(Locale::EnUs, Gender::Female), "You dare?");
    }

    #[test]
    fn female_translation_without_default_uses_male() {
        let text = BroadcastText {
            id: 3,
            male_text: BTreeMap::from([(Locale::EnUs, "Halt".to_string())]),
            female_text: BTreeMap::from([(Locale::DeDe, "Halt, Schwester".to_string())]),
            ..Default::default()
        };
        assert_eq!(text.text(Locale::EnUs, Gender::Female), "Halt");
        assert_eq!(text.text(Locale::FrFr, Gender::Female), "Halt");
    }

    #[test]
    fn store_lookup() {
        let store = index_broadcast_texts(vec![make_text()]);
        assert!(store.lookup(7).is_some());
        assert!(store.lookup(8).is_none());
        assert_eq!(store.records().count(), 1);
        assert!(store.lookup(7).unwrap().matches_default_text("You dare?"));
    }
}
