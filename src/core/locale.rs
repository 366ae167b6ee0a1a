//! Locale overlay: per-locale overrides for catalog entries.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::core::catalog::TextCatalog;
use crate::schema::chat::Locale;
use crate::schema::text::{LocaleRow, TextKey};

/// Translations of one entry, indexed by `Locale::index()`.
///
/// The default locale slot stays empty: the catalog's base text is the
/// default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleStrings {
    texts: Vec<String>,
}

impl LocaleStrings {
    pub fn get(&self, locale: Locale) -> Option<&str> {
        self.texts
            .get(locale.index())
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    fn set(&mut self, locale: Locale, text: String) {
        let index = locale.index();
        if self.texts.len() <= index {
            self.texts.resize(index + 1, String::new());
        }
        self.texts[index] = text;
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocaleOverlay {
    texts: BTreeMap<TextKey, LocaleStrings>,
}

impl LocaleOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the overlay, dropping rows that point at entries the catalog
    /// does not have.
    pub fn from_rows<I>(rows: I, catalog: &TextCatalog) -> Self
    where
        I: IntoIterator<Item = LocaleRow>,
    {
        let mut overlay = Self::new();
        for row in rows {
            let key = row.key();
            if catalog.entry(key.template, key.group, key.id).is_none() {
                warn!(
                    entry = key.template,
                    group = key.group,
                    id = key.id,
                    "locale row references a missing creature text, skipped"
                );
                continue;
            }
            overlay.insert(key, row.texts);
        }
        debug!(entries = overlay.len(), "loaded creature text locales");
        overlay
    }

    pub fn insert<I>(&mut self, key: TextKey, texts: I)
    where
        I: IntoIterator<Item = (Locale, String)>,
    {
        let strings = self.texts.entry(key).or_default();
        for (locale, text) in texts {
            if locale == Locale::DEFAULT {
                continue;
            }
            strings.set(locale, text);
        }
    }

    /// Override for `key` in `locale`, if one exists and is non-empty.
    pub fn get(&self, key: &TextKey, locale: Locale) -> Option<&str> {
        if locale == Locale::DEFAULT {
            return None;
        }
        self.texts.get(key)?.get(locale)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}
