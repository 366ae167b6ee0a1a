//! The published, read-only text tables: catalog plus locale overlay.

use crate::core::catalog::TextCatalog;
use crate::core::loader::{LoadError, TextSource};
use crate::core::locale::LocaleOverlay;
use crate::schema::broadcast_text::BroadcastTextStore;
use crate::schema::chat::Locale;
use crate::schema::entity::Gender;
use crate::schema::text::TextKey;

/// Catalog and overlay, built together and never mutated once published.
///
/// A reload builds a fresh `TextTables` and swaps it in whole.
#[derive(Debug, Clone, Default)]
pub struct TextTables {
    pub catalog: TextCatalog,
    pub locales: LocaleOverlay,
}

impl TextTables {
    pub fn new(catalog: TextCatalog, locales: LocaleOverlay) -> Self {
        Self { catalog, locales }
    }

    /// Load the catalog, then the overlay against it.
    ///
    /// Broadcast references are linked and validated against `store` before
    /// the tables are returned.
    pub fn load(
        source: &mut dyn TextSource,
        store: &dyn BroadcastTextStore,
    ) -> Result<TextTables, LoadError> {
        let mut text_rows = Vec::new();
        source.for_each_text_row(&mut |row| text_rows.push(row))?;
        let mut catalog = TextCatalog::from_rows(text_rows);
        catalog.validate_broadcast_ids(store);
        catalog.fill_missing_broadcast_texts(store);

        let mut locale_rows = Vec::new();
        source.for_each_locale_row(&mut |row| locale_rows.push(row))?;
        let locales = LocaleOverlay::from_rows(locale_rows, &catalog);

        Ok(TextTables::new(catalog, locales))
    }

    /// Text of an entry for display in `locale`.
    ///
    /// A linked broadcast text carries its own translations and wins.
    /// Otherwise the locale override applies, then the entry's own text.
    /// Unknown entries resolve to an empty string.
    pub fn localized_string(
        &self,
        template: u32,
        group: u8,
        id: u8,
        gender: Gender,
        locale: Locale,
        store: &dyn BroadcastTextStore,
    ) -> String {
        let Some(entry) = self.catalog.entry(template, group, id) else {
            return String::new();
        };

        if let Some(bct) = store.lookup(entry.broadcast_text_id) {
            return bct.text(locale, gender).to_string();
        }
        self.locales
            .get(&TextKey::new(template, group, id), locale)
            .map(str::to_string)
            .unwrap_or_else(|| entry.text.clone())
    }
}
