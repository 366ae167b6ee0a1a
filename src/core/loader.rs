//! Row sources the text tables are populated from.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::schema::broadcast_text::BroadcastText;
use crate::schema::text::{LocaleRow, TextRow};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RON deserialization error in {path}: {source}")]
    Ron {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Storage the text tables are loaded from.
///
/// Called once at startup and again on reload.
pub trait TextSource {
    fn for_each_text_row(&mut self, callback: &mut dyn FnMut(TextRow)) -> Result<(), LoadError>;
    fn for_each_locale_row(&mut self, callback: &mut dyn FnMut(LocaleRow))
        -> Result<(), LoadError>;
}

/// Rows read from RON files: a list of `TextRow` and, optionally, a list
/// of `LocaleRow`.
#[derive(Debug, Clone)]
pub struct RonTextSource {
    texts_path: PathBuf,
    locales_path: Option<PathBuf>,
}

impl RonTextSource {
    pub fn new(texts_path: impl Into<PathBuf>) -> Self {
        Self {
            texts_path: texts_path.into(),
            locales_path: None,
        }
    }

    pub fn with_locales(mut self, path: impl Into<PathBuf>) -> Self {
        self.locales_path = Some(path.into());
        self
    }
}

impl TextSource for RonTextSource {
    fn for_each_text_row(&mut self, callback: &mut dyn FnMut(TextRow)) -> Result<(), LoadError> {
        let rows: Vec<TextRow> = read_ron(&self.texts_path)?;
        rows.into_iter().for_each(callback);
        Ok(())
    }

    fn for_each_locale_row(
        &mut self,
        callback: &mut dyn FnMut(LocaleRow),
    ) -> Result<(), LoadError> {
        if let Some(ref path) = self.locales_path {
            let rows: Vec<LocaleRow> = read_ron(path)?;
            rows.into_iter().for_each(callback);
        }
        Ok(())
    }
}

/// Rows already in memory (tests, tools, hosts with their own storage).
#[derive(Debug, Clone, Default)]
pub struct RowTextSource {
    texts: Vec<TextRow>,
    locales: Vec<LocaleRow>,
}

impl RowTextSource {
    pub fn new(texts: Vec<TextRow>, locales: Vec<LocaleRow>) -> Self {
        Self { texts, locales }
    }
}

impl TextSource for RowTextSource {
    fn for_each_text_row(&mut self, callback: &mut dyn FnMut(TextRow)) -> Result<(), LoadError> {
        self.texts.iter().cloned().for_each(callback);
        Ok(())
    }

    fn for_each_locale_row(
        &mut self,
        callback: &mut dyn FnMut(LocaleRow),
    ) -> Result<(), LoadError> {
        self.locales.iter().cloned().for_each(callback);
        Ok(())
    }
}

/// Load broadcast text records from a RON list.
pub fn load_broadcast_texts(path: &Path) -> Result<Vec<BroadcastText>, LoadError> {
    read_ron(path)
}

pub(crate) fn read_ron<T>(path: &Path) -> Result<T, LoadError>
where
    T: serde::de::DeserializeOwned,
{
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| LoadError::Ron {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_fixture_texts() {
        let mut source = RonTextSource::new("tests/fixtures/test_texts.ron")
            .with_locales("tests/fixtures/test_locales.ron");
        let mut texts = 0;
        source.for_each_text_row(&mut |_| texts += 1).unwrap();
        let mut locales = 0;
        source.for_each_locale_row(&mut |_| locales += 1).unwrap();
        assert!(texts > 0);
        assert!(locales > 0);
    }

    #[test]
    fn missing_file_reports_path() {
        let mut source = RonTextSource::new("tests/fixtures/does_not_exist.ron");
        let err = source.for_each_text_row(&mut |_| {}).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("does_not_exist.ron"));
    }

    #[test]
    fn locales_optional() {
        let mut source = RonTextSource::new("tests/fixtures/test_texts.ron");
        let mut locales = 0;
        source.for_each_locale_row(&mut |_| locales += 1).unwrap();
        assert_eq!(locales, 0);
    }

    #[test]
    fn load_fixture_broadcast_texts() {
        let texts =
            load_broadcast_texts(Path::new("tests/fixtures/test_broadcast_texts.ron")).unwrap();
        assert!(!texts.is_empty());
    }
}
