//! Closed English → Portuguese term table used by the dictionary strategies.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_LEXICON_TOML: &str = include_str!("default_lexicon.toml");

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("lexicon has no entries")]
    Empty,
    #[error("empty translation for key: {0}")]
    EmptyValue(String),
}

/// Every top-level table is a category of `term = "tradução"` pairs.
#[derive(Deserialize)]
#[serde(transparent)]
struct LexiconFile(BTreeMap<String, BTreeMap<String, String>>);

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, String>,
}

impl Lexicon {
    /// Build from raw pairs. Keys are trimmed and lowercased; a later pair
    /// replaces an earlier one with the same key.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.into()))
            .collect();
        Self { entries }
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile =
            toml::from_str(toml_str).map_err(|e| LexiconError::Parse(e.to_string()))?;

        let mut pairs = Vec::new();
        for table in file.0.into_values() {
            for (key, value) in table {
                if value.trim().is_empty() {
                    return Err(LexiconError::EmptyValue(key));
                }
                pairs.push((key, value));
            }
        }
        if pairs.is_empty() {
            return Err(LexiconError::Empty);
        }
        Ok(Self::from_pairs(pairs))
    }

    /// Embedded default table (anatomy, radiology, procedures, pathology).
    pub fn builtin() -> &'static Lexicon {
        static INSTANCE: OnceLock<Lexicon> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            Lexicon::from_toml_str(DEFAULT_LEXICON_TOML).expect("embedded lexicon must be valid")
        })
    }

    /// Exact lookup on the trimmed, lowercased term.
    pub fn get(&self, term: &str) -> Option<&str> {
        self.entries
            .get(&term.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.get(term).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
