//! Resolved dictionary and alternatives tables, loaded once per session.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;

use radterm_core::curated::{column_indices, first_field};
use radterm_core::text::normalize_key;
use radterm_core::{DictionaryEntry, Domain, Status};
use tracing::{debug, debug_span, warn};

use crate::variants::candidate_keys;
use crate::GateError;

const DEFAULT_SOURCE: &str = "Normalized";
const ALT_COLUMNS: &[&str] = &["alt_en", "alternative_en", "alt"];

/// Entries keyed by the normalized English term.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: HashMap<String, DictionaryEntry>,
}

impl Dictionary {
    /// Later entries for the same key replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = DictionaryEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|e| !e.term_en.trim().is_empty())
            .map(|e| (normalize_key(&e.term_en), e))
            .collect();
        Self { entries }
    }

    /// Read the `term_en,term_pt,status,domain,source,confidence,notes` CSV.
    ///
    /// Rows without `term_en` or that fail to parse are skipped; unknown
    /// statuses read as `needs_review`.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        let _span = debug_span!("Dictionary::load", path = %path.display()).entered();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(GateError::DictionaryNotFound(path.to_path_buf()))
            }
            Err(source) => {
                return Err(GateError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let csv_err = |source| GateError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = rdr.headers().map_err(csv_err)?.clone();
        let col = |name: &str| column_indices(&headers, &[name]);
        let (en, pt, status, domain, source, confidence, notes) = (
            col("term_en"),
            col("term_pt"),
            col("status"),
            col("domain"),
            col("source"),
            col("confidence"),
            col("notes"),
        );

        let mut entries = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    warn!(line = line + 2, error = %e, "skipping malformed dictionary row");
                    continue;
                }
            };
            let Some(term_en) = first_field(&record, &en) else {
                continue;
            };
            let status_tag = first_field(&record, &status).unwrap_or_default();
            entries.push(DictionaryEntry {
                term_en: term_en.to_string(),
                term_pt: first_field(&record, &pt).unwrap_or_default().to_string(),
                status: Status::parse(status_tag).unwrap_or(Status::NeedsReview),
                domain: Domain::parse(first_field(&record, &domain).unwrap_or_default()),
                source: first_field(&record, &source)
                    .unwrap_or(DEFAULT_SOURCE)
                    .to_string(),
                confidence: first_field(&record, &confidence)
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(0.0),
                notes: first_field(&record, &notes).unwrap_or_default().to_string(),
            });
        }

        let dict = Self::from_entries(entries);
        debug!(entries = dict.len(), "dictionary loaded");
        Ok(dict)
    }

    pub fn get(&self, key: &str) -> Option<&DictionaryEntry> {
        self.entries.get(key)
    }

    /// First entry matched by any normalization variant of `term`.
    pub fn find(&self, term: &str) -> Option<&DictionaryEntry> {
        candidate_keys(term).iter().find_map(|k| self.entries.get(k))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Direct substitutes for terms the dictionary leaves unresolved.
#[derive(Debug, Clone, Default)]
pub struct Alternatives {
    map: HashMap<String, String>,
}

impl Alternatives {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (normalize_key(k.as_ref()), v.as_ref().trim().to_lowercase()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        Self { map }
    }

    /// `term_en` plus one of `alt_en`, `alternative_en` or `alt`. Missing
    /// file ⇒ empty table.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(GateError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = rdr
            .headers()
            .map_err(|source| GateError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .clone();
        let term_col = column_indices(&headers, &["term_en"]);
        let alt_col = column_indices(&headers, ALT_COLUMNS);

        let mut pairs = Vec::new();
        for result in rdr.records() {
            match result {
                Ok(record) => {
                    if let (Some(term), Some(alt)) =
                        (first_field(&record, &term_col), first_field(&record, &alt_col))
                    {
                        pairs.push((term.to_string(), alt.to_string()));
                    }
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping malformed alternative row"),
            }
        }
        Ok(Self::from_pairs(pairs))
    }

    /// Substitute for a normalized key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
