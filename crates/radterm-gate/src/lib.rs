//! Runtime vocabulary gate over a resolved EN→PT-BR dictionary.
//!
//! `VocabularyGate` loads the dictionary once and answers per-term lookups
//! through normalization variants. Anything it cannot resolve confidently is
//! passed through in English and recorded in an append-only audit log.

mod audit;
mod dictionary;
mod rewrite;
mod types;
pub mod variants;

#[cfg(test)]
mod tests;

use std::io;
use std::path::{Path, PathBuf};

use radterm_core::engine::MOSTLY_ENGLISH_NOTE;
use radterm_core::text::{append_note, is_probably_english, is_unchanged, normalize_key};
use radterm_core::{Domain, Status};
use tracing::{debug, debug_span};

pub use audit::{AuditEntry, AuditLog};
pub use dictionary::{Alternatives, Dictionary};
pub use types::{LookupResult, TokenReport, KEPT_EN_NEEDS_REVIEW};

pub const NOT_FOUND_SOURCE: &str = "NotFound";
pub const NOT_FOUND_NOTE: &str = "not_in_dictionary";
pub const PT_EQ_EN_NOTE: &str = "pt_eq_en_demoted";

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("dictionary not found: {0}")]
    DictionaryNotFound(PathBuf),
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("audit entry encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Dictionary-backed term guard. Immutable after construction apart from
/// audit appends, so it can be shared across threads.
pub struct VocabularyGate {
    dictionary: Dictionary,
    alternatives: Alternatives,
    audit: AuditLog,
}

impl VocabularyGate {
    /// Load the dictionary CSV. A missing dictionary is fatal since the gate
    /// has no safe default.
    pub fn open(dictionary_path: &Path, audit_path: impl Into<PathBuf>) -> Result<Self, GateError> {
        let dictionary = Dictionary::load(dictionary_path)?;
        Ok(Self::new(dictionary, AuditLog::new(audit_path)))
    }

    pub fn new(dictionary: Dictionary, audit: AuditLog) -> Self {
        Self {
            dictionary,
            alternatives: Alternatives::default(),
            audit,
        }
    }

    pub fn with_alternatives(mut self, alternatives: Alternatives) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Pure lookup: no audit side effect.
    pub fn resolve(&self, term_en: &str) -> LookupResult {
        let _span = debug_span!("resolve", term = term_en).entered();
        let Some(entry) = self.dictionary.find(term_en) else {
            debug!("not in dictionary");
            return LookupResult {
                term_en: term_en.to_string(),
                term_out: term_en.to_string(),
                status: Status::NeedsReview,
                source: NOT_FOUND_SOURCE.to_string(),
                notes: NOT_FOUND_NOTE.to_string(),
                domain: Domain::Other,
                confidence: 0.0,
            };
        };

        let mut res = LookupResult {
            term_en: term_en.to_string(),
            term_out: term_en.to_string(),
            status: entry.status,
            source: entry.source.clone(),
            notes: entry.notes.clone(),
            domain: entry.domain,
            confidence: entry.confidence,
        };
        match entry.status {
            Status::Ok => res.term_out = entry.term_pt.clone(),
            Status::KeepEn => {}
            _ => {
                // Unresolved rows without a usable alternative fall back to
                // the input for review.
                if !self.substitute(&mut res) {
                    res.status = Status::NeedsReview;
                    res.term_out = term_en.to_string();
                }
            }
        }

        // Dictionary rows may be stale; re-check the ok invariants.
        if res.status == Status::Ok && is_unchanged(term_en, &res.term_out) {
            res.demote(PT_EQ_EN_NOTE);
        }
        if res.status == Status::Ok && is_probably_english(&res.term_out) {
            res.demote(MOSTLY_ENGLISH_NOTE);
        }
        res
    }

    /// Swap in the entry of a configured alternative term when that entry is
    /// itself resolved. Returns false when nothing was substituted.
    fn substitute(&self, res: &mut LookupResult) -> bool {
        let Some(alt) = self.alternatives.get(&normalize_key(&res.term_en)) else {
            return false;
        };
        let Some(alt_entry) = self.dictionary.find(alt) else {
            return false;
        };
        res.term_out = match alt_entry.status {
            Status::Ok => alt_entry.term_pt.clone(),
            Status::KeepEn => alt_entry.term_en.clone(),
            _ => return false,
        };
        res.status = alt_entry.status;
        res.notes = append_note(&res.notes, &format!("substitute:{alt}"));
        res.source = alt_entry.source.clone();
        res.domain = alt_entry.domain;
        res.confidence = alt_entry.confidence;
        true
    }

    /// Lookup with the term itself as audit context.
    pub fn lookup(&self, term_en: &str) -> Result<LookupResult, GateError> {
        self.lookup_in_context(term_en, term_en)
    }

    /// Lookup; a `needs_review` outcome is appended to the audit log with
    /// `context` before returning.
    pub fn lookup_in_context(&self, term_en: &str, context: &str) -> Result<LookupResult, GateError> {
        let res = self.resolve(term_en);
        if res.status == Status::NeedsReview {
            self.audit.append(&res, context)?;
        }
        Ok(res)
    }
}
