use radterm_core::{Domain, Status};
use serde::Serialize;

use radterm_core::text::append_note;

/// Report action for a token passed through unresolved.
pub const KEPT_EN_NEEDS_REVIEW: &str = "kept_en_needs_review";

/// Outcome of one gate lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult {
    pub term_en: String,
    pub term_out: String,
    pub status: Status,
    pub source: String,
    pub notes: String,
    pub domain: Domain,
    pub confidence: f64,
}

impl LookupResult {
    /// Revert to the input and flag for review.
    pub(crate) fn demote(&mut self, note: &str) {
        self.status = Status::NeedsReview;
        self.notes = append_note(&self.notes, note);
        self.term_out = self.term_en.clone();
    }
}

/// Per-token line of a rewrite report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenReport {
    pub term_en: String,
    pub term_out: String,
    pub status: Status,
    pub domain: Domain,
    pub source: String,
    pub notes: String,
    /// The status tag, or [`KEPT_EN_NEEDS_REVIEW`].
    pub action: String,
}

impl From<&LookupResult> for TokenReport {
    fn from(res: &LookupResult) -> Self {
        let action = if res.status == Status::NeedsReview {
            KEPT_EN_NEEDS_REVIEW.to_string()
        } else {
            res.status.as_str().to_string()
        };
        Self {
            term_en: res.term_en.clone(),
            term_out: res.term_out.clone(),
            status: res.status,
            domain: res.domain,
            source: res.source.clone(),
            notes: res.notes.clone(),
            action,
        }
    }
}
