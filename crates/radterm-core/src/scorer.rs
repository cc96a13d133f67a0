//! Candidate scoring, status assignment and selection.

use crate::curated::GenericTerms;
use crate::record::{Candidate, Source, Status};
use crate::settings::settings;
use crate::text::{append_note, is_unchanged, word_tokens};

pub const VERBOSE_DEMOTED_NOTE: &str = "DeCS verboso (rebaixado)";

/// Status for a translation at the given confidence.
///
/// An output equal to its input (ignoring case) is `NeedsReview` no matter
/// how confident the source is.
pub fn determine_status(confidence: f64, term_en: &str, term_pt: &str) -> Status {
    if is_unchanged(term_en, term_pt) {
        return Status::NeedsReview;
    }
    let t = &settings().thresholds;
    if confidence >= t.ok {
        Status::Ok
    } else if confidence >= t.ambiguous {
        Status::Ambiguous
    } else {
        Status::NeedsReview
    }
}

/// A generic term resolved to a long descriptor (four or more words, or at
/// least `max(12, 2·len(term))` characters).
pub fn is_verbose_generic(term_en: &str, term_pt: &str, generic: &GenericTerms) -> bool {
    if !generic.contains(term_en) {
        return false;
    }
    if word_tokens(&term_pt.to_lowercase()).len() >= 4 {
        return true;
    }
    let en_len = term_en.chars().count();
    term_pt.chars().count() >= 12.max(en_len * 2)
}

/// A candidate after demotion, with its status and ranking score.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub candidate: Candidate,
    pub status: Status,
    pub score: f64,
    /// Output differs from input.
    pub changed: bool,
}

pub fn score_candidate(term_en: &str, candidate: &Candidate, generic: &GenericTerms) -> Scored {
    let s = settings();
    let mut candidate = candidate.clone();
    if candidate.source == Source::DecsApi && is_verbose_generic(term_en, &candidate.term_pt, generic)
    {
        candidate.confidence = candidate.confidence.min(s.confidence.verbose_generic_cap);
        candidate.notes = append_note(&candidate.notes, VERBOSE_DEMOTED_NOTE);
    }

    let status = determine_status(candidate.confidence, term_en, &candidate.term_pt);
    let changed = !is_unchanged(term_en, &candidate.term_pt);
    let mut score = candidate.confidence
        * s.source_weights.weight(candidate.source)
        * s.status_weights.weight(status);
    if !changed {
        score -= s.scoring.noop_penalty;
    }
    Scored {
        candidate,
        status,
        score,
        changed,
    }
}

/// Whether `challenger` should replace the current `best`.
fn beats(challenger: &Scored, best: &Scored) -> bool {
    if challenger.changed != best.changed {
        return challenger.changed;
    }
    if challenger.score != best.score {
        return challenger.score > best.score;
    }
    challenger.candidate.source.priority() < best.candidate.source.priority()
}

/// Best candidate: changed over no-op, then strictly higher score, then
/// source priority, then generation order.
pub fn select_best(term_en: &str, candidates: &[Candidate], generic: &GenericTerms) -> Option<Scored> {
    let mut best: Option<Scored> = None;
    for cand in candidates {
        let scored = score_candidate(term_en, cand, generic);
        match &best {
            Some(b) if !beats(&scored, b) => {}
            _ => best = Some(scored),
        }
    }
    best
}
