//! Per-term resolution pipeline.
//!
//! Order: curated override → protection rules → local candidates → optional
//! external lookup → selection → fallback. Every path ends in exactly one
//! [`TranslationRecord`].

use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::candidates::{local_candidates, CandidateStrategy, SourceTables};
use crate::classify::{classify_type, is_lookup_eligible, protection};
use crate::curated::{GenericTerms, OverrideTable};
use crate::lexicon::Lexicon;
use crate::lookup::TermLookup;
use crate::record::{Candidate, Source, Status, TermType, TranslationRecord};
use crate::scorer::{determine_status, select_best};
use crate::settings::settings;
use crate::text::{append_note, is_probably_english, normalize_key};

pub const DECS_NOTE: &str = "translated via DeCS";
pub const FALLBACK_NOTE: &str = "Sem tradução automática disponível";
pub const MOSTLY_ENGLISH_NOTE: &str = "mostly_english_demoted";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Never consult the external lookup.
    pub no_external: bool,
    /// Consult the external lookup even when a local candidate is already `ok`.
    pub force_external: bool,
}

pub struct Engine {
    lexicon: Arc<Lexicon>,
    overrides: OverrideTable,
    generic: GenericTerms,
    lookup: Option<Arc<dyn TermLookup>>,
    options: EngineOptions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine over the embedded lexicon, without overrides or external lookup.
    pub fn new() -> Self {
        Self {
            lexicon: Arc::new(Lexicon::builtin().clone()),
            overrides: OverrideTable::default(),
            generic: GenericTerms::default(),
            lookup: None,
            options: EngineOptions::default(),
        }
    }

    pub fn with_lexicon(mut self, lexicon: impl Into<Arc<Lexicon>>) -> Self {
        self.lexicon = lexicon.into();
        self
    }

    pub fn with_overrides(mut self, overrides: OverrideTable) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_generic_terms(mut self, generic: GenericTerms) -> Self {
        self.generic = generic;
        self
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn TermLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn generic_terms(&self) -> &GenericTerms {
        &self.generic
    }

    fn tables(&self) -> SourceTables<'_> {
        SourceTables {
            lexicon: &self.lexicon,
            overrides: &self.overrides,
        }
    }

    /// Resolve one term.
    pub fn translate(&self, term: &str, id: u64) -> TranslationRecord {
        let _span = debug_span!("translate", id, term).entered();
        let record = self.resolve(term, id);
        debug!(status = %record.status, term_pt = %record.term_pt, "resolved");
        enforce_not_english(record)
    }

    fn resolve(&self, term: &str, id: u64) -> TranslationRecord {
        let base = RecordBase {
            id,
            term,
            type_guess: classify_type(term),
        };

        if let Some(cand) = CandidateStrategy::Override.propose(self.tables(), term) {
            let status = determine_status(cand.confidence, term, &cand.term_pt);
            return base.finish(cand, status);
        }

        if let Some(p) = protection(term) {
            let cand = Candidate::new(term, Source::Rule, p.confidence()).with_notes(p.note());
            return RecordBase {
                type_guess: p.term_type(),
                ..base
            }
            .finish(cand, Status::KeepEn);
        }

        let mut candidates = local_candidates(self.tables(), term);
        let best_local = select_best(term, &candidates, &self.generic);

        if let Some(lookup) = self.external_for(term, best_local.as_ref().map(|b| b.status)) {
            if let Some(pt) = lookup.search_term(term) {
                candidates.push(
                    Candidate::new(pt, Source::DecsApi, settings().confidence.decs)
                        .with_notes(DECS_NOTE),
                );
            }
        }

        match select_best(term, &candidates, &self.generic) {
            Some(best) => base.finish(best.candidate, best.status),
            None => base.finish(
                Candidate::new(term, Source::None, 0.0).with_notes(FALLBACK_NOTE),
                Status::NeedsReview,
            ),
        }
    }

    /// The lookup to consult for `term`, if any.
    fn external_for(&self, term: &str, best_local: Option<Status>) -> Option<&dyn TermLookup> {
        if self.options.no_external || !is_lookup_eligible(term) || self.generic.contains(term) {
            return None;
        }
        if !self.options.force_external && best_local == Some(Status::Ok) {
            return None;
        }
        self.lookup.as_deref()
    }
}

struct RecordBase<'a> {
    id: u64,
    term: &'a str,
    type_guess: TermType,
}

impl RecordBase<'_> {
    fn finish(self, cand: Candidate, status: Status) -> TranslationRecord {
        TranslationRecord {
            id: self.id,
            term_en: self.term.to_string(),
            term_en_norm: normalize_key(self.term),
            term_pt: cand.term_pt,
            status,
            type_guess: self.type_guess,
            notes: cand.notes,
            sources: vec![cand.source],
            confidence: cand.confidence,
        }
    }
}

/// An `ok` whose output still reads as English is demoted.
fn enforce_not_english(mut record: TranslationRecord) -> TranslationRecord {
    if record.status == Status::Ok && is_probably_english(&record.term_pt) {
        record.status = Status::NeedsReview;
        record.notes = append_note(&record.notes, MOSTLY_ENGLISH_NOTE);
    }
    record
}
