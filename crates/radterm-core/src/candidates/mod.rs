//! Local candidate generation.
//!
//! Each [`CandidateStrategy`] proposes at most one translation for a term.
//! The override strategy short-circuits the pipeline; the remaining local
//! strategies run in a fixed order and all of their proposals are scored.

use crate::curated::OverrideTable;
use crate::lexicon::Lexicon;
use crate::record::Candidate;

pub mod dictionary;
pub mod strategy;
pub mod suffix;


pub use strategy::CandidateStrategy;
pub use suffix::{SuffixRule, SUFFIX_RULES};

/// Read-only tables the strategies draw from.
#[derive(Clone, Copy)]
pub struct SourceTables<'a> {
    pub lexicon: &'a Lexicon,
    pub overrides: &'a OverrideTable,
}

/// Strategies that run after overrides and protections, in generation order.
pub const LOCAL_STRATEGIES: [CandidateStrategy; 3] = [
    CandidateStrategy::ExactDict,
    CandidateStrategy::PartialDict,
    CandidateStrategy::SuffixRule,
];

/// Every local proposal for `term`, in generation order.
pub fn local_candidates(tables: SourceTables<'_>, term: &str) -> Vec<Candidate> {
    LOCAL_STRATEGIES
        .iter()
        .filter_map(|s| s.propose(tables, term))
        .collect()
}
