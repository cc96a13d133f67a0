use crate::record::{Candidate, Source};
use crate::settings::settings;

use super::{dictionary, suffix, SourceTables};

/// Candidate source selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateStrategy {
    /// Curated override table; wins over everything including protections.
    Override,
    /// Case-insensitive exact lexicon match.
    ExactDict,
    /// Token-by-token lexicon match for multi-word terms.
    PartialDict,
    /// Latin/Greek suffix morphology.
    SuffixRule,
}

impl CandidateStrategy {
    pub fn source(self) -> Source {
        match self {
            Self::Override => Source::Override,
            Self::ExactDict => Source::Dict,
            Self::PartialDict => Source::DictPartial,
            Self::SuffixRule => Source::RuleSuffix,
        }
    }

    /// Propose a translation, or `None` when this source has nothing that
    /// actually changes the term.
    pub fn propose(self, tables: SourceTables<'_>, term: &str) -> Option<Candidate> {
        match self {
            Self::Override => override_candidate(tables, term),
            Self::ExactDict => dictionary::exact(tables.lexicon, term),
            Self::PartialDict => dictionary::partial(tables.lexicon, term),
            Self::SuffixRule => suffix::apply(term),
        }
    }
}

fn override_candidate(tables: SourceTables<'_>, term: &str) -> Option<Candidate> {
    let entry = tables.overrides.get(term)?;
    let conf = &settings().confidence;
    let (source, confidence) = if entry.is_gold() {
        (Source::OverrideManual, conf.override_manual)
    } else {
        (Source::Override, conf.override_)
    };
    Some(
        Candidate::new(entry.term_pt.clone(), source, confidence)
            .with_notes(format!("Override ({})", entry.source_tag)),
    )
}
