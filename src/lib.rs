//! EN→PT-BR radiology terminology resolution.
//!
//! Facade over the workspace crates: [`radterm_core`] resolves terms and
//! builds the dictionary, [`radterm_gate`] applies it at runtime.

mod trace_init;

pub use radterm_core::{
    build, candidates, classify, curated, engine, lexicon, lookup, record, scorer, settings, text,
    Candidate, DictionaryEntry, Domain, Engine, EngineOptions, Source, Status, TermType,
    TranslationRecord,
};
pub use radterm_gate as gate;
pub use radterm_gate::{GateError, LookupResult, TokenReport, VocabularyGate};
pub use trace_init::{init_tracing, TraceGuard};
