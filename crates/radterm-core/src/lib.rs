//! Terminology resolution for EN→PT-BR radiology vocabularies.
//!
//! Terms flow through [`classify`] → [`candidates`] (plus the optional
//! [`lookup`] client) → [`scorer`], and [`engine::Engine`] ties the steps
//! together into one [`record::TranslationRecord`] per term. The [`build`]
//! module turns record streams into the resolved dictionary.

pub mod build;
pub mod candidates;
pub mod classify;
pub mod curated;
pub mod engine;
pub mod lexicon;
pub mod lookup;
pub mod record;
pub mod scorer;
pub mod settings;
pub mod text;

pub use engine::{Engine, EngineOptions};
pub use record::{Candidate, DictionaryEntry, Domain, Source, Status, TermType, TranslationRecord};
