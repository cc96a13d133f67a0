//! Closed vocabularies and the durable per-term record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Trust level of a term's final translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    KeepEn,
    Ambiguous,
    NeedsReview,
    Untranslated,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::KeepEn => "keep_en",
            Self::Ambiguous => "ambiguous",
            Self::NeedsReview => "needs_review",
            Self::Untranslated => "untranslated",
        }
    }

    /// Parse a status tag. Unknown tags return `None`; callers decide whether
    /// that means `NeedsReview` or a hard error.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "ok" => Some(Self::Ok),
            "keep_en" => Some(Self::KeepEn),
            "ambiguous" => Some(Self::Ambiguous),
            "needs_review" => Some(Self::NeedsReview),
            "untranslated" => Some(Self::Untranslated),
            _ => None,
        }
    }

    /// `ok` and `keep_en` are the only statuses a consumer may emit unreviewed.
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Ok | Self::KeepEn)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse term category guessed by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermType {
    Abbr,
    Eponym,
    DrugChemical,
    Anatomy,
    Procedure,
    Pathology,
    General,
    Other,
}

impl TermType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Abbr => "abbr",
            Self::Eponym => "eponym",
            Self::DrugChemical => "drug_chemical",
            Self::Anatomy => "anatomy",
            Self::Procedure => "procedure",
            Self::Pathology => "pathology",
            Self::General => "general",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mechanism that produced a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    OverrideManual,
    Override,
    Dict,
    DictPartial,
    RuleSuffix,
    DecsApi,
    /// Deterministic protection rule (abbreviation, eponym, ...).
    Rule,
    /// Post-processing normalizer map.
    Normalizer,
    None,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OverrideManual => "override_manual",
            Self::Override => "override",
            Self::Dict => "dict",
            Self::DictPartial => "dict_partial",
            Self::RuleSuffix => "rule_suffix",
            Self::DecsApi => "decs_api",
            Self::Rule => "rule",
            Self::Normalizer => "normalizer",
            Self::None => "none",
        }
    }

    /// Tie-break rank among candidate sources; lower wins.
    pub fn priority(self) -> u8 {
        match self {
            Self::OverrideManual => 0,
            Self::Override => 1,
            Self::Dict => 2,
            Self::DictPartial => 3,
            Self::RuleSuffix => 4,
            Self::DecsApi => 5,
            Self::Rule | Self::Normalizer | Self::None => 6,
        }
    }

    pub fn is_override(self) -> bool {
        matches!(self, Self::OverrideManual | Self::Override)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topical tag attached to a resolved dictionary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Radiology,
    Generic,
    Other,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Radiology => "radiology",
            Self::Generic => "generic",
            Self::Other => "other",
        }
    }

    /// Unknown tags fall back to `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "radiology" => Self::Radiology,
            "generic" => Self::Generic,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One proposed translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub term_pt: String,
    pub source: Source,
    pub confidence: f64,
    pub notes: String,
}

impl Candidate {
    pub fn new(term_pt: impl Into<String>, source: Source, confidence: f64) -> Self {
        Self {
            term_pt: term_pt.into(),
            source,
            confidence,
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Durable unit produced once per input term. Serialized as one JSONL line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub id: u64,
    pub term_en: String,
    pub term_en_norm: String,
    pub term_pt: String,
    pub status: Status,
    pub type_guess: TermType,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub confidence: f64,
}

/// Final resolved row consumed by the vocabulary gate.
///
/// `source` is a provenance label (`Override`, `DeCS`, `Manual_Gold`, ...)
/// rather than a [`Source`], since curated files carry their own tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub term_en: String,
    pub term_pt: String,
    pub status: Status,
    pub domain: Domain,
    pub source: String,
    pub confidence: f64,
    pub notes: String,
}
