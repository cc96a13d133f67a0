use crate::classify::is_camel_case;
use crate::record::{Candidate, Source, TermType};
use crate::settings::settings;
use crate::text::append_note;

pub const SUFFIX_NOTE: &str = "morphological suffix rule";
pub const SUSPICIOUS_RADICAL_NOTE: &str = "radical suspeito";

/// Spellings in the stem that a suffix swap alone does not adapt.
const SUSPICIOUS_SEQUENCES: &[&str] = &["th", "ph", "y"];

#[derive(Debug, Clone, Copy)]
pub struct SuffixRule {
    pub suffix: &'static str,
    pub replacement: &'static str,
    pub category: TermType,
    pub confidence: f64,
}

const fn rule(
    suffix: &'static str,
    replacement: &'static str,
    category: TermType,
    confidence: f64,
) -> SuffixRule {
    SuffixRule {
        suffix,
        replacement,
        category,
        confidence,
    }
}

/// Ordered; the first rule whose suffix matches is the only one tried.
pub const SUFFIX_RULES: &[SuffixRule] = &[
    rule("ectomy", "ectomia", TermType::Procedure, 0.90),
    rule("ostomy", "ostomia", TermType::Procedure, 0.90),
    rule("plasty", "plastia", TermType::Procedure, 0.90),
    rule("scopy", "scopia", TermType::Procedure, 0.90),
    rule("graphy", "grafia", TermType::Procedure, 0.90),
    rule("centesis", "centese", TermType::Procedure, 0.85),
    rule("tripsy", "tripsia", TermType::Procedure, 0.85),
    rule("pexy", "pexia", TermType::Procedure, 0.85),
    rule("rrhaphy", "rrafia", TermType::Procedure, 0.85),
    rule("itis", "ite", TermType::Pathology, 0.90),
    rule("osis", "ose", TermType::Pathology, 0.85),
    rule("iasis", "íase", TermType::Pathology, 0.85),
    rule("pathy", "patia", TermType::Pathology, 0.85),
    rule("plegia", "plegia", TermType::Pathology, 0.80),
    rule("megaly", "megalia", TermType::Pathology, 0.85),
    rule("ic", "ico", TermType::Anatomy, 0.50),
    rule("ous", "oso", TermType::Anatomy, 0.45),
];

impl SuffixRule {
    /// Rewritten lowercase term, or `None` when the suffix does not match.
    pub fn rewrite(&self, lowered: &str) -> Option<String> {
        lowered
            .strip_suffix(self.suffix)
            .map(|stem| format!("{stem}{}", self.replacement))
    }
}

/// Apply the first matching suffix rule. A rewrite that leaves the term
/// unchanged (such as `-plegia`) yields nothing.
pub fn apply(term: &str) -> Option<Candidate> {
    if is_camel_case(term) {
        return None;
    }
    let tl = term.trim().to_lowercase();
    let rule = SUFFIX_RULES.iter().find(|r| tl.ends_with(r.suffix))?;
    let translated = rule.rewrite(&tl)?;
    if translated == tl {
        return None;
    }

    let mut confidence = rule.confidence;
    let mut notes = SUFFIX_NOTE.to_string();
    if SUSPICIOUS_SEQUENCES.iter().any(|s| tl.contains(s)) {
        confidence = confidence.min(settings().confidence.suspicious_radical_cap);
        notes = append_note(&notes, SUSPICIOUS_RADICAL_NOTE);
    }
    Some(Candidate::new(translated, Source::RuleSuffix, confidence).with_notes(notes))
}
