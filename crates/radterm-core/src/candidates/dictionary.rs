use crate::classify::is_camel_case;
use crate::lexicon::Lexicon;
use crate::record::{Candidate, Source};
use crate::settings::settings;

pub const PARTIAL_NOTE: &str = "partial by tokens";

/// Exact match on the trimmed, lowercased term. Entries that map a term to
/// itself are never proposed.
pub fn exact(lexicon: &Lexicon, term: &str) -> Option<Candidate> {
    let key = term.trim().to_lowercase();
    let translated = lexicon.get(&key)?;
    if translated.to_lowercase() == key {
        return None;
    }
    Some(Candidate::new(translated, Source::Dict, settings().confidence.dict))
}

/// Translate a multi-word term token by token.
///
/// Tokens split on whitespace and hyphens; unknown tokens pass through.
/// Proposed only when at least one token changed, re-joined with `-` when the
/// input had a hyphen.
pub fn partial(lexicon: &Lexicon, term: &str) -> Option<Candidate> {
    if is_camel_case(term) {
        return None;
    }
    let tl = term.trim().to_lowercase();
    let tokens: Vec<&str> = tl
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() < 2 {
        return None;
    }

    let mut changed = false;
    let translated: Vec<&str> = tokens
        .iter()
        .map(|&tok| match lexicon.get(tok) {
            Some(pt) if pt.to_lowercase() != tok => {
                changed = true;
                pt
            }
            _ => tok,
        })
        .collect();
    if !changed {
        return None;
    }

    let sep = if term.contains('-') { "-" } else { " " };
    Some(
        Candidate::new(
            translated.join(sep),
            Source::DictPartial,
            settings().confidence.dict_partial,
        )
        .with_notes(PARTIAL_NOTE),
    )
}
