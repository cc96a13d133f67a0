//! Character- and token-level helpers shared by the engine and the gate.

/// English function words whose presence marks a "translation" as still English.
const ENGLISH_STOPWORDS: &[&str] = &[
    "and", "or", "with", "without", "of", "for", "from", "to", "in", "on", "by", "at", "the", "a",
    "an", "is", "are", "was", "were", "as", "into", "over", "under",
];

/// Lookup key for a term: trimmed, lowercased, `-`/`_` folded to a space and
/// whitespace runs collapsed.
pub fn normalize_key(term: &str) -> String {
    let folded: String = term
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive equality of a translation and its source term.
///
/// This is the "no-op" check: a candidate whose output equals its input never
/// counts as a translation.
pub fn is_unchanged(term_en: &str, term_pt: &str) -> bool {
    term_pt.to_lowercase() == term_en.to_lowercase()
}

/// Maximal runs of ASCII letters and apostrophes.
pub fn ascii_word_tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_ascii_alphabetic() || c == '\''))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Unicode word tokens (alphanumerics and `_`), the `\b\w+\b` notion of a word.
pub fn word_tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Heuristic for "this Portuguese output is really English".
///
/// True when at least 70% of the word tokens are pure ASCII and at least one
/// of them is an English stopword. Tokens are taken from ASCII letter runs, so
/// in practice the ratio is 1.0 whenever any token exists and the stopword
/// test decides.
pub fn is_probably_english(text: &str) -> bool {
    let tokens = ascii_word_tokens(text);
    if tokens.is_empty() {
        return false;
    }
    let ascii = tokens
        .iter()
        .filter(|t| t.chars().all(|c| c.is_ascii_alphabetic() || c == '\''))
        .count();
    let ratio = ascii as f64 / tokens.len() as f64;
    ratio >= 0.7
        && tokens
            .iter()
            .any(|t| ENGLISH_STOPWORDS.contains(&t.to_lowercase().as_str()))
}

/// Join a note onto an existing note list with the ` | ` separator.
pub fn append_note(notes: &str, extra: &str) -> String {
    if notes.is_empty() {
        extra.to_string()
    } else {
        format!("{notes} | {extra}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_separators() {
        assert_eq!(normalize_key("  Brain_Scan "), "brain scan");
        assert_eq!(normalize_key("11-dehydrocorticosterone"), "11 dehydrocorticosterone");
        assert_eq!(normalize_key("a  -_ b"), "a b");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn unchanged_is_case_insensitive() {
        assert!(is_unchanged("Axial", "axial"));
        assert!(!is_unchanged("thoracic", "torácico"));
    }

    #[test]
    fn english_detection() {
        assert!(is_probably_english("Tumor of the brain"));
        assert!(is_probably_english("bone and joint"));
        assert!(!is_probably_english("neoplasias encefálicas"));
        assert!(!is_probably_english("cintilografia"));
        assert!(!is_probably_english(""));
        assert!(!is_probably_english("123"));
    }

    #[test]
    fn token_splitters() {
        assert_eq!(ascii_word_tokens("lesão focal"), vec!["les", "o", "focal"]);
        assert_eq!(word_tokens("lesão focal-difusa"), vec!["lesão", "focal", "difusa"]);
    }

    #[test]
    fn notes_join() {
        assert_eq!(append_note("", "x"), "x");
        assert_eq!(append_note("a", "b"), "a | b");
    }
}
