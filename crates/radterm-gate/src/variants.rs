//! Lookup keys tried for a raw term, most specific first.

use radterm_core::text::normalize_key;

/// Ordered, de-duplicated keys: the normalized form, hyphen and underscore
/// joins of a multi-word key, the raw term with `-` or `_` read as spaces,
/// then a naive singular (drop a trailing `s` when longer than three
/// characters) or plural (append `s`).
pub fn candidate_keys(term: &str) -> Vec<String> {
    let raw = term.trim();
    let mut keys: Vec<String> = Vec::new();
    let mut add = |key: String| {
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    };

    let base = normalize_key(raw);
    add(base.clone());

    if base.contains(' ') {
        add(base.replace(' ', "-"));
        add(base.replace(' ', "_"));
    }
    if raw.contains('-') {
        add(normalize_key(&raw.replace('-', " ")));
    }
    if raw.contains('_') {
        add(normalize_key(&raw.replace('_', " ")));
    }

    if let Some(singular) = base.strip_suffix('s') {
        if base.chars().count() > 3 {
            add(singular.to_string());
        }
    } else if !base.is_empty() {
        add(format!("{base}s"));
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word_plural_toggle() {
        assert_eq!(candidate_keys("Lesions"), vec!["lesions", "lesion"]);
        assert_eq!(candidate_keys("lesion"), vec!["lesion", "lesions"]);
        assert_eq!(candidate_keys("abs"), vec!["abs"]);
    }

    #[test]
    fn multi_word_separators() {
        assert_eq!(
            candidate_keys(" Ground-Glass "),
            vec!["ground glass", "ground-glass", "ground_glass", "ground glas"]
        );
        assert_eq!(
            candidate_keys("11 dehydrocorticosterone"),
            vec![
                "11 dehydrocorticosterone",
                "11-dehydrocorticosterone",
                "11_dehydrocorticosterone",
                "11 dehydrocorticosterones",
            ]
        );
    }

    #[test]
    fn empty_term_has_no_keys() {
        assert!(candidate_keys("   ").is_empty());
    }
}
