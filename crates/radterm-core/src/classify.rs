//! Structural term classification.
//!
//! Every predicate here is pure. The protection predicates decide whether a
//! term is kept in English verbatim and must never be sent to the external
//! lookup; `classify_type` produces the coarse category recorded on output.

use crate::record::TermType;

const CHEMICAL_PREFIXES: &[&str] = &[
    "hydroxy", "methyl", "ethyl", "amino", "acetyl", "carboxy", "chloro", "fluoro", "bromo",
    "iodo", "nitro", "sulfo", "deoxy", "dihydro", "tetra", "hexa", "penta", "tri-", "di-", "mono",
    "poly", "cyclo", "iso", "neo", "pseudo",
];

const DRUG_SUFFIXES: &[&str] = &[
    "mab", "nib", "zole", "pril", "sartan", "statin", "olol", "azepam", "barbital", "cillin",
    "mycin", "zumab", "ximab", "umab", "tinib", "afil", "prazole", "thiazide", "lukast", "navir",
    "vudine", "parin", "vastatin", "profen",
];

const ANATOMY_KEYWORDS: &[&str] = &[
    "artery", "vein", "nerve", "muscle", "bone", "ligament", "tendon", "joint", "organ", "tissue",
    "vessel", "gland",
];

const PROCEDURE_SUFFIXES: &[&str] = &[
    "ectomy", "ostomy", "plasty", "scopy", "graphy", "centesis", "tripsy", "pexy", "rrhaphy",
];

const PATHOLOGY_SUFFIXES: &[&str] = &["itis", "osis", "pathy", "iasis", "plegia"];

/// Why a term is kept in English. Variants are listed in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    CamelCase,
    Abbreviation,
    Eponym,
    Chemical,
}

impl Protection {
    /// Type recorded on a protected term.
    pub fn term_type(self) -> TermType {
        match self {
            Self::CamelCase => TermType::Other,
            Self::Abbreviation => TermType::Abbr,
            Self::Eponym => TermType::Eponym,
            Self::Chemical => TermType::DrugChemical,
        }
    }

    /// Chemicals are slightly less certain than the purely structural rules.
    pub fn confidence(self) -> f64 {
        match self {
            Self::Chemical => 0.9,
            _ => 1.0,
        }
    }

    pub fn note(self) -> &'static str {
        match self {
            Self::CamelCase => "camelCase/brand protected",
            Self::Abbreviation => "abbreviation kept in English",
            Self::Eponym => "eponym kept in English",
            Self::Chemical => "chemical/drug kept in English",
        }
    }
}

/// First protection rule that matches, in camelCase → abbreviation → eponym →
/// chemical order.
pub fn protection(term: &str) -> Option<Protection> {
    if is_camel_case(term) {
        Some(Protection::CamelCase)
    } else if is_abbreviation(term) {
        Some(Protection::Abbreviation)
    } else if is_eponym(term) {
        Some(Protection::Eponym)
    } else if is_chemical(term) {
        Some(Protection::Chemical)
    } else {
        None
    }
}

/// Brand-like mixed case such as `SpineWands` or `AccuDEXA`: a lowercase
/// letter directly followed by an uppercase one.
pub fn is_camel_case(term: &str) -> bool {
    let chars: Vec<char> = term.chars().collect();
    chars
        .windows(2)
        .any(|w| w[0].is_ascii_lowercase() && w[1].is_ascii_uppercase())
}

/// Acronyms and initialisms (`CT`, `MRIs`, `A.B.`, `T2`).
pub fn is_abbreviation(term: &str) -> bool {
    let t = term.trim();
    let clean: String = t.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if clean.chars().count() <= 1 {
        return false;
    }

    let has_upper = clean.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = clean.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && !has_lower && (2..=8).contains(&clean.len()) {
        return true;
    }

    // ^[A-Z]{2,}s?$
    let body = t.strip_suffix('s').unwrap_or(t);
    if body.len() >= 2 && body.chars().all(|c| c.is_ascii_uppercase()) {
        return true;
    }

    // ^[A-Z]\.[A-Z]\.
    let head: Vec<char> = t.chars().take(4).collect();
    if head.len() == 4
        && head[0].is_ascii_uppercase()
        && head[1] == '.'
        && head[2].is_ascii_uppercase()
        && head[3] == '.'
    {
        return true;
    }

    // ^[A-Z0-9]{2,6}$
    (2..=6).contains(&t.len())
        && t
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Possessive eponyms (`Wilms' tumor`, `Crohn's`).
pub fn is_eponym(term: &str) -> bool {
    term.to_lowercase().contains("'s") || term.ends_with("s'") || term.ends_with('\'')
}

/// Chemical nomenclature and drug stems.
pub fn is_chemical(term: &str) -> bool {
    let chars: Vec<char> = term.chars().collect();

    // \d+[,-]\d+
    let locant_pair = chars
        .windows(3)
        .any(|w| w[0].is_ascii_digit() && (w[1] == ',' || w[1] == '-') && w[2].is_ascii_digit());
    if locant_pair {
        return true;
    }

    let tl = term.to_lowercase();

    // ^\d+[a-z-]
    let digits = tl.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(next) = tl.chars().nth(digits) {
            if next.is_ascii_lowercase() || next == '-' {
                return true;
            }
        }
    }

    if CHEMICAL_PREFIXES.iter().any(|p| tl.starts_with(p)) {
        return true;
    }

    DRUG_SUFFIXES
        .iter()
        .any(|s| tl.ends_with(s) && tl.chars().count() > s.len() + 3)
}

/// Coarse category: protection classes first, then keyword/suffix heuristics.
pub fn classify_type(term: &str) -> TermType {
    if is_abbreviation(term) {
        return TermType::Abbr;
    }
    if is_eponym(term) {
        return TermType::Eponym;
    }
    if is_chemical(term) {
        return TermType::DrugChemical;
    }

    let tl = term.to_lowercase();
    if ANATOMY_KEYWORDS.iter().any(|kw| tl.contains(kw)) {
        return TermType::Anatomy;
    }
    if PROCEDURE_SUFFIXES.iter().any(|s| tl.ends_with(s)) {
        return TermType::Procedure;
    }
    if PATHOLOGY_SUFFIXES.iter().any(|s| tl.ends_with(s)) {
        return TermType::Pathology;
    }
    if term.chars().count() > 5 && !tl.is_empty() && tl.chars().all(|c| c.is_ascii_lowercase()) {
        return TermType::General;
    }
    TermType::Other
}

/// Terms the external service may be asked about.
///
/// Generic-term exclusion and the "local candidate already ok" check live in
/// the engine since they need context beyond the term itself.
pub fn is_lookup_eligible(term: &str) -> bool {
    protection(term).is_none() && term.trim().chars().count() > 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case() {
        assert!(is_camel_case("SpineWands"));
        assert!(is_camel_case("AccuDEXA"));
        assert!(is_camel_case("iPhone"));
        assert!(!is_camel_case("Thoracic"));
        assert!(!is_camel_case("MRI"));
        assert!(!is_camel_case("brain scan"));
    }

    #[test]
    fn abbreviations() {
        assert!(is_abbreviation("ABCD"));
        assert!(is_abbreviation("CT"));
        assert!(is_abbreviation("MRIs"));
        assert!(is_abbreviation("T2"));
        assert!(is_abbreviation("A.B.C"));
        assert!(is_abbreviation("X-RAY"));
        assert!(!is_abbreviation("A"));
        assert!(!is_abbreviation("Heart"));
        assert!(!is_abbreviation("lung"));
        assert!(!is_abbreviation("ABCDEFGHIJ"));
    }

    #[test]
    fn eponyms() {
        assert!(is_eponym("Crohn's disease"));
        assert!(is_eponym("Wilms'"));
        assert!(is_eponym("CROHN'S"));
        assert!(!is_eponym("crohn disease"));
    }

    #[test]
    fn chemicals() {
        assert!(is_chemical("11-dehydrocorticosterone"));
        assert!(is_chemical("2,3-diphosphoglycerate"));
        assert!(is_chemical("hydroxyurea"));
        assert!(is_chemical("omeprazole"));
        assert!(is_chemical("rituximab"));
        // Suffix needs a stem of at least four letters.
        assert!(!is_chemical("mab"));
        // Stem length counts characters: four accented letters are enough,
        // three are not even though they span six bytes.
        assert!(is_chemical("éàèùmab"));
        assert!(!is_chemical("éàèmab"));
        assert!(!is_chemical("liver"));
        assert!(!is_chemical("thoracic"));
    }

    #[test]
    fn protection_precedence() {
        assert_eq!(protection("SpineWands"), Some(Protection::CamelCase));
        assert_eq!(protection("ABCD"), Some(Protection::Abbreviation));
        assert_eq!(protection("Crohn's"), Some(Protection::Eponym));
        assert_eq!(protection("methylene"), Some(Protection::Chemical));
        assert_eq!(protection("pneumonia"), None);
        assert_eq!(Protection::Chemical.confidence(), 0.9);
        assert_eq!(Protection::Eponym.confidence(), 1.0);
    }

    #[test]
    fn type_heuristics() {
        assert_eq!(classify_type("CT"), TermType::Abbr);
        assert_eq!(classify_type("carotid artery"), TermType::Anatomy);
        assert_eq!(classify_type("appendectomy"), TermType::Procedure);
        assert_eq!(classify_type("urethrocystitis"), TermType::Pathology);
        assert_eq!(classify_type("thoracic"), TermType::General);
        assert_eq!(classify_type("chip"), TermType::Other);
        assert_eq!(classify_type("brain scan"), TermType::Other);
    }

    #[test]
    fn eligibility() {
        assert!(is_lookup_eligible("brain scan"));
        assert!(!is_lookup_eligible("ABCD"));
        assert!(!is_lookup_eligible("ab"));
        assert!(!is_lookup_eligible("Crohn's"));
    }
}
