//! Resolved-dictionary build: one curated, domain-tagged row per unique term.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::RegexSet;
use serde::Deserialize;
use tracing::{debug, debug_span, info};

use super::{read_records, BuildError};
use crate::curated::{read_rows, CuratedRow, GenericTerms, GOLD_FILE_NAME, GOLD_TAG};
use crate::engine::MOSTLY_ENGLISH_NOTE;
use crate::record::{DictionaryEntry, Domain, Source, Status, TranslationRecord};
use crate::text::{append_note, is_probably_english, is_unchanged};

/// Header of every dictionary CSV, in column order.
pub const DICTIONARY_COLUMNS: [&str; 7] = [
    "term_en",
    "term_pt",
    "status",
    "domain",
    "source",
    "confidence",
    "notes",
];

pub const MORPHO_FIX_TAG: &str = "Morpho_Fix";
pub const REVIEW_VERBOSE_TAG: &str = "Review_Verbose";

pub const GENERIC_OVERRIDE_NOTE: &str = "generic_override";
pub const GOLD_NOTE: &str = "radiology_gold";
pub const GOLD_REVIEW_NOTE: &str = "radiology_gold_review";
pub const GENERIC_DECS_NOTE: &str = "generic_decs_demoted";
pub const PT_EQ_EN_NOTE: &str = "pt_eq_en_demoted";

pub const GENERIC_OVERRIDES_FILE: &str = "generic_overrides.csv";
pub const GENERIC_TERMS_FILE: &str = "generic_terms.csv";
pub const RADIOLOGY_LEXICON_FILE: &str = "radiology.lexicon.json";

const GOLD_SOURCES: [&str; 3] = [GOLD_TAG, MORPHO_FIX_TAG, REVIEW_VERBOSE_TAG];

const RADIOLOGY_PATTERNS: &[&str] = &[
    r"\bct\b",
    r"\bmri\b",
    r"\bpet\b",
    r"\bspect\b",
    r"\bdicom\b",
    r"\bpacs\b",
    r"x[-\s]?ray",
    r"roentgen",
    r"radiograph",
    r"radiolog",
    r"fluoroscop",
    r"tomograph",
    r"ultrasound",
    r"sonograph",
    r"doppler",
    r"mammograph",
    r"angiograph",
    r"scintigraph",
    r"hounsfield",
    r"\bt1\b",
    r"\bt2\b",
    r"\bflair\b",
    r"\bcontrast\b",
    r"\bsequenc",
    r"\baxial\b",
    r"\bsagittal\b",
    r"\bcoronal\b",
];

fn radiology_patterns() -> &'static RegexSet {
    static PATTERNS: OnceLock<RegexSet> = OnceLock::new();
    PATTERNS.get_or_init(|| RegexSet::new(RADIOLOGY_PATTERNS).expect("radiology patterns must compile"))
}

#[derive(Deserialize)]
struct LexiconItem {
    #[serde(default)]
    preferred_en: Option<String>,
    #[serde(default)]
    synonyms_en: Option<Vec<String>>,
}

/// Curated tables the builder consults, keyed by lowercased English term.
#[derive(Debug, Clone, Default)]
pub struct BuildInputs {
    pub radiology_gold: HashMap<String, CuratedRow>,
    pub generic_overrides: HashMap<String, CuratedRow>,
    pub generic_terms: GenericTerms,
    pub radiology_lexicon: HashSet<String>,
}

impl BuildInputs {
    /// Load every curated table from `dir`; missing files are empty tables.
    pub fn load(dir: &Path) -> Result<Self, BuildError> {
        let _span = debug_span!("BuildInputs::load", dir = %dir.display()).entered();
        let inputs = Self {
            radiology_gold: load_radiology_gold(&dir.join(GOLD_FILE_NAME))?,
            generic_overrides: keyed(read_rows(&dir.join(GENERIC_OVERRIDES_FILE))?),
            generic_terms: GenericTerms::load(&dir.join(GENERIC_TERMS_FILE))?,
            radiology_lexicon: load_radiology_lexicon(&dir.join(RADIOLOGY_LEXICON_FILE))?,
        };
        debug!(
            gold = inputs.radiology_gold.len(),
            generic_overrides = inputs.generic_overrides.len(),
            generic_terms = inputs.generic_terms.len(),
            lexicon = inputs.radiology_lexicon.len(),
            "build inputs loaded"
        );
        Ok(inputs)
    }
}

fn keyed(rows: Vec<CuratedRow>) -> HashMap<String, CuratedRow> {
    rows.into_iter()
        .map(|row| (row.term_en.trim().to_lowercase(), row))
        .collect()
}

/// Gold rows tagged `Manual_Gold`, `Morpho_Fix` or `Review_Verbose`.
pub fn load_radiology_gold(path: &Path) -> Result<HashMap<String, CuratedRow>, BuildError> {
    let rows = read_rows(path)?
        .into_iter()
        .filter(|row| GOLD_SOURCES.contains(&row.source.as_str()))
        .collect();
    Ok(keyed(rows))
}

/// Lowercased preferred terms and synonyms from a JSON array of
/// `{preferred_en, synonyms_en}` objects. Missing file ⇒ empty set.
pub fn load_radiology_lexicon(path: &Path) -> Result<HashSet<String>, BuildError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(BuildError::io(path)(e)),
    };
    let items: Vec<LexiconItem> = serde_json::from_str(&text).map_err(|source| BuildError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let mut terms = HashSet::new();
    for item in items {
        terms.extend(item.preferred_en.filter(|p| !p.is_empty()).map(|p| p.to_lowercase()));
        terms.extend(item.synonyms_en.unwrap_or_default().iter().map(|s| s.to_lowercase()));
    }
    Ok(terms)
}

/// Provenance label for a record's source list.
pub fn map_source(sources: &[Source], status: Status) -> &'static str {
    if status == Status::KeepEn {
        "KeepEN"
    } else if sources.iter().any(|s| s.is_override()) {
        "Override"
    } else if sources.contains(&Source::DecsApi) {
        "DeCS"
    } else if sources.contains(&Source::Dict) || sources.contains(&Source::DictPartial) {
        "Dict"
    } else {
        "Normalized"
    }
}

/// Curated gold, the external lexicon, or a strong radiology pattern on
/// either side of the pair.
pub fn is_radiology(term_en: &str, term_pt: &str, inputs: &BuildInputs) -> bool {
    let tl = term_en.trim().to_lowercase();
    if inputs.radiology_gold.contains_key(&tl) || inputs.radiology_lexicon.contains(&tl) {
        return true;
    }
    let patterns = radiology_patterns();
    patterns.is_match(&tl) || patterns.is_match(&term_pt.to_lowercase())
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Curated key for a record: the raw lowercased term first, then its
/// normalized key.
fn curated<'a>(map: &'a HashMap<String, CuratedRow>, rec: &TranslationRecord) -> Option<&'a CuratedRow> {
    map.get(&rec.term_en.trim().to_lowercase())
        .or_else(|| map.get(&rec.term_en_norm))
}

/// Resolve one record into a dictionary row.
pub fn resolve_entry(rec: &TranslationRecord, inputs: &BuildInputs) -> DictionaryEntry {
    let mut term_pt = rec.term_pt.clone();
    let mut status = rec.status;
    let mut confidence = rec.confidence;
    let mut notes = rec.notes.clone();
    let mut source = map_source(&rec.sources, rec.status).to_string();
    let mut generic_override = false;

    if let Some(row) = curated(&inputs.generic_overrides, rec) {
        term_pt = row.term_pt.clone();
        status = Status::Ok;
        source = "Override".to_string();
        confidence = 0.95;
        notes = GENERIC_OVERRIDE_NOTE.to_string();
        generic_override = true;
    } else if let Some(row) = curated(&inputs.radiology_gold, rec) {
        term_pt = row.term_pt.clone();
        source = row.source.clone();
        if row.source == REVIEW_VERBOSE_TAG {
            status = Status::NeedsReview;
            confidence = if confidence > 0.0 { confidence.min(0.6) } else { 0.6 };
            notes = GOLD_REVIEW_NOTE.to_string();
        } else {
            status = Status::Ok;
            confidence = if row.source == GOLD_TAG { 0.99 } else { 0.9 };
            notes = GOLD_NOTE.to_string();
        }
    }

    let is_generic = inputs.generic_terms.contains(&rec.term_en)
        || inputs.generic_terms.contains(&rec.term_en_norm);
    if status == Status::Ok && source == "DeCS" && is_generic {
        status = Status::NeedsReview;
        notes = append_note(&notes, GENERIC_DECS_NOTE);
    }
    if status == Status::Ok && is_unchanged(&rec.term_en, &term_pt) {
        status = Status::NeedsReview;
        notes = append_note(&notes, PT_EQ_EN_NOTE);
    }
    if status == Status::Ok && is_probably_english(&term_pt) {
        status = Status::NeedsReview;
        notes = append_note(&notes, MOSTLY_ENGLISH_NOTE);
    }

    let domain = if generic_override {
        Domain::Generic
    } else if is_radiology(&rec.term_en, &term_pt, inputs) {
        Domain::Radiology
    } else if is_generic {
        Domain::Generic
    } else {
        Domain::Other
    };

    if !matches!(status, Status::Ok | Status::KeepEn | Status::NeedsReview) {
        status = Status::NeedsReview;
    }

    DictionaryEntry {
        term_en: rec.term_en.clone(),
        term_pt,
        status,
        domain,
        source,
        confidence: round4(confidence),
        notes,
    }
}

/// Dedup key: the normalized term, or the lowercased raw term when a record
/// carries none.
fn dedup_key(rec: &TranslationRecord) -> String {
    if rec.term_en_norm.is_empty() {
        rec.term_en.to_lowercase()
    } else {
        rec.term_en_norm.to_lowercase()
    }
}

/// Resolve every record; later duplicates of a term are dropped. Returns the
/// rows and the number of duplicates.
pub fn build_entries(records: &[TranslationRecord], inputs: &BuildInputs) -> (Vec<DictionaryEntry>, usize) {
    let mut seen = HashSet::new();
    let mut duplicates = 0;
    let mut entries = Vec::with_capacity(records.len());
    for rec in records {
        if !seen.insert(dedup_key(rec)) {
            duplicates += 1;
            continue;
        }
        entries.push(resolve_entry(rec, inputs));
    }
    (entries, duplicates)
}

/// Counts and post-build sanity checks; every `violations_*` count should be
/// zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildSummary {
    pub unique: usize,
    pub duplicates: usize,
    pub ok: usize,
    pub needs_review: usize,
    pub status_counts: BTreeMap<String, usize>,
    pub source_counts: BTreeMap<String, usize>,
    pub domain_counts: BTreeMap<String, usize>,
    pub violations_ok_unchanged: usize,
    pub violations_ok_english: usize,
    pub violations_generic_decs: usize,
}

impl BuildSummary {
    pub fn from_entries(entries: &[DictionaryEntry], duplicates: usize, inputs: &BuildInputs) -> Self {
        let mut s = Self {
            unique: entries.len(),
            duplicates,
            ..Self::default()
        };
        for e in entries {
            *s.status_counts.entry(e.status.to_string()).or_default() += 1;
            *s.source_counts.entry(e.source.clone()).or_default() += 1;
            *s.domain_counts.entry(e.domain.to_string()).or_default() += 1;
            if e.status.is_resolved() {
                s.ok += 1;
            }
            if e.status == Status::NeedsReview {
                s.needs_review += 1;
            }
            if e.status != Status::Ok {
                continue;
            }
            if is_unchanged(&e.term_en, &e.term_pt) {
                s.violations_ok_unchanged += 1;
            }
            if is_probably_english(&e.term_pt) {
                s.violations_ok_english += 1;
            }
            if e.source == "DeCS" && inputs.generic_terms.contains(&e.term_en) {
                s.violations_generic_decs += 1;
            }
        }
        s
    }

    pub fn violations(&self) -> usize {
        self.violations_ok_unchanged + self.violations_ok_english + self.violations_generic_decs
    }
}

fn write_csv(path: &Path, rows: &[&DictionaryEntry]) -> Result<(), BuildError> {
    let csv_err = |source| BuildError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    wtr.write_record(DICTIONARY_COLUMNS).map_err(csv_err)?;
    for row in rows {
        wtr.serialize(row).map_err(csv_err)?;
    }
    wtr.flush().map_err(BuildError::io(path))
}

fn write_json(path: &Path, rows: &[&DictionaryEntry]) -> Result<(), BuildError> {
    let file = File::create(path).map_err(BuildError::io(path))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, rows).map_err(|source| BuildError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    out.flush().map_err(BuildError::io(path))
}

/// Write the full dictionary and its status/domain slices into `outdir`.
/// Returns the written paths.
pub fn write_outputs(entries: &[DictionaryEntry], outdir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    fs::create_dir_all(outdir).map_err(BuildError::io(outdir))?;

    let all: Vec<&DictionaryEntry> = entries.iter().collect();
    let select = |f: &dyn Fn(&DictionaryEntry) -> bool| -> Vec<&DictionaryEntry> {
        entries.iter().filter(|e| f(e)).collect()
    };
    let ok = select(&|e| e.status.is_resolved());
    let review = select(&|e| e.status == Status::NeedsReview);
    let radiology = select(&|e| e.domain == Domain::Radiology);
    let generic = select(&|e| e.domain == Domain::Generic);

    let mut written = Vec::new();
    let mut csv_out = |name: &str, rows: &[&DictionaryEntry]| -> Result<(), BuildError> {
        let path = outdir.join(name);
        write_csv(&path, rows)?;
        written.push(path);
        Ok(())
    };
    csv_out("dictionary_full.csv", &all)?;
    csv_out("dictionary_ok.csv", &ok)?;
    csv_out("dictionary_needs_review.csv", &review)?;
    csv_out("dictionary_radiology.csv", &radiology)?;
    csv_out("dictionary_generic.csv", &generic)?;

    for (name, rows) in [
        ("dictionary_full.json", &all),
        ("dictionary_radiology.json", &radiology),
        ("dictionary_generic.json", &generic),
    ] {
        let path = outdir.join(name);
        write_json(&path, rows)?;
        written.push(path);
    }
    Ok(written)
}

/// Build the resolved dictionary from a record stream.
pub fn build_dictionary(input: &Path, outdir: &Path, inputs: &BuildInputs) -> Result<BuildSummary, BuildError> {
    let _span = debug_span!("build_dictionary", input = %input.display()).entered();
    let records = read_records(input)?;
    let (entries, duplicates) = build_entries(&records, inputs);
    write_outputs(&entries, outdir)?;

    let summary = BuildSummary::from_entries(&entries, duplicates, inputs);
    info!(
        unique = summary.unique,
        duplicates = summary.duplicates,
        ok = summary.ok,
        needs_review = summary.needs_review,
        violations = summary.violations(),
        "dictionary build complete"
    );
    Ok(summary)
}
