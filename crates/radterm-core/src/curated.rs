//! Human-curated tables: overrides and the generic-terms set.
//!
//! Curated CSVs come from several hands and disagree on header names, so
//! every column is looked up through a list of accepted aliases. A missing
//! file is an empty table; a row without a term or translation is skipped.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, debug_span, warn};

/// Source tag of hand-verified radiology translations.
pub const GOLD_TAG: &str = "Manual_Gold";
const DEFAULT_TAG: &str = "Override";

const TERM_EN_COLUMNS: &[&str] = &["English_Term", "term_en", "Term_EN"];
const TERM_PT_COLUMNS: &[&str] = &["Suggested_PT", "term_pt", "Term_PT"];
const SOURCE_COLUMNS: &[&str] = &["Source", "source"];
const GENERIC_COLUMNS: &[&str] = &["term_en", "English_Term", "Term_EN"];

/// File name whose rows are restricted to [`GOLD_TAG`].
pub const GOLD_FILE_NAME: &str = "radiology_gold.csv";

#[derive(Debug, thiserror::Error)]
pub enum CuratedError {
    #[error("IO error reading {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// One row of a curated translation file.
#[derive(Debug, Clone, PartialEq)]
pub struct CuratedRow {
    pub term_en: String,
    pub term_pt: String,
    pub source: String,
}

/// Read `(term_en, term_pt, source)` rows. Missing file ⇒ no rows.
pub fn read_rows(path: &Path) -> Result<Vec<CuratedRow>, CuratedError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "curated file missing, treating as empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(CuratedError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    rows_from_reader(file).map_err(|source| CuratedError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Rows from any CSV source with a header line.
pub fn rows_from_reader<R: Read>(reader: R) -> Result<Vec<CuratedRow>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let en = column_indices(&headers, TERM_EN_COLUMNS);
    let pt = column_indices(&headers, TERM_PT_COLUMNS);
    let src = column_indices(&headers, SOURCE_COLUMNS);

    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line = line + 2, error = %e, "skipping malformed curated row");
                continue;
            }
        };
        let (Some(term_en), Some(term_pt)) = (first_field(&record, &en), first_field(&record, &pt))
        else {
            continue;
        };
        let source = first_field(&record, &src).unwrap_or(DEFAULT_TAG);
        rows.push(CuratedRow {
            term_en: term_en.to_string(),
            term_pt: term_pt.to_string(),
            source: source.to_string(),
        });
    }
    Ok(rows)
}

/// Indices of every alias present in the header, in alias order.
pub fn column_indices(headers: &csv::StringRecord, aliases: &[&str]) -> Vec<usize> {
    aliases
        .iter()
        .filter_map(|alias| headers.iter().position(|h| h.trim() == *alias))
        .collect()
}

/// First non-empty trimmed value among the given columns.
pub fn first_field<'r>(record: &'r csv::StringRecord, columns: &[usize]) -> Option<&'r str> {
    columns
        .iter()
        .filter_map(|&i| record.get(i))
        .map(str::trim)
        .find(|v| !v.is_empty())
}

/// A curated translation and its merge priority.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideEntry {
    pub term_pt: String,
    pub source_tag: String,
    pub priority: u8,
}

impl OverrideEntry {
    pub fn new(term_pt: impl Into<String>, source_tag: impl Into<String>) -> Self {
        let source_tag = source_tag.into();
        let priority = if source_tag == GOLD_TAG { 100 } else { 90 };
        Self {
            term_pt: term_pt.into(),
            source_tag,
            priority,
        }
    }

    pub fn is_gold(&self) -> bool {
        self.source_tag == GOLD_TAG
    }
}

/// One override file and whether it only contributes gold rows.
#[derive(Debug, Clone)]
pub struct OverrideFile {
    pub path: PathBuf,
    pub gold_only: bool,
}

impl OverrideFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            gold_only: false,
        }
    }

    pub fn gold_only(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            gold_only: true,
        }
    }

    /// Gold-only exactly when the file is named `radiology_gold.csv`.
    pub fn detect(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let gold_only = path.file_name().is_some_and(|n| n == GOLD_FILE_NAME);
        Self { path, gold_only }
    }
}

/// Merged override table keyed by lowercased English term.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: HashMap<String, OverrideEntry>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and merge files in order. Higher priority wins; on equal priority
    /// the first loaded entry stays.
    pub fn load(files: &[OverrideFile]) -> Result<Self, CuratedError> {
        let _span = debug_span!("OverrideTable::load", files = files.len()).entered();
        let mut table = Self::new();
        for file in files {
            let rows = read_rows(&file.path)?;
            let before = table.len();
            table.merge_rows(rows, file.gold_only);
            debug!(path = %file.path.display(), added = table.len() - before, "override file merged");
        }
        Ok(table)
    }

    pub fn merge_rows(&mut self, rows: impl IntoIterator<Item = CuratedRow>, gold_only: bool) {
        for row in rows {
            if gold_only && row.source != GOLD_TAG {
                continue;
            }
            self.insert(&row.term_en, OverrideEntry::new(row.term_pt, row.source));
        }
    }

    pub fn insert(&mut self, term_en: &str, entry: OverrideEntry) {
        let key = term_en.trim().to_lowercase();
        match self.entries.get(&key) {
            Some(existing) if existing.priority >= entry.priority => {}
            _ => {
                self.entries.insert(key, entry);
            }
        }
    }

    pub fn get(&self, term: &str) -> Option<&OverrideEntry> {
        self.entries.get(&term.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Common-language terms that must not be resolved to verbose descriptors.
#[derive(Debug, Clone, Default)]
pub struct GenericTerms {
    terms: HashSet<String>,
}

impl GenericTerms {
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Missing file ⇒ empty set.
    pub fn load(path: &Path) -> Result<Self, CuratedError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(CuratedError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = rdr.headers().cloned().map_err(|source| CuratedError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let cols = column_indices(&headers, GENERIC_COLUMNS);
        let mut terms = Vec::new();
        for result in rdr.records() {
            match result {
                Ok(record) => terms.extend(first_field(&record, &cols).map(str::to_string)),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping malformed generic row"),
            }
        }
        Ok(Self::from_terms(terms))
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(&term.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn header_aliases() {
        let rows = rows_from_reader(
            "term_en,term_pt\nLiver,fígado\n,vazio\nkidney,\n".as_bytes(),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].term_en, "Liver");
        assert_eq!(rows[0].source, "Override");

        let rows = rows_from_reader(
            "English_Term,Suggested_PT,Source\nanechoic,anecóico,Manual_Gold\n".as_bytes(),
        )
        .unwrap();
        assert_eq!(rows[0].source, GOLD_TAG);
    }

    #[test]
    fn gold_beats_plain_override_regardless_of_order() {
        let dir = tempfile::tempdir().unwrap();
        let plain = write_csv(
            dir.path(),
            "overrides.csv",
            "English_Term,Suggested_PT,Source\nneuroradiology,neuro-radiologia,Override\n",
        );
        let gold = write_csv(
            dir.path(),
            "radiology_gold.csv",
            "English_Term,Suggested_PT,Source\nneuroradiology,neurorradiologia,Manual_Gold\n",
        );
        let table =
            OverrideTable::load(&[OverrideFile::detect(plain), OverrideFile::detect(gold)]).unwrap();
        let entry = table.get("Neuroradiology").unwrap();
        assert_eq!(entry.term_pt, "neurorradiologia");
        assert!(entry.is_gold());
        assert_eq!(entry.priority, 100);
    }

    #[test]
    fn equal_priority_keeps_first() {
        let mut table = OverrideTable::new();
        table.insert("axial", OverrideEntry::new("axial (1)", "Override"));
        table.insert("axial", OverrideEntry::new("axial (2)", "Generic"));
        assert_eq!(table.get("axial").unwrap().term_pt, "axial (1)");
    }

    #[test]
    fn gold_file_drops_non_gold_rows() {
        let dir = tempfile::tempdir().unwrap();
        let gold = write_csv(
            dir.path(),
            GOLD_FILE_NAME,
            "English_Term,Suggested_PT,Source\nfoo,bar,Morpho_Fix\nbaz,qux,Manual_Gold\n",
        );
        let table = OverrideTable::load(&[OverrideFile::detect(gold)]).unwrap();
        assert!(table.get("foo").is_none());
        assert_eq!(table.get("baz").unwrap().term_pt, "qux");
    }

    #[test]
    fn missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = OverrideTable::load(&[OverrideFile::new(dir.path().join("nope.csv"))]).unwrap();
        assert!(table.is_empty());
        let generic = GenericTerms::load(&dir.path().join("nope.csv")).unwrap();
        assert!(generic.is_empty());
    }

    #[test]
    fn generic_terms_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "generic_terms.csv", "term_en\n Chip \nCase\n\n");
        let generic = GenericTerms::load(&path).unwrap();
        assert_eq!(generic.len(), 2);
        assert!(generic.contains("chip"));
        assert!(generic.contains("CASE"));
        assert!(!generic.contains("liver"));
    }
}
