//! Second pass over a record stream: curated overrides, spelling
//! normalization and the DeCS sanity filter.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug_span, info};

use super::{jsonl_line, read_records, BuildError};
use crate::candidates::{CandidateStrategy, SourceTables};
use crate::curated::{GenericTerms, OverrideTable};
use crate::lexicon::Lexicon;
use crate::record::{Source, Status, TranslationRecord};
use crate::scorer::{determine_status, is_verbose_generic};
use crate::text::{append_note, is_probably_english};

pub const NORMALIZED_NOTE: &str = "Normalizado";
pub const DECS_ENGLISH_NOTE: &str = "DeCS em inglês (demovido)";
pub const DECS_GENERIC_NOTE: &str = "Genérico via DeCS (demovido)";
pub const DECS_VERBOSE_NOTE: &str = "DeCS verboso (demovido)";

const SANITY_CONFIDENCE_CAP: f64 = 0.55;

#[derive(Deserialize)]
struct NormalizerFile {
    #[serde(default)]
    replace: Vec<ReplaceRule>,
}

#[derive(Deserialize)]
struct ReplaceRule {
    #[serde(default)]
    to: String,
    #[serde(default)]
    from: Vec<String>,
}

/// Preferred spellings: every listed variant maps to its target.
///
/// ```toml
/// [[replace]]
/// to = "ultrassonografia"
/// from = ["ultrassom", "ecografia"]
/// ```
#[derive(Debug, Clone, Default)]
pub struct NormalizerMap {
    variants: HashMap<String, String>,
}

impl NormalizerMap {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        let file: NormalizerFile = toml::from_str(toml_str)?;
        let mut variants = HashMap::new();
        for rule in file.replace {
            if rule.to.trim().is_empty() {
                continue;
            }
            for variant in rule.from.iter().filter(|v| !v.is_empty()) {
                variants.insert(variant.to_lowercase(), rule.to.clone());
            }
        }
        Ok(Self { variants })
    }

    /// Missing file ⇒ empty map.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(BuildError::io(path)(e)),
        };
        Self::from_toml_str(&text).map_err(|e| BuildError::Normalizer {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Whole-string, case-insensitive replacement.
    pub fn apply(&self, term_pt: &str) -> Option<&str> {
        self.variants.get(&term_pt.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Which passes to run; `None` disables a pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostprocessOptions<'a> {
    pub overrides: Option<&'a OverrideTable>,
    pub normalizer: Option<&'a NormalizerMap>,
    /// Generic-term set for the sanity filter.
    pub sanity: Option<&'a GenericTerms>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostprocessSummary {
    pub total: usize,
    /// Records whose translation or status changed.
    pub changed: usize,
}

/// Apply the enabled passes to one record. Returns whether the translation
/// or status changed.
///
/// An override replaces the record outright and skips the other passes.
pub fn postprocess_record(rec: &mut TranslationRecord, opts: PostprocessOptions<'_>) -> bool {
    let original_pt = rec.term_pt.clone();
    let original_status = rec.status;

    let overridden = opts
        .overrides
        .and_then(|table| reapply_override(rec, table))
        .is_some();

    if !overridden {
        if let Some(map) = opts.normalizer {
            normalize(rec, map);
        }
        if let Some(generic) = opts.sanity {
            sanity_filter(rec, generic);
        }
    }

    rec.term_pt != original_pt || rec.status != original_status
}

fn reapply_override(rec: &mut TranslationRecord, table: &OverrideTable) -> Option<()> {
    let tables = SourceTables {
        lexicon: Lexicon::builtin(),
        overrides: table,
    };
    let cand = CandidateStrategy::Override.propose(tables, &rec.term_en)?;
    rec.status = determine_status(cand.confidence, &rec.term_en, &cand.term_pt);
    rec.term_pt = cand.term_pt;
    rec.sources = vec![cand.source];
    rec.notes = cand.notes;
    rec.confidence = cand.confidence;
    Some(())
}

fn normalize(rec: &mut TranslationRecord, map: &NormalizerMap) {
    let Some(target) = map.apply(&rec.term_pt) else {
        return;
    };
    if target == rec.term_pt {
        return;
    }
    rec.term_pt = target.to_string();
    if matches!(
        rec.status,
        Status::Ok | Status::Ambiguous | Status::NeedsReview
    ) {
        rec.status = determine_status(rec.confidence, &rec.term_en, &rec.term_pt);
    }
    rec.notes = append_note(&rec.notes, NORMALIZED_NOTE);
    rec.sources.push(Source::Normalizer);
}

fn sanity_filter(rec: &mut TranslationRecord, generic: &GenericTerms) {
    if rec.status != Status::Ok || !rec.sources.contains(&Source::DecsApi) {
        return;
    }
    let note = if is_probably_english(&rec.term_pt) {
        DECS_ENGLISH_NOTE
    } else if is_verbose_generic(&rec.term_en, &rec.term_pt, generic) {
        DECS_VERBOSE_NOTE
    } else if generic.contains(&rec.term_en) {
        DECS_GENERIC_NOTE
    } else {
        return;
    };
    rec.status = Status::NeedsReview;
    rec.confidence = rec.confidence.min(SANITY_CONFIDENCE_CAP);
    rec.notes = append_note(&rec.notes, note);
}

/// Post-process `input` into `output` (overwritten).
pub fn postprocess_file(
    input: &Path,
    output: &Path,
    opts: PostprocessOptions<'_>,
) -> Result<PostprocessSummary, BuildError> {
    let _span = debug_span!("postprocess", input = %input.display()).entered();
    let records = read_records(input)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
    }
    let file = File::create(output).map_err(BuildError::io(output))?;
    let mut out = BufWriter::new(file);

    let mut summary = PostprocessSummary::default();
    for mut rec in records {
        summary.total += 1;
        if postprocess_record(&mut rec, opts) {
            summary.changed += 1;
        }
        let line = jsonl_line(&rec).map_err(|source| BuildError::Json {
            path: output.to_path_buf(),
            source,
        })?;
        out.write_all(line.as_bytes())
            .map_err(BuildError::io(output))?;
    }
    out.flush().map_err(BuildError::io(output))?;

    info!(total = summary.total, changed = summary.changed, "postprocess complete");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curated::{CuratedRow, OverrideEntry, GOLD_TAG};
    use crate::record::TermType;

    fn record(term_en: &str, term_pt: &str, status: Status, source: Source, confidence: f64) -> TranslationRecord {
        TranslationRecord {
            id: 1,
            term_en: term_en.into(),
            term_en_norm: term_en.to_lowercase(),
            term_pt: term_pt.into(),
            status,
            type_guess: TermType::Other,
            notes: String::new(),
            sources: vec![source],
            confidence,
        }
    }

    const RULES: &str = r#"
[[replace]]
to = "ultrassonografia"
from = ["ultrassom", "Ecografia"]

[[replace]]
to = ""
from = ["ignored"]
"#;

    #[test]
    fn normalizer_parses_rules() {
        let map = NormalizerMap::from_toml_str(RULES).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.apply("ECOGRAFIA"), Some("ultrassonografia"));
        assert_eq!(map.apply("ultrassom doppler"), None);
        assert_eq!(map.apply("ignored"), None);
    }

    #[test]
    fn normalizer_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(NormalizerMap::load(&dir.path().join("none.toml")).unwrap().is_empty());
    }

    #[test]
    fn normalizer_rewrites_and_notes() {
        let map = NormalizerMap::from_toml_str(RULES).unwrap();
        let mut rec = record("ultrasound", "ultrassom", Status::Ok, Source::DecsApi, 0.92);
        let opts = PostprocessOptions {
            normalizer: Some(&map),
            ..Default::default()
        };
        assert!(postprocess_record(&mut rec, opts));
        assert_eq!(rec.term_pt, "ultrassonografia");
        assert_eq!(rec.status, Status::Ok);
        assert_eq!(rec.notes, NORMALIZED_NOTE);
        assert_eq!(rec.sources, vec![Source::DecsApi, Source::Normalizer]);
    }

    #[test]
    fn normalizer_keeps_keep_en_status() {
        let map = NormalizerMap::from_toml_str("[[replace]]\nto = \"X\"\nfrom = [\"x\"]\n").unwrap();
        let mut rec = record("x", "x", Status::KeepEn, Source::Rule, 1.0);
        let opts = PostprocessOptions {
            normalizer: Some(&map),
            ..Default::default()
        };
        postprocess_record(&mut rec, opts);
        assert_eq!(rec.term_pt, "X");
        assert_eq!(rec.status, Status::KeepEn);
    }

    #[test]
    fn override_replaces_record() {
        let mut table = OverrideTable::new();
        table.insert("ct", OverrideEntry::new("TC", "Override"));
        table.merge_rows(
            [CuratedRow {
                term_en: "Neuroradiology".into(),
                term_pt: "neurorradiologia".into(),
                source: GOLD_TAG.into(),
            }],
            true,
        );
        let opts = PostprocessOptions {
            overrides: Some(&table),
            ..Default::default()
        };

        let mut rec = record("CT", "CT", Status::KeepEn, Source::Rule, 1.0);
        assert!(postprocess_record(&mut rec, opts));
        assert_eq!(rec.term_pt, "TC");
        assert_eq!(rec.status, Status::Ok);
        assert_eq!(rec.sources, vec![Source::Override]);
        assert_eq!(rec.notes, "Override (Override)");

        let mut rec = record("neuroradiology", "neuroradiology", Status::NeedsReview, Source::None, 0.0);
        postprocess_record(&mut rec, opts);
        assert_eq!(rec.term_pt, "neurorradiologia");
        assert_eq!(rec.sources, vec![Source::OverrideManual]);
        assert!((rec.confidence - 0.99).abs() < 1e-9);
    }

    #[test]
    fn sanity_demotes_english_decs() {
        let generic = GenericTerms::default();
        let opts = PostprocessOptions {
            sanity: Some(&generic),
            ..Default::default()
        };
        let mut rec = record("brain tumor", "tumor of the brain", Status::Ok, Source::DecsApi, 0.92);
        assert!(postprocess_record(&mut rec, opts));
        assert_eq!(rec.status, Status::NeedsReview);
        assert_eq!(rec.confidence, SANITY_CONFIDENCE_CAP);
        assert_eq!(rec.notes, DECS_ENGLISH_NOTE);
    }

    #[test]
    fn sanity_demotes_generic_decs() {
        let generic = GenericTerms::from_terms(["chip"]);
        let opts = PostprocessOptions {
            sanity: Some(&generic),
            ..Default::default()
        };
        let mut rec = record("chip", "microchip", Status::Ok, Source::DecsApi, 0.92);
        postprocess_record(&mut rec, opts);
        assert_eq!(rec.status, Status::NeedsReview);
        assert_eq!(rec.notes, DECS_GENERIC_NOTE);
    }

    #[test]
    fn sanity_verbose_generic_takes_precedence() {
        let generic = GenericTerms::from_terms(["chip"]);
        let opts = PostprocessOptions {
            sanity: Some(&generic),
            ..Default::default()
        };
        let mut rec = record("chip", "circuito integrado de silício", Status::Ok, Source::DecsApi, 0.92);
        assert!(postprocess_record(&mut rec, opts));
        assert_eq!(rec.status, Status::NeedsReview);
        assert_eq!(rec.confidence, SANITY_CONFIDENCE_CAP);
        assert_eq!(rec.notes, DECS_VERBOSE_NOTE);
    }

    #[test]
    fn sanity_ignores_local_sources() {
        let generic = GenericTerms::from_terms(["chip"]);
        let opts = PostprocessOptions {
            sanity: Some(&generic),
            ..Default::default()
        };
        let mut rec = record("chip", "lasca", Status::Ok, Source::Dict, 0.95);
        assert!(!postprocess_record(&mut rec, opts));
        assert_eq!(rec.status, Status::Ok);
    }

    #[test]
    fn file_roundtrip_counts_changes() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        let output = dir.path().join("out/normalized.jsonl");
        let recs = [
            record("ultrasound", "ultrassom", Status::Ok, Source::DecsApi, 0.92),
            record("heart", "coração", Status::Ok, Source::Dict, 0.95),
        ];
        let body: String = recs.iter().map(|r| jsonl_line(r).unwrap()).collect();
        fs::write(&input, format!("{body}\nnot json\n")).unwrap();

        let map = NormalizerMap::from_toml_str(RULES).unwrap();
        let opts = PostprocessOptions {
            normalizer: Some(&map),
            ..Default::default()
        };
        let summary = postprocess_file(&input, &output, opts).unwrap();
        assert_eq!(summary, PostprocessSummary { total: 2, changed: 1 });
        let out = read_records(&output).unwrap();
        assert_eq!(out[0].term_pt, "ultrassonografia");
        assert_eq!(out[1].term_pt, "coração");
    }
}
