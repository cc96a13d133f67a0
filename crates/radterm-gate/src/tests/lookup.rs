use std::fs;
use std::sync::Arc;
use std::thread;

use radterm_core::{Domain, Status};

use super::Fixture;
use crate::{Alternatives, Dictionary, GateError, VocabularyGate, NOT_FOUND_NOTE, NOT_FOUND_SOURCE};

#[test]
fn ok_returns_translation() {
    let fx = Fixture::new();
    let res = fx.gate().lookup("anechoic").unwrap();
    assert_eq!(res.status, Status::Ok);
    assert_eq!(res.term_out, "anecoico");
    assert_eq!(res.domain, Domain::Radiology);
    assert!(fx.audit_lines().is_empty());
}

#[test]
fn keep_en_returns_input_verbatim() {
    let fx = Fixture::new();
    let gate = fx.gate();
    let res = gate.lookup("11-dehydrocorticosterone").unwrap();
    assert_eq!(res.status, Status::KeepEn);
    assert_eq!(res.term_out, "11-dehydrocorticosterone");

    let res = gate.lookup("11 dehydrocorticosterone").unwrap();
    assert_eq!(res.status, Status::KeepEn);
    assert_eq!(res.term_out, "11 dehydrocorticosterone");
}

#[test]
fn variants_match_plural_and_separators() {
    let fx = Fixture::new();
    let gate = fx.gate();
    assert_eq!(gate.resolve("Lesions").term_out, "lesão");
    assert_eq!(gate.resolve("ground-glass").term_out, "vidro fosco");
    assert_eq!(gate.resolve("Ground_Glass").term_out, "vidro fosco");
}

#[test]
fn unknown_term_is_audited() {
    let fx = Fixture::new();
    let res = fx.gate().lookup("chip").unwrap();
    assert_eq!(res.status, Status::NeedsReview);
    assert_eq!(res.term_out, "chip");
    assert_eq!(res.source, NOT_FOUND_SOURCE);
    assert_eq!(res.notes, NOT_FOUND_NOTE);
    assert_eq!(res.domain, Domain::Other);

    let lines = fx.audit_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["term_en"], "chip");
    assert_eq!(lines[0]["status"], "needs_review");
    assert_eq!(lines[0]["context"], "chip");
    let ts = lines[0]["timestamp"].as_str().unwrap();
    assert!(ts.ends_with('Z'), "UTC timestamp expected, got {ts}");
}

#[test]
fn resolve_does_not_audit() {
    let fx = Fixture::new();
    let res = fx.gate().resolve("chip");
    assert_eq!(res.status, Status::NeedsReview);
    assert!(!fx.log_path.exists());
}

#[test]
fn stale_rows_are_demoted() {
    let fx = Fixture::new();
    let gate = fx.gate();

    let res = gate.resolve("echo");
    assert_eq!(res.status, Status::NeedsReview);
    assert_eq!(res.notes, "pt_eq_en_demoted");
    assert_eq!(res.term_out, "echo");

    let res = gate.resolve("tumor");
    assert_eq!(res.status, Status::NeedsReview);
    assert_eq!(res.notes, "mostly_english_demoted");
    assert_eq!(res.term_out, "tumor");
}

#[test]
fn alternative_used_when_resolved() {
    let fx = Fixture::new();
    let res = fx.gate().resolve("opacity");
    assert_eq!(res.status, Status::Ok);
    assert_eq!(res.term_out, "vidro fosco");
    assert_eq!(res.notes, "substitute:ground glass");
    assert_eq!(res.source, "Manual_Gold");
}

#[test]
fn unresolved_alternative_is_ignored() {
    let fx = Fixture::new();
    let res = fx.gate().resolve("haze");
    assert_eq!(res.status, Status::NeedsReview);
    assert_eq!(res.term_out, "haze");
    assert_eq!(res.notes, "");
}

#[test]
fn unknown_status_reads_as_needs_review() {
    let fx = Fixture::new();
    let res = fx.gate().resolve("cloudiness");
    assert_eq!(res.status, Status::NeedsReview);
}

#[test]
fn missing_dictionary_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = VocabularyGate::open(&dir.path().join("missing.csv"), dir.path().join("log.jsonl"))
        .err()
        .unwrap();
    assert!(matches!(err, GateError::DictionaryNotFound(_)));
}

#[test]
fn alternatives_csv_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alternatives.csv");
    fs::write(&path, "term_en,alternative_en\nHaze,Opacity\nblank,\n").unwrap();
    let alts = Alternatives::load(&path).unwrap();
    assert_eq!(alts.len(), 1);
    assert_eq!(alts.get("haze"), Some("opacity"));
    assert!(Alternatives::load(&dir.path().join("none.csv")).unwrap().is_empty());
}

#[test]
fn dictionary_skips_rows_without_term() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("d.csv");
    fs::write(&path, "term_en,term_pt,status\n,x,ok\nliver,fígado,ok\n").unwrap();
    let dict = Dictionary::load(&path).unwrap();
    assert_eq!(dict.len(), 1);
    let entry = dict.find("Liver").unwrap();
    assert_eq!(entry.source, "Normalized");
    assert_eq!(entry.confidence, 0.0);
}

#[test]
fn concurrent_audit_appends_do_not_interleave() {
    let fx = Fixture::new();
    let gate = Arc::new(fx.gate());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                for j in 0..25 {
                    gate.lookup(&format!("unknown{i}x{j}")).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(fx.audit_lines().len(), 100);
}

#[test]
fn bare_ambiguous_row_falls_back_for_review() {
    let fx = Fixture::new();
    let res = fx.gate().lookup("nodule").unwrap();
    assert_eq!(res.status, Status::NeedsReview);
    assert_eq!(res.term_out, "nodule");
    assert_eq!(res.source, "Dict");

    let lines = fx.audit_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["term_en"], "nodule");
    assert_eq!(lines[0]["status"], "needs_review");
    assert_eq!(lines[0]["context"], "nodule");
}

#[test]
fn bare_untranslated_row_falls_back_for_review() {
    let fx = Fixture::new();
    let gate = fx.gate();
    let res = gate.lookup_in_context("Mass", "large mass").unwrap();
    assert_eq!(res.status, Status::NeedsReview);
    assert_eq!(res.term_out, "Mass");

    let lines = fx.audit_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["term_en"], "Mass");
    assert_eq!(lines[0]["context"], "large mass");
}

#[test]
fn ambiguous_row_uses_resolved_alternative() {
    let fx = Fixture::new();
    let gate = fx
        .gate()
        .with_alternatives(Alternatives::from_pairs([("nodule", "lesion")]));
    let res = gate.lookup("nodule").unwrap();
    assert_eq!(res.status, Status::Ok);
    assert_eq!(res.term_out, "lesão");
    assert!(fx.audit_lines().is_empty());
}
