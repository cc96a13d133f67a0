mod lookup;

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Alternatives, VocabularyGate};

pub(super) const DICTIONARY_CSV: &str = "\
term_en,term_pt,status,domain,source,confidence,notes
anechoic,anecoico,ok,radiology,Manual_Gold,0.99,radiology_gold
11-dehydrocorticosterone,11-dehydrocorticosterone,keep_en,other,KeepEN,0.9,chemical/drug kept in English
ground glass,vidro fosco,ok,radiology,Manual_Gold,0.99,radiology_gold
lesion,lesão,ok,radiology,DeCS,0.92,
echo,echo,ok,radiology,Dict,0.95,
tumor,tumor of the brain,ok,other,DeCS,0.92,
opacity,opacity,needs_review,radiology,Normalized,0.5,
haze,,needs_review,other,Normalized,0.0,
cloudiness,,weird_status,other,Normalized,0.0,
CT,CT,keep_en,radiology,KeepEN,1.0,
nodule,nódulo,ambiguous,radiology,Dict,0.7,
mass,,untranslated,other,Normalized,0.0,
";

pub(super) struct Fixture {
    _dir: tempfile::TempDir,
    pub dict_path: PathBuf,
    pub log_path: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let dict_path = dir.path().join("dictionary_full.csv");
        fs::write(&dict_path, DICTIONARY_CSV).unwrap();
        let log_path = dir.path().join("needs_review_hits.jsonl");
        Self {
            _dir: dir,
            dict_path,
            log_path,
        }
    }

    pub fn gate(&self) -> VocabularyGate {
        VocabularyGate::open(&self.dict_path, &self.log_path)
            .unwrap()
            .with_alternatives(Alternatives::from_pairs([("haze", "opacity"), ("opacity", "ground glass")]))
    }

    pub fn audit_lines(&self) -> Vec<serde_json::Value> {
        read_lines(&self.log_path)
    }
}

pub(super) fn read_lines(path: &Path) -> Vec<serde_json::Value> {
    match fs::read_to_string(path) {
        Ok(text) => text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect(),
        Err(_) => Vec::new(),
    }
}
