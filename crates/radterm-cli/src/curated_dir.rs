//! Conventional layout of a directory holding the curated tables.

use std::path::{Path, PathBuf};

use radterm_core::curated::{
    CuratedError, GenericTerms, OverrideFile, OverrideTable, GOLD_FILE_NAME,
};

pub const OVERRIDES_FILE: &str = "overrides.csv";
pub const GENERIC_OVERRIDES_FILE: &str = "generic_overrides.csv";
pub const GENERIC_TERMS_FILE: &str = "generic_terms.csv";

/// Curated tables under one directory.
#[derive(Debug, Clone)]
pub struct CuratedDir {
    root: PathBuf,
}

impl CuratedDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Override files in merge order: gold first, then general and generic
    /// overrides.
    pub fn override_files(&self) -> Vec<OverrideFile> {
        [GOLD_FILE_NAME, OVERRIDES_FILE, GENERIC_OVERRIDES_FILE]
            .iter()
            .map(|name| OverrideFile::detect(self.root.join(name)))
            .collect()
    }

    pub fn overrides(&self) -> Result<OverrideTable, CuratedError> {
        OverrideTable::load(&self.override_files())
    }

    pub fn generic_terms(&self) -> Result<GenericTerms, CuratedError> {
        GenericTerms::load(&self.root.join(GENERIC_TERMS_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn gold_file_is_gold_only() {
        let dir = tempfile::tempdir().unwrap();
        let files = CuratedDir::new(dir.path()).override_files();
        assert_eq!(files.len(), 3);
        assert!(files[0].gold_only);
        assert!(!files[1].gold_only);
    }

    #[test]
    fn loads_merged_overrides() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(GOLD_FILE_NAME),
            "English_Term,Suggested_PT,Source\nanechoic,anecoico,Manual_Gold\nechoic,ecoico,Morpho_Fix\n",
        )
        .unwrap();
        fs::write(dir.path().join(OVERRIDES_FILE), "term_en,term_pt\nCT,TC\nanechoic,anecóide\n").unwrap();
        fs::write(dir.path().join(GENERIC_TERMS_FILE), "term_en\nchip\n").unwrap();

        let curated = CuratedDir::new(dir.path());
        let table = curated.overrides().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("anechoic").unwrap().term_pt, "anecoico");
        assert_eq!(table.get("ct").unwrap().term_pt, "TC");
        assert!(curated.generic_terms().unwrap().contains("Chip"));
    }
}
