//! Offline stages around the engine: batch translation, post-processing of
//! record streams and the resolved-dictionary build.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::record::TranslationRecord;

pub mod batch;
pub mod builder;
pub mod postprocess;

pub use batch::{translate_batch, BatchOptions, BatchSummary};
pub use builder::{build_dictionary, BuildInputs, BuildSummary};
pub use postprocess::{postprocess_file, NormalizerMap, PostprocessOptions, PostprocessSummary};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("CSV error on {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("normalizer rules in {path}: {reason}")]
    Normalizer { path: PathBuf, reason: String },
    #[error(transparent)]
    Curated(#[from] crate::curated::CuratedError),
}

impl BuildError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a JSONL record stream. Blank lines are ignored and lines that do not
/// parse as a record are skipped with a warning.
pub fn read_records(path: &Path) -> Result<Vec<TranslationRecord>, BuildError> {
    let file = File::open(path).map_err(BuildError::io(path))?;
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(BuildError::io(path))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TranslationRecord>(&line) {
            Ok(rec) => records.push(rec),
            Err(e) => warn!(path = %path.display(), line = idx + 1, error = %e, "skipping malformed record"),
        }
    }
    Ok(records)
}

/// One JSON object per line, `\n`-terminated.
pub(crate) fn jsonl_line(record: &TranslationRecord) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    Ok(line)
}
