//! Batch translation of a term list into an append-only JSONL record stream.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::{debug, debug_span, info, warn};

use super::{jsonl_line, BuildError};
use crate::engine::Engine;
use crate::record::{Status, TranslationRecord};
use crate::text::is_unchanged;

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Continue an interrupted run instead of truncating the output.
    pub resume: bool,
    /// Stop after this many terms (counted after the resume skip).
    pub max_terms: Option<usize>,
}

/// Counts over the records written by one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Terms skipped because an earlier run already wrote them.
    pub skipped: usize,
    pub processed: usize,
    pub status_counts: BTreeMap<&'static str, usize>,
    pub type_counts: BTreeMap<&'static str, usize>,
    pub ok_changed: usize,
    /// Should always be zero; anything else is an engine bug.
    pub ok_unchanged: usize,
}

impl BatchSummary {
    fn record(&mut self, rec: &TranslationRecord) {
        self.processed += 1;
        *self.status_counts.entry(rec.status.as_str()).or_default() += 1;
        *self.type_counts.entry(rec.type_guess.as_str()).or_default() += 1;
        if rec.status == Status::Ok {
            if is_unchanged(&rec.term_en, &rec.term_pt) {
                self.ok_unchanged += 1;
            } else {
                self.ok_changed += 1;
            }
        }
    }
}

/// Terms from a newline-delimited file, one per line. Only the line ending
/// is stripped; blank lines are kept so ids match input line numbers.
pub fn read_terms(path: &Path) -> Result<Vec<String>, BuildError> {
    let file = File::open(path).map_err(BuildError::io(path))?;
    BufReader::new(file)
        .lines()
        .map(|line| {
            line.map(|l| l.trim_end_matches('\r').to_string())
                .map_err(BuildError::io(path))
        })
        .collect()
}

/// Number of terms an earlier run already covered: the larger of the
/// non-empty line count and the highest record id. Missing output ⇒ 0.
pub fn resume_point(output: &Path) -> Result<usize, BuildError> {
    let file = match File::open(output) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(BuildError::io(output)(e)),
    };
    let mut lines = 0usize;
    let mut last_id = 0u64;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(BuildError::io(output))?;
        if line.trim().is_empty() {
            continue;
        }
        lines += 1;
        match serde_json::from_str::<serde_json::Value>(&line) {
            Ok(v) => {
                if let Some(id) = v.get("id").and_then(|id| id.as_u64()) {
                    last_id = last_id.max(id);
                }
            }
            Err(e) => warn!(line = lines, error = %e, "unparseable line in resumed output"),
        }
    }
    Ok(lines.max(last_id as usize))
}

/// Translate `terms` and append one record per term to `output`.
///
/// Record ids are 1-based positions in `terms`, so a resumed run continues
/// the numbering of the interrupted one. Each record is written with a
/// single call so an interruption leaves at most one partial line.
pub fn translate_batch(
    engine: &Engine,
    terms: &[String],
    output: &Path,
    options: BatchOptions,
) -> Result<BatchSummary, BuildError> {
    let _span = debug_span!("translate_batch", total = terms.len()).entered();

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
    }

    let start = if options.resume {
        resume_point(output)?.min(terms.len())
    } else {
        match fs::remove_file(output) {
            Ok(()) => debug!(path = %output.display(), "removed previous output"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(BuildError::io(output)(e)),
        }
        0
    };

    let remaining = &terms[start..];
    let todo = match options.max_terms {
        Some(n) => &remaining[..n.min(remaining.len())],
        None => remaining,
    };

    let mut out = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output)
        .map_err(BuildError::io(output))?;

    let mut summary = BatchSummary {
        skipped: start,
        ..BatchSummary::default()
    };
    for (i, term) in todo.iter().enumerate() {
        let id = (start + i + 1) as u64;
        let rec = engine.translate(term, id);
        let line = jsonl_line(&rec).map_err(|source| BuildError::Json {
            path: output.to_path_buf(),
            source,
        })?;
        out.write_all(line.as_bytes())
            .map_err(BuildError::io(output))?;
        summary.record(&rec);
    }
    out.flush().map_err(BuildError::io(output))?;

    info!(
        skipped = summary.skipped,
        processed = summary.processed,
        ok_unchanged = summary.ok_unchanged,
        "batch complete"
    );
    Ok(summary)
}
