//! Append-only JSONL log of unresolved lookups.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use radterm_core::{Domain, Status};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

use crate::{GateError, LookupResult};

/// One audit line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry<'a> {
    pub term_en: &'a str,
    pub term_out: &'a str,
    pub status: Status,
    pub domain: Domain,
    pub source: &'a str,
    pub notes: &'a str,
    pub context: &'a str,
    /// UTC, RFC 3339.
    pub timestamp: String,
}

fn utc_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// The file is opened lazily in append mode; each entry is written with one
/// `write_all` under the lock so concurrent appends never interleave.
pub struct AuditLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, res: &LookupResult, context: &str) -> Result<(), GateError> {
        let entry = AuditEntry {
            term_en: &res.term_en,
            term_out: &res.term_out,
            status: res.status,
            domain: res.domain,
            source: &res.source,
            notes: &res.notes,
            context,
            timestamp: utc_timestamp(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let io_err = |source| GateError::Io {
            path: self.path.clone(),
            source,
        };
        let mut guard = self.file.lock().expect("audit lock poisoned");
        if guard.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(io_err)?;
            *guard = Some(file);
        }
        if let Some(file) = guard.as_mut() {
            file.write_all(line.as_bytes()).map_err(io_err)?;
        }
        debug!(term = %res.term_en, "audit entry appended");
        Ok(())
    }
}
