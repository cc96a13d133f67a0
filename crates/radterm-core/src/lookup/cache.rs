//! Lookup result caches.
//!
//! [`FileCache`] is an append-only log of framed entries:
//! `len: u32 LE | crc32: u32 LE | bincode(CacheEntry)`. The whole log is
//! replayed into memory on open, a later frame for the same term supersedes
//! an earlier one, and replay stops at the first truncated or corrupt frame.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Payload stored for an answered lookup that matched nothing.
pub const NOT_FOUND_PAYLOAD: &str = r#"{"error":"not_found"}"#;

const FRAME_HEADER: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Exact query string, not normalized.
    pub term_en: String,
    pub term_pt: Option<String>,
    /// Response JSON text the translation was extracted from.
    pub raw_payload: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

impl CacheEntry {
    pub fn new(term_en: &str, term_pt: Option<String>, raw_payload: String) -> Self {
        Self {
            term_en: term_en.to_string(),
            term_pt,
            raw_payload,
            timestamp: now_secs(),
        }
    }
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache IO error: {0}")]
    Io(#[from] io::Error),
    #[error("cache encode error: {0}")]
    Encode(#[from] bincode::Error),
}

/// Term → lookup outcome store shared by all lookup callers.
///
/// Implementations guarantee read-after-write per term within a process.
pub trait LookupCache: Send + Sync {
    fn get(&self, term_en: &str) -> Option<CacheEntry>;
    fn put(&self, entry: CacheEntry) -> Result<(), CacheError>;
    /// Push buffered writes to durable storage.
    fn flush(&self) -> Result<(), CacheError> {
        Ok(())
    }
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LookupCache for MemoryCache {
    fn get(&self, term_en: &str) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(term_en).cloned()
    }

    fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.term_en.clone(), entry);
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

struct FileCacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Kept open in append mode; opened on first write.
    writer: Option<BufWriter<File>>,
    /// Frames in the log, including superseded ones.
    frames: usize,
}

pub struct FileCache {
    path: PathBuf,
    inner: Mutex<FileCacheInner>,
}

/// Replay statistics for [`FileCache::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub frames: usize,
    pub entries: usize,
    /// Bytes after the last valid frame.
    pub trailing_bytes: usize,
}

impl FileCache {
    /// Open (or lazily create) the log at `path` and replay it.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let (entries, stats) = replay(path)?;
        if stats.trailing_bytes > 0 {
            warn!(
                path = %path.display(),
                trailing_bytes = stats.trailing_bytes,
                "cache log has a truncated or corrupt tail, ignoring it"
            );
        }
        debug!(path = %path.display(), frames = stats.frames, entries = stats.entries, "cache replayed");
        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(FileCacheInner {
                entries,
                writer: None,
                frames: stats.frames,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames in the log, including superseded ones.
    pub fn frame_count(&self) -> usize {
        self.inner.lock().unwrap().frames
    }

    /// Rewrite the log with one frame per term. Atomic: writes a `.tmp`
    /// sibling then renames it over the log.
    pub fn compact(&self) -> Result<usize, CacheError> {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        if let Some(mut w) = inner.writer.take() {
            w.flush()?;
        }
        let mut buf = Vec::new();
        let mut entries: Vec<&CacheEntry> = inner.entries.values().collect();
        entries.sort_by_key(|e| e.timestamp);
        for entry in &entries {
            encode_frame(&mut buf, entry)?;
        }
        let tmp = self.path.with_extension("tmp");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &buf)?;
        fs::rename(&tmp, &self.path)?;
        let count = entries.len();
        inner.frames = count;
        Ok(count)
    }
}

impl LookupCache for FileCache {
    fn get(&self, term_en: &str) -> Option<CacheEntry> {
        self.inner.lock().unwrap().entries.get(term_en).cloned()
    }

    fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let mut frame = Vec::new();
        encode_frame(&mut frame, &entry)?;

        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        if inner.writer.is_none() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            inner.writer = Some(BufWriter::new(f));
        }
        if let Some(w) = inner.writer.as_mut() {
            w.write_all(&frame)?;
        }
        inner.frames += 1;
        inner.entries.insert(entry.term_en.clone(), entry);
        Ok(())
    }

    fn flush(&self) -> Result<(), CacheError> {
        if let Some(w) = self.inner.lock().unwrap().writer.as_mut() {
            w.flush()?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }
}

impl Drop for FileCache {
    fn drop(&mut self) {
        if let Err(e) = LookupCache::flush(self) {
            warn!(path = %self.path.display(), error = %e, "failed to flush cache log");
        }
    }
}

fn encode_frame(buf: &mut Vec<u8>, entry: &CacheEntry) -> Result<(), CacheError> {
    let payload = bincode::serialize(entry)?;
    let length = payload.len() as u32;
    let crc = crc32fast::hash(&payload);
    buf.extend_from_slice(&length.to_le_bytes());
    buf.extend_from_slice(&crc.to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(())
}

fn replay(path: &Path) -> Result<(HashMap<String, CacheEntry>, ReplayStats), CacheError> {
    let mut entries = HashMap::new();
    let data = match fs::read(path) {
        Ok(d) => d,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let stats = ReplayStats {
                frames: 0,
                entries: 0,
                trailing_bytes: 0,
            };
            return Ok((entries, stats));
        }
        Err(e) => return Err(e.into()),
    };

    let mut frames = 0;
    let mut pos = 0;
    while pos + FRAME_HEADER <= data.len() {
        let length = read_u32(&data[pos..pos + 4]) as usize;
        let expected_crc = read_u32(&data[pos + 4..pos + 8]);

        if length == 0 || pos + FRAME_HEADER + length > data.len() {
            break; // truncated frame
        }

        let payload = &data[pos + FRAME_HEADER..pos + FRAME_HEADER + length];
        if crc32fast::hash(payload) != expected_crc {
            break; // corrupt frame
        }

        match bincode::deserialize::<CacheEntry>(payload) {
            Ok(entry) => {
                entries.insert(entry.term_en.clone(), entry);
                frames += 1;
            }
            Err(_) => break, // corrupt payload
        }

        pos += FRAME_HEADER + length;
    }

    let stats = ReplayStats {
        frames,
        entries: entries.len(),
        trailing_bytes: data.len() - pos,
    };
    Ok((entries, stats))
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    u32::from_le_bytes(word)
}
