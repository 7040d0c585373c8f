//! Chunked line loader.
//!
//! The file is split into fixed windows of `chunk_size` lines. A window is
//! read in one seek + read when first touched and kept in a bounded resident
//! set; the least recently used window is evicted when the set is full.
//!
//! Physical reads go through a single mutex-guarded file handle, so at most
//! one read is in flight per loader. Resident hits only take the shared side
//! of the chunk map lock and bump an atomic recency tick.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info, warn};

use crate::config::AccessConfig;
use crate::error::{AccessError, AccessResult};
use crate::index::{decode_line, LineOffsetIndex};
use crate::source::{open_file, LineSource};

/// Approximate bytes of memory per byte of line text.
const LINE_SIZE_FACTOR: u64 = 2;

/// Buffer size used for the index scan.
const SCAN_READER_CAPACITY: usize = 64 * 1024;

/// A contiguous window of decoded lines.
#[derive(Debug)]
pub struct Chunk {
    lines: Vec<String>,
    estimated_size: u64,
}

impl Chunk {
    fn new(lines: Vec<String>) -> Self {
        let estimated_size = lines
            .iter()
            .map(|l| l.len() as u64 * LINE_SIZE_FACTOR)
            .sum();
        Self {
            lines,
            estimated_size,
        }
    }

    /// The lines in this window, in file order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Approximate memory held by this window.
    pub fn estimated_size(&self) -> u64 {
        self.estimated_size
    }
}

/// A resident chunk together with its last-use tick.
#[derive(Debug)]
struct ResidentChunk {
    chunk: Arc<Chunk>,
    last_used: AtomicU64,
}

/// Lifecycle of the lazily built offset index.
#[derive(Debug)]
enum IndexState {
    Pending,
    Ready(Arc<LineOffsetIndex>),
    Failed(String),
}

/// Line loader that keeps a bounded number of line windows in memory.
#[derive(Debug)]
pub struct ChunkedTextLoader {
    path: PathBuf,
    file_size: u64,
    chunk_size: usize,
    max_resident: usize,
    index: RwLock<IndexState>,
    chunks: RwLock<HashMap<usize, ResidentChunk>>,
    /// Single-writer lock: held for the duration of every physical read.
    reader: Mutex<File>,
    tick: AtomicU64,
    memory: AtomicU64,
}

impl ChunkedTextLoader {
    /// Open `path` with the chunk geometry from `config`.
    ///
    /// The offset index is not built until a line or the line count is
    /// first requested.
    pub fn open(path: &Path, config: &AccessConfig) -> AccessResult<Self> {
        config.validate()?;
        let (file, file_size) = open_file(path)?;

        debug!(
            path = %path.display(),
            file_size,
            chunk_size = config.chunk_size,
            max_resident = config.max_resident_chunks,
            "chunked loader opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file_size,
            chunk_size: config.chunk_size,
            max_resident: config.max_resident_chunks,
            index: RwLock::new(IndexState::Pending),
            chunks: RwLock::new(HashMap::new()),
            reader: Mutex::new(file),
            tick: AtomicU64::new(0),
            memory: AtomicU64::new(0),
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File size recorded at open time.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Lines per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Approximate memory held by resident chunks. Diagnostic only.
    pub fn estimated_memory_usage(&self) -> u64 {
        self.memory.load(Ordering::Relaxed)
    }

    /// Number of chunks currently resident.
    pub fn resident_chunks(&self) -> usize {
        self.chunks.read().expect("chunk lock poisoned").len()
    }

    /// Drop every resident chunk. The offset index is kept.
    pub fn clear_cache(&self) {
        let mut chunks = self.chunks.write().expect("chunk lock poisoned");
        chunks.clear();
        self.memory.store(0, Ordering::Relaxed);
    }

    /// Return the offset index, building it on first use.
    fn index(&self) -> AccessResult<Arc<LineOffsetIndex>> {
        if let Some(index) = self.ready_index()? {
            return Ok(index);
        }

        let mut file = self.reader.lock().expect("reader lock poisoned");
        // Another caller may have finished the build while we waited.
        if let Some(index) = self.ready_index()? {
            return Ok(index);
        }

        let built = file.seek(SeekFrom::Start(0)).and_then(|_| {
            LineOffsetIndex::scan(BufReader::with_capacity(SCAN_READER_CAPACITY, &mut *file))
        });

        let mut state = self.index.write().expect("index lock poisoned");
        match built {
            Ok(index) => {
                let index = Arc::new(index);
                info!(
                    path = %self.path.display(),
                    lines = index.line_count(),
                    "chunked loader index ready"
                );
                *state = IndexState::Ready(Arc::clone(&index));
                Ok(index)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "index build failed");
                *state = IndexState::Failed(e.to_string());
                Err(AccessError::Io(e))
            }
        }
    }

    fn ready_index(&self) -> AccessResult<Option<Arc<LineOffsetIndex>>> {
        match &*self.index.read().expect("index lock poisoned") {
            IndexState::Ready(index) => Ok(Some(Arc::clone(index))),
            IndexState::Failed(reason) => Err(AccessError::Unusable {
                path: self.path.clone(),
                reason: reason.clone(),
            }),
            IndexState::Pending => Ok(None),
        }
    }

    /// Look up a resident chunk and mark it most recently used.
    fn resident(&self, number: usize) -> Option<Arc<Chunk>> {
        let chunks = self.chunks.read().expect("chunk lock poisoned");
        chunks.get(&number).map(|resident| {
            let now = self.tick.fetch_add(1, Ordering::Relaxed) + 1;
            resident.last_used.store(now, Ordering::Relaxed);
            Arc::clone(&resident.chunk)
        })
    }

    fn load_chunk(&self, number: usize, index: &LineOffsetIndex) -> AccessResult<Arc<Chunk>> {
        if let Some(chunk) = self.resident(number) {
            return Ok(chunk);
        }

        let mut file = self.reader.lock().expect("reader lock poisoned");
        if let Some(chunk) = self.resident(number) {
            return Ok(chunk);
        }

        let chunk = match self.read_chunk(&mut file, number, index) {
            Ok(chunk) => Arc::new(chunk),
            Err(e) => {
                if let AccessError::Io(io) = &e {
                    *self.index.write().expect("index lock poisoned") =
                        IndexState::Failed(io.to_string());
                }
                return Err(e);
            }
        };
        drop(file);

        self.insert_chunk(number, Arc::clone(&chunk));
        Ok(chunk)
    }

    fn read_chunk(
        &self,
        file: &mut File,
        number: usize,
        index: &LineOffsetIndex,
    ) -> AccessResult<Chunk> {
        let first = number * self.chunk_size;
        let count = self.chunk_size.min(index.line_count().saturating_sub(first));
        let span = index.range_span(first, count).ok_or_else(|| {
            AccessError::invalid("chunk", format!("chunk {number} is past the end of file"))
        })?;
        let len = usize::try_from(span.len()).map_err(|_| {
            AccessError::invalid("chunk_size", "chunk does not fit in addressable memory")
        })?;

        file.seek(SeekFrom::Start(span.start()))?;
        let mut bytes = vec![0u8; len];
        file.read_exact(&mut bytes)?;

        let mut lines = Vec::with_capacity(count);
        for line in first..first + count {
            let raw = index
                .span(line)
                .and_then(|s| s.slice(&bytes, span.start()))
                .unwrap_or_default();
            lines.push(decode_line(raw, line == 0));
        }

        debug!(chunk = number, first, lines = count, bytes = len, "chunk loaded");
        Ok(Chunk::new(lines))
    }

    fn insert_chunk(&self, number: usize, chunk: Arc<Chunk>) {
        let mut chunks = self.chunks.write().expect("chunk lock poisoned");

        while chunks.len() >= self.max_resident {
            let victim = chunks
                .iter()
                .min_by_key(|(_, r)| r.last_used.load(Ordering::Relaxed))
                .map(|(n, _)| *n);
            match victim {
                Some(n) => {
                    chunks.remove(&n);
                    debug!(chunk = n, "evicted least recently used chunk");
                }
                None => break,
            }
        }

        let now = self.tick.fetch_add(1, Ordering::Relaxed) + 1;
        chunks.insert(
            number,
            ResidentChunk {
                chunk,
                last_used: AtomicU64::new(now),
            },
        );

        let total = chunks.values().map(|r| r.chunk.estimated_size).sum();
        self.memory.store(total, Ordering::Relaxed);
    }
}

impl LineSource for ChunkedTextLoader {
    fn line(&self, line: usize) -> AccessResult<Option<String>> {
        let index = self.index()?;
        if line >= index.line_count() {
            return Ok(None);
        }
        let chunk = self.load_chunk(line / self.chunk_size, &index)?;
        Ok(chunk.lines.get(line % self.chunk_size).cloned())
    }

    fn line_range(&self, start: usize, count: usize) -> AccessResult<Vec<String>> {
        let index = self.index()?;
        let total = index.line_count();
        if start >= total || count == 0 {
            return Ok(Vec::new());
        }

        let end = start.saturating_add(count).min(total);
        let mut lines = Vec::with_capacity(end - start);
        let mut current = start;

        while current < end {
            let number = current / self.chunk_size;
            let chunk = self.load_chunk(number, &index)?;
            let offset = current % self.chunk_size;
            let take = (end - current).min(chunk.lines.len().saturating_sub(offset));
            if take == 0 {
                break;
            }
            lines.extend_from_slice(&chunk.lines[offset..offset + take]);
            current += take;
        }

        Ok(lines)
    }

    fn total_line_count(&self) -> AccessResult<usize> {
        Ok(self.index()?.line_count())
    }
}

impl Drop for ChunkedTextLoader {
    fn drop(&mut self) {
        if let Ok(chunks) = self.chunks.get_mut() {
            chunks.clear();
        }
        debug!(path = %self.path.display(), "chunked loader closed");
    }
}
