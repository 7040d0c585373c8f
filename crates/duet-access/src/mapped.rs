//! Memory-mapped line loader.
//!
//! The whole file is mapped read-only and indexed eagerly. Each line read
//! slices the mapping using the offset index, so there is no chunk cache and
//! no locking beyond what the mapping provides.

use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::{debug, info};

use crate::config::DEFAULT_MAX_MAPPED_SIZE;
use crate::error::{AccessError, AccessResult};
use crate::index::{decode_line, LineOffsetIndex, LineSpan};
use crate::source::{open_file, LineSource};

/// Line loader backed by a read-only memory mapping.
pub struct MappedTextLoader {
    path: PathBuf,
    file_size: u64,
    /// `None` for empty files, which cannot be mapped portably.
    map: Option<Mmap>,
    index: LineOffsetIndex,
}

impl MappedTextLoader {
    /// Map `path`, refusing files larger than `max_size` bytes.
    pub fn open(path: &Path, max_size: u64) -> AccessResult<Self> {
        let (file, file_size) = open_file(path)?;

        if file_size > max_size {
            return Err(AccessError::FileTooLarge {
                path: path.to_path_buf(),
                size: file_size,
                max: max_size,
            });
        }

        if file_size == 0 {
            debug!(path = %path.display(), "empty file, skipping mapping");
            return Ok(Self {
                path: path.to_path_buf(),
                file_size,
                map: None,
                index: LineOffsetIndex::from_bytes(&[]),
            });
        }

        // SAFETY: the mapping is read-only and owned by this loader. Callers
        // must not truncate the file while the loader is alive.
        let map = unsafe { Mmap::map(&file)? };
        let index = LineOffsetIndex::from_bytes(&map);

        info!(
            path = %path.display(),
            file_size,
            lines = index.line_count(),
            "memory-mapped loader ready"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file_size,
            map: Some(map),
            index,
        })
    }

    /// Map `path` with the default 10 GiB size guard.
    pub fn open_default(path: &Path) -> AccessResult<Self> {
        Self::open(path, DEFAULT_MAX_MAPPED_SIZE)
    }

    /// Path of the mapped file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the mapped file.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Byte span of a line, terminator included. `None` past the end.
    pub fn line_span(&self, line: usize) -> Option<LineSpan> {
        self.index.span(line)
    }

    /// Length of a line in bytes, terminator included.
    pub fn line_length(&self, line: usize) -> Option<u64> {
        self.line_span(line).map(|s| s.len())
    }

    fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    fn read_line(&self, line: usize) -> Option<String> {
        let raw = self.index.span(line)?.slice(self.bytes(), 0)?;
        Some(decode_line(raw, line == 0))
    }
}

impl LineSource for MappedTextLoader {
    fn line(&self, line: usize) -> AccessResult<Option<String>> {
        Ok(self.read_line(line))
    }

    fn line_range(&self, start: usize, count: usize) -> AccessResult<Vec<String>> {
        let end = start.saturating_add(count).min(self.index.line_count());
        Ok((start..end).filter_map(|n| self.read_line(n)).collect())
    }

    fn total_line_count(&self) -> AccessResult<usize> {
        Ok(self.index.line_count())
    }
}

impl std::fmt::Debug for MappedTextLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedTextLoader")
            .field("path", &self.path)
            .field("file_size", &self.file_size)
            .field("lines", &self.index.line_count())
            .finish()
    }
}
