use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::chunked::ChunkedTextLoader;
use crate::config::AccessConfig;
use crate::error::{AccessError, AccessResult};
use crate::mapped::MappedTextLoader;

/// Random access to the lines of a file.
///
/// Line numbers are zero-based. Implementations never materialize the whole
/// file; they are safe to share across threads.
pub trait LineSource: Send + Sync {
    /// Read one line without its terminator. Returns `Ok(None)` past the end.
    fn line(&self, line: usize) -> AccessResult<Option<String>>;

    /// Read up to `count` lines starting at `start`. The range is clamped to
    /// the lines available; a start past the end yields an empty vector.
    fn line_range(&self, start: usize, count: usize) -> AccessResult<Vec<String>>;

    /// Total number of lines. Builds the offset index on first use.
    fn total_line_count(&self) -> AccessResult<usize>;
}

impl<T: LineSource + ?Sized> LineSource for &T {
    fn line(&self, line: usize) -> AccessResult<Option<String>> {
        (**self).line(line)
    }

    fn line_range(&self, start: usize, count: usize) -> AccessResult<Vec<String>> {
        (**self).line_range(start, count)
    }

    fn total_line_count(&self) -> AccessResult<usize> {
        (**self).total_line_count()
    }
}

/// Either loader, chosen by file size.
#[derive(Debug)]
pub enum TextLoader {
    /// Windowed reads with a bounded set of resident chunks.
    Chunked(ChunkedTextLoader),
    /// Every line served straight from a read-only mapping.
    Mapped(MappedTextLoader),
}

impl TextLoader {
    /// Open `path`, mapping it when it is at least `mmap_threshold` bytes and
    /// no larger than `max_mapped_size`, and using the chunked loader
    /// otherwise.
    pub fn open(path: &Path, config: &AccessConfig) -> AccessResult<Self> {
        config.validate()?;
        let size = file_size(path)?;

        if size >= config.mmap_threshold && size <= config.max_mapped_size {
            debug!(path = %path.display(), size, "opening with memory-mapped loader");
            Ok(Self::Mapped(MappedTextLoader::open(path, config.max_mapped_size)?))
        } else {
            debug!(path = %path.display(), size, "opening with chunked loader");
            Ok(Self::Chunked(ChunkedTextLoader::open(path, config)?))
        }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        match self {
            Self::Chunked(l) => l.path(),
            Self::Mapped(l) => l.path(),
        }
    }

    /// Size of the underlying file at open time.
    pub fn file_size(&self) -> u64 {
        match self {
            Self::Chunked(l) => l.file_size(),
            Self::Mapped(l) => l.file_size(),
        }
    }

    /// Returns `true` if the file is served from a mapping.
    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }
}

impl LineSource for TextLoader {
    fn line(&self, line: usize) -> AccessResult<Option<String>> {
        match self {
            Self::Chunked(l) => l.line(line),
            Self::Mapped(l) => l.line(line),
        }
    }

    fn line_range(&self, start: usize, count: usize) -> AccessResult<Vec<String>> {
        match self {
            Self::Chunked(l) => l.line_range(start, count),
            Self::Mapped(l) => l.line_range(start, count),
        }
    }

    fn total_line_count(&self) -> AccessResult<usize> {
        match self {
            Self::Chunked(l) => l.total_line_count(),
            Self::Mapped(l) => l.total_line_count(),
        }
    }
}

/// Open a file for reading, translating a missing file into
/// [`AccessError::NotFound`].
pub(crate) fn open_file(path: &Path) -> AccessResult<(File, u64)> {
    let file = File::open(path).map_err(|e| not_found_or_io(e, path))?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

fn file_size(path: &Path) -> AccessResult<u64> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| not_found_or_io(e, path))
}

fn not_found_or_io(e: io::Error, path: &Path) -> AccessError {
    if e.kind() == io::ErrorKind::NotFound {
        AccessError::NotFound(PathBuf::from(path))
    } else {
        AccessError::Io(e)
    }
}
