//! Large-file access layer for Duet.
//!
//! Serves random line reads over files that may be far larger than memory.
//! Both loaders build a [`LineOffsetIndex`] of line start offsets and then
//! answer reads through the [`LineSource`] trait:
//!
//! - [`ChunkedTextLoader`] -- reads fixed windows of lines on demand and keeps
//!   a bounded, least-recently-used set of them resident
//! - [`MappedTextLoader`] -- maps the file read-only and slices each line out
//!   of the mapping
//! - [`TextLoader`] -- picks one of the two by file size
//!
//! Dropping a loader closes its file handle or mapping.

pub mod chunked;
pub mod config;
pub mod error;
pub mod index;
pub mod mapped;
pub mod source;

pub use chunked::{Chunk, ChunkedTextLoader};
pub use config::AccessConfig;
pub use error::{AccessError, AccessErrorKind, AccessResult};
pub use index::{LineOffsetIndex, LineSpan};
pub use mapped::MappedTextLoader;
pub use source::{LineSource, TextLoader};
