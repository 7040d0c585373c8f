//! Line diff engine for Duet.
//!
//! Aligns two line sequences and reports the result either as a flat
//! [`Hunk`] of [`LineChange`]s or as a [`SideBySideTable`] with one
//! [`AlignmentRow`] per output line. [`StreamingDiff`] runs the same
//! alignment window by window over any [`duet_access::LineSource`].
//!
//! # Key Types
//!
//! - [`DiffAlgorithm`] / [`LineDiffer`] -- in-memory diffs
//! - [`Hunk`] / [`LineChange`] -- flat change list
//! - [`SideBySideTable`] / [`AlignmentRow`] -- two-column view with counts
//! - [`StreamingDiff`] / [`CancellationToken`] / [`Streamed`] -- windowed diffs

mod align;
pub mod algorithm;
pub mod error;
pub mod model;
mod reconcile;
pub mod streaming;

pub use algorithm::{compute_diff, compute_side_by_side, DiffAlgorithm, LineDiffer};
pub use error::{DiffError, DiffResult};
pub use model::{AlignmentRow, ChangeKind, Hunk, LineChange, SideBySideTable};
pub use streaming::{
    CancellationToken, Streamed, StreamingConfig, StreamingDiff, DEFAULT_WINDOW_SIZE,
};
