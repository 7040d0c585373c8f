//! Windowed diffs over [`LineSource`]s.
//!
//! Both inputs are consumed in windows of at most `window_size` lines. Each
//! window pair is aligned on its own and its output is appended with the
//! window start offsets folded into every line number, so memory stays
//! bounded by the window size rather than the file size.
//!
//! Changes that straddle a window boundary are aligned per window; a line
//! moved across the boundary shows up as a deletion in one window and an
//! insertion in another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use duet_access::LineSource;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algorithm::DiffAlgorithm;
use crate::error::{DiffError, DiffResult};
use crate::model::{Hunk, SideBySideTable};

/// Default number of lines pulled from each side per window.
pub const DEFAULT_WINDOW_SIZE: usize = 5_000;

/// Streaming diff configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Lines per window, per side. Must be non-zero.
    pub window_size: usize,
    /// Alignment algorithm applied to each window.
    pub algorithm: DiffAlgorithm,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            algorithm: DiffAlgorithm::default(),
        }
    }
}

impl StreamingConfig {
    /// Reject configurations that cannot make progress.
    pub fn validate(&self) -> DiffResult<()> {
        if self.window_size == 0 {
            return Err(DiffError::InvalidArgument {
                name: "window_size",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

/// Shared cancellation flag, checked once per window.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Output of a streaming run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Streamed<T> {
    /// Everything produced before the run stopped.
    pub output: T,
    /// `true` if the run stopped early because of cancellation.
    pub cancelled: bool,
    /// Number of window pairs processed.
    pub windows: usize,
    /// Old lines consumed.
    pub old_consumed: usize,
    /// New lines consumed.
    pub new_consumed: usize,
}

/// Windowed diff driver.
#[derive(Clone, Debug)]
pub struct StreamingDiff {
    config: StreamingConfig,
}

impl StreamingDiff {
    /// Create a driver; fails if the window size is zero.
    pub fn new(config: StreamingConfig) -> DiffResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Side-by-side table of two sources.
    pub fn compute_side_by_side<L, R>(
        &self,
        old: &L,
        new: &R,
        cancel: &CancellationToken,
    ) -> DiffResult<Streamed<SideBySideTable>>
    where
        L: LineSource + ?Sized,
        R: LineSource + ?Sized,
    {
        let algorithm = self.config.algorithm;
        let mut table = SideBySideTable::new();
        let run = self.run(old, new, cancel, |o, n, old_offset, new_offset| {
            algorithm.side_by_side_into(&mut table, o, n, old_offset, new_offset)
        })?;
        Ok(run.with_output(table))
    }

    /// Flat change list of two sources.
    pub fn compute_diff<L, R>(
        &self,
        old: &L,
        new: &R,
        cancel: &CancellationToken,
    ) -> DiffResult<Streamed<Hunk>>
    where
        L: LineSource + ?Sized,
        R: LineSource + ?Sized,
    {
        let algorithm = self.config.algorithm;
        let mut hunk = Hunk::new(0, 0);
        let run = self.run(old, new, cancel, |o, n, old_offset, new_offset| {
            algorithm.diff_into(&mut hunk, o, n, old_offset, new_offset)
        })?;
        hunk.old_count = run.old_consumed;
        hunk.new_count = run.new_consumed;
        Ok(run.with_output(hunk))
    }

    fn run<L, R, F>(
        &self,
        old: &L,
        new: &R,
        cancel: &CancellationToken,
        mut visit: F,
    ) -> DiffResult<Streamed<()>>
    where
        L: LineSource + ?Sized,
        R: LineSource + ?Sized,
        F: FnMut(&[String], &[String], usize, usize),
    {
        let window = self.config.window_size;
        let old_total = old.total_line_count()?;
        let new_total = new.total_line_count()?;

        let mut state = Streamed {
            output: (),
            cancelled: false,
            windows: 0,
            old_consumed: 0,
            new_consumed: 0,
        };

        while state.old_consumed < old_total || state.new_consumed < new_total {
            if cancel.is_cancelled() {
                info!(
                    windows = state.windows,
                    old_consumed = state.old_consumed,
                    new_consumed = state.new_consumed,
                    "streaming diff cancelled"
                );
                state.cancelled = true;
                break;
            }

            let old_window = old.line_range(state.old_consumed, window)?;
            let new_window = new.line_range(state.new_consumed, window)?;
            if old_window.is_empty() && new_window.is_empty() {
                // Sources shrank below their reported totals.
                break;
            }

            visit(&old_window[..], &new_window[..], state.old_consumed, state.new_consumed);

            state.old_consumed += old_window.len();
            state.new_consumed += new_window.len();
            state.windows += 1;

            debug!(
                window = state.windows,
                old_lines = old_window.len(),
                new_lines = new_window.len(),
                "processed window"
            );
        }

        debug!(
            windows = state.windows,
            old_total,
            new_total,
            cancelled = state.cancelled,
            "streaming diff finished"
        );
        Ok(state)
    }
}

impl Streamed<()> {
    fn with_output<T>(self, output: T) -> Streamed<T> {
        Streamed {
            output,
            cancelled: self.cancelled,
            windows: self.windows,
            old_consumed: self.old_consumed,
            new_consumed: self.new_consumed,
        }
    }
}
