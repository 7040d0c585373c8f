//! Merge of the per-side tag streams into a single row-per-line table.
//!
//! Both cursors walk their stream independently. At each step the first
//! matching rule below decides which row is emitted and which cursors move:
//!
//! 1. left exhausted: right-only `Added`
//! 2. right exhausted: left-only `Deleted`
//! 3. both `Unchanged`: paired `Unchanged`
//! 4. both `Modified`: paired `Modified`
//! 5. left `Deleted`: left-only `Deleted`
//! 6. right `Inserted`: right-only `Added`
//! 7. anything else: paired `Unchanged`, both cursors advance
//!
//! Rule 7 only fires on tag combinations the aligner does not produce. It
//! guarantees termination: every step advances at least one cursor.

use tracing::trace;

use crate::align::Tag;
use crate::model::{AlignmentRow, ChangeKind, SideBySideTable};

/// One side of a window: its text, its tags, and the zero-based line number
/// of its first line in the whole input.
pub(crate) struct Side<'a> {
    pub lines: &'a [&'a str],
    pub tags: &'a [Tag],
    pub offset: usize,
}

impl Side<'_> {
    fn number(&self, idx: usize) -> usize {
        self.offset + idx + 1
    }
}

pub(crate) fn reconcile(table: &mut SideBySideTable, left: &Side<'_>, right: &Side<'_>) {
    let (mut l, mut r) = (0usize, 0usize);

    while l < left.tags.len() || r < right.tags.len() {
        if l >= left.tags.len() {
            table.push(AlignmentRow::right_only(right.number(r), right.lines[r]));
            r += 1;
            continue;
        }
        if r >= right.tags.len() {
            table.push(AlignmentRow::left_only(left.number(l), left.lines[l]));
            l += 1;
            continue;
        }

        match (left.tags[l], right.tags[r]) {
            (Tag::Unchanged, Tag::Unchanged) => {
                table.push(paired(left, right, l, r, ChangeKind::Unchanged));
                l += 1;
                r += 1;
            }
            (Tag::Modified, Tag::Modified) => {
                table.push(paired(left, right, l, r, ChangeKind::Modified));
                l += 1;
                r += 1;
            }
            (Tag::Deleted, _) => {
                table.push(AlignmentRow::left_only(left.number(l), left.lines[l]));
                l += 1;
            }
            (_, Tag::Inserted) => {
                table.push(AlignmentRow::right_only(right.number(r), right.lines[r]));
                r += 1;
            }
            (lt, rt) => {
                trace!(left = ?lt, right = ?rt, "mismatched tags, pairing as unchanged");
                table.push(paired(left, right, l, r, ChangeKind::Unchanged));
                l += 1;
                r += 1;
            }
        }
    }

    table.old_lines += left.tags.len();
    table.new_lines += right.tags.len();
}

fn paired(left: &Side<'_>, right: &Side<'_>, l: usize, r: usize, kind: ChangeKind) -> AlignmentRow {
    AlignmentRow::paired(
        left.number(l),
        right.number(r),
        left.lines[l],
        right.lines[r],
        kind,
    )
}
