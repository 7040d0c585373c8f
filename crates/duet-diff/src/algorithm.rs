//! In-memory line diffs.

use serde::{Deserialize, Serialize};

use crate::align::{align, Step};
use crate::model::{Hunk, LineChange, SideBySideTable};
use crate::reconcile::{reconcile, Side};

/// A line differ: produces flat hunks and side-by-side tables.
pub trait LineDiffer {
    /// Flat, ordered change list covering both inputs.
    fn compute_diff<S: AsRef<str>>(&self, old: &[S], new: &[S]) -> Hunk;

    /// One row per output line with left and right columns.
    fn compute_side_by_side<S: AsRef<str>>(&self, old: &[S], new: &[S]) -> SideBySideTable;
}

/// The alignment algorithm used to build the edit script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffAlgorithm {
    /// Myers' O(ND) shortest edit script.
    #[default]
    Myers,
    /// Patience diff; anchors on lines unique to both sides.
    Patience,
    /// Classic longest common subsequence. Quadratic memory.
    Lcs,
}

impl DiffAlgorithm {
    fn as_similar(self) -> similar::Algorithm {
        match self {
            Self::Myers => similar::Algorithm::Myers,
            Self::Patience => similar::Algorithm::Patience,
            Self::Lcs => similar::Algorithm::Lcs,
        }
    }

    /// Diff one window and append its rows to `table`. `old_offset` and
    /// `new_offset` are the zero-based positions of the window's first lines.
    pub(crate) fn side_by_side_into<S: AsRef<str>>(
        self,
        table: &mut SideBySideTable,
        old: &[S],
        new: &[S],
        old_offset: usize,
        new_offset: usize,
    ) {
        let old: Vec<&str> = old.iter().map(AsRef::as_ref).collect();
        let new: Vec<&str> = new.iter().map(AsRef::as_ref).collect();
        let alignment = align(self.as_similar(), &old, &new);

        reconcile(
            table,
            &Side {
                lines: &old,
                tags: &alignment.left,
                offset: old_offset,
            },
            &Side {
                lines: &new,
                tags: &alignment.right,
                offset: new_offset,
            },
        );
    }

    /// Diff one window and append its changes to `hunk`.
    pub(crate) fn diff_into<S: AsRef<str>>(
        self,
        hunk: &mut Hunk,
        old: &[S],
        new: &[S],
        old_offset: usize,
        new_offset: usize,
    ) {
        let old: Vec<&str> = old.iter().map(AsRef::as_ref).collect();
        let new: Vec<&str> = new.iter().map(AsRef::as_ref).collect();
        let alignment = align(self.as_similar(), &old, &new);

        hunk.changes
            .extend(alignment.script.iter().map(|step| match *step {
                Step::Equal { old: o, new: n } => {
                    LineChange::unchanged(old[o], old_offset + o + 1, new_offset + n + 1)
                }
                Step::Modified { old: o, new: n } => LineChange::modified(
                    old[o],
                    new[n],
                    old_offset + o + 1,
                    new_offset + n + 1,
                ),
                Step::Deleted { old: o } => LineChange::deleted(old[o], old_offset + o + 1),
                Step::Inserted { new: n } => LineChange::added(new[n], new_offset + n + 1),
            }));
    }
}

impl LineDiffer for DiffAlgorithm {
    fn compute_diff<S: AsRef<str>>(&self, old: &[S], new: &[S]) -> Hunk {
        let mut hunk = Hunk::new(old.len(), new.len());
        self.diff_into(&mut hunk, old, new, 0, 0);
        hunk
    }

    fn compute_side_by_side<S: AsRef<str>>(&self, old: &[S], new: &[S]) -> SideBySideTable {
        let mut table = SideBySideTable::new();
        self.side_by_side_into(&mut table, old, new, 0, 0);
        table
    }
}

/// Compute a flat diff with the default algorithm.
pub fn compute_diff<S: AsRef<str>>(old: &[S], new: &[S]) -> Hunk {
    DiffAlgorithm::default().compute_diff(old, new)
}

/// Compute a side-by-side table with the default algorithm.
pub fn compute_side_by_side<S: AsRef<str>>(old: &[S], new: &[S]) -> SideBySideTable {
    DiffAlgorithm::default().compute_side_by_side(old, new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeKind;
    use proptest::prelude::*;

    const NO_LINES: [&str; 0] = [];

    fn kinds(table: &SideBySideTable) -> Vec<ChangeKind> {
        table.rows().iter().map(|r| r.kind).collect()
    }

    // ---- flat diff

    #[test]
    fn identical_inputs_are_unchanged() {
        let lines = ["one", "two", "three"];
        let hunk = compute_diff(&lines, &lines);
        assert!(hunk.is_unchanged());
        assert_eq!(hunk.changes.len(), 3);
        assert_eq!(hunk.old_count, 3);
        assert_eq!(hunk.new_count, 3);
    }

    #[test]
    fn empty_old_side_is_all_added() {
        let hunk = compute_diff(&NO_LINES, &["a", "b"]);
        assert_eq!(hunk.additions(), 2);
        assert_eq!(hunk.changes[1].new_line, Some(2));
        assert_eq!(hunk.changes[1].old_line, None);
    }

    #[test]
    fn empty_new_side_is_all_deleted() {
        let hunk = compute_diff(&["a", "b"], &NO_LINES);
        assert_eq!(hunk.deletions(), 2);
    }

    #[test]
    fn both_empty_produce_nothing() {
        let hunk = compute_diff(&NO_LINES, &NO_LINES);
        assert!(hunk.changes.is_empty());
        assert!(compute_side_by_side(&NO_LINES, &NO_LINES).is_empty());
    }

    #[test]
    fn substitution_is_reported_as_modified() {
        let hunk = compute_diff(&["a", "b", "c"], &["a", "B", "c"]);
        assert_eq!(hunk.modifications(), 1);
        let change = &hunk.changes[1];
        assert_eq!(change.kind, ChangeKind::Modified);
        assert_eq!(change.content, "B");
        assert_eq!(change.old_content.as_deref(), Some("b"));
        assert_eq!(change.old_line, Some(2));
        assert_eq!(change.new_line, Some(2));
    }

    #[test]
    fn hunk_reconstructs_inputs() {
        let old = ["alpha", "beta", "gamma", "delta"];
        let new = ["alpha", "gamma", "epsilon", "delta", "zeta"];
        let hunk = compute_diff(&old, &new);
        assert_eq!(hunk.old_lines(), old);
        assert_eq!(hunk.new_lines(), new);
    }

    #[test]
    fn accepts_empty_strings_and_unicode() {
        let old = ["", "héllo", "日本"];
        let new = ["", "héllo", "中文", ""];
        let hunk = compute_diff(&old, &new);
        assert_eq!(hunk.old_lines(), old);
        assert_eq!(hunk.new_lines(), new);
    }

    #[test]
    fn every_algorithm_reconstructs_inputs() {
        let old = ["a", "b", "c", "a", "b", "b", "a"];
        let new = ["c", "b", "a", "b", "a", "c"];
        for algorithm in [DiffAlgorithm::Myers, DiffAlgorithm::Patience, DiffAlgorithm::Lcs] {
            let hunk = algorithm.compute_diff(&old, &new);
            assert_eq!(hunk.old_lines(), old, "{algorithm:?}");
            assert_eq!(hunk.new_lines(), new, "{algorithm:?}");
        }
    }

    // ---- side by side

    #[test]
    fn side_by_side_single_substitution() {
        let table = compute_side_by_side(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(
            kinds(&table),
            vec![ChangeKind::Unchanged, ChangeKind::Modified, ChangeKind::Unchanged]
        );
        assert_eq!(table.modified(), 1);
        assert_eq!(table.rows()[1].left, "b");
        assert_eq!(table.rows()[1].right, "x");
    }

    #[test]
    fn side_by_side_insertion_in_middle() {
        let table = compute_side_by_side(&["a", "c"], &["a", "b", "c"]);
        assert_eq!(
            kinds(&table),
            vec![ChangeKind::Unchanged, ChangeKind::Added, ChangeKind::Unchanged]
        );
        let added = &table.rows()[1];
        assert_eq!(added.left_line, None);
        assert_eq!(added.right_line, Some(2));
        assert_eq!(added.left, "");
        assert_eq!(table.rows()[2].left_line, Some(2));
        assert_eq!(table.rows()[2].right_line, Some(3));
    }

    #[test]
    fn side_by_side_deletion_then_insertion_surplus() {
        let table = compute_side_by_side(&["a", "b", "c", "d"], &["a", "x", "d"]);
        assert_eq!(
            kinds(&table),
            vec![
                ChangeKind::Unchanged,
                ChangeKind::Modified,
                ChangeKind::Deleted,
                ChangeKind::Unchanged
            ]
        );
        assert_eq!(table.total_changes(), 2);
        assert_eq!(table.old_lines, 4);
        assert_eq!(table.new_lines, 3);
    }

    #[test]
    fn side_by_side_all_added() {
        let table = compute_side_by_side(&NO_LINES, &["a", "b", "c"]);
        assert_eq!(table.added(), 3);
        assert!(table.rows().iter().all(|r| r.left_line.is_none()));
    }

    // ---- properties

    /// Old lines are "o{i}"; the new side replaces a subset of positions with
    /// values that never occur on the old side.
    fn substitutions() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
        proptest::collection::vec(any::<bool>(), 0..60).prop_map(|flips| {
            let old: Vec<String> = (0..flips.len()).map(|i| format!("o{i}")).collect();
            let new = flips
                .iter()
                .enumerate()
                .map(|(i, flip)| if *flip { format!("n{i}") } else { format!("o{i}") })
                .collect();
            (old, new)
        })
    }

    proptest! {
        #[test]
        fn flat_diff_reconstructs_both_sides(
            old in proptest::collection::vec("[a-d]{0,2}", 0..40),
            new in proptest::collection::vec("[a-d]{0,2}", 0..40),
        ) {
            let hunk = compute_diff(&old, &new);
            prop_assert_eq!(hunk.old_lines(), old.iter().map(String::as_str).collect::<Vec<_>>());
            prop_assert_eq!(hunk.new_lines(), new.iter().map(String::as_str).collect::<Vec<_>>());
        }

        #[test]
        fn identical_sides_are_all_unchanged(
            lines in proptest::collection::vec("[a-d]{0,2}", 0..40),
        ) {
            let hunk = compute_diff(&lines, &lines);
            prop_assert!(hunk.is_unchanged());
            prop_assert_eq!(hunk.changes.len(), lines.len());

            let table = compute_side_by_side(&lines, &lines);
            prop_assert_eq!(table.len(), lines.len());
            prop_assert_eq!(table.total_changes(), 0);
        }

        #[test]
        fn one_empty_side_is_all_added_or_deleted(
            lines in proptest::collection::vec("[a-d]{0,2}", 0..40),
        ) {
            let none: Vec<String> = Vec::new();

            let added = compute_diff(&none, &lines);
            prop_assert_eq!(added.changes.len(), lines.len());
            prop_assert_eq!(added.additions(), lines.len());

            let deleted = compute_diff(&lines, &none);
            prop_assert_eq!(deleted.changes.len(), lines.len());
            prop_assert_eq!(deleted.deletions(), lines.len());

            let table = compute_side_by_side(&none, &lines);
            prop_assert_eq!(table.added(), lines.len());
            prop_assert_eq!(table.len(), lines.len());
        }

        #[test]
        fn side_by_side_covers_every_line_once(
            old in proptest::collection::vec("[a-d]{0,2}", 0..40),
            new in proptest::collection::vec("[a-d]{0,2}", 0..40),
        ) {
            let table = compute_side_by_side(&old, &new);
            let lefts: Vec<usize> = table.rows().iter().filter_map(|r| r.left_line).collect();
            let rights: Vec<usize> = table.rows().iter().filter_map(|r| r.right_line).collect();
            prop_assert_eq!(lefts, (1..=old.len()).collect::<Vec<_>>());
            prop_assert_eq!(rights, (1..=new.len()).collect::<Vec<_>>());
            prop_assert!(table.rows().iter().all(|r| r.left_line.is_some() || r.right_line.is_some()));
            prop_assert!(table.len() >= old.len().max(new.len()));
            prop_assert!(table.len() <= old.len() + new.len());
        }

        #[test]
        fn substitutions_keep_row_count((old, new) in substitutions()) {
            let table = compute_side_by_side(&old, &new);
            prop_assert_eq!(table.len(), old.len());
            let flipped = old.iter().zip(&new).filter(|(o, n)| o != n).count();
            prop_assert_eq!(table.modified(), flipped);
            prop_assert_eq!(table.total_changes(), flipped);
        }
    }
}
