//! Result types for line diffs.

use serde::{Deserialize, Serialize};

/// Classification of a line or alignment row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Present and identical on both sides.
    Unchanged,
    /// Present only on the new side.
    Added,
    /// Present only on the old side.
    Deleted,
    /// Present on both sides with different content.
    Modified,
    /// Moved without changing. Line alignment never produces this; it is
    /// counted for tables assembled by structural views.
    Reordered,
}

impl ChangeKind {
    /// Returns `true` for every kind except [`ChangeKind::Unchanged`].
    pub fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// A single line in a [`Hunk`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineChange {
    /// How the line changed.
    pub kind: ChangeKind,
    /// The line text. For `Modified` this is the new text.
    pub content: String,
    /// The replaced text of a `Modified` line.
    pub old_content: Option<String>,
    /// 1-based line number on the old side, if the line exists there.
    pub old_line: Option<usize>,
    /// 1-based line number on the new side, if the line exists there.
    pub new_line: Option<usize>,
}

impl LineChange {
    pub(crate) fn unchanged(content: &str, old_line: usize, new_line: usize) -> Self {
        Self {
            kind: ChangeKind::Unchanged,
            content: content.to_owned(),
            old_content: None,
            old_line: Some(old_line),
            new_line: Some(new_line),
        }
    }

    pub(crate) fn added(content: &str, new_line: usize) -> Self {
        Self {
            kind: ChangeKind::Added,
            content: content.to_owned(),
            old_content: None,
            old_line: None,
            new_line: Some(new_line),
        }
    }

    pub(crate) fn deleted(content: &str, old_line: usize) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            content: content.to_owned(),
            old_content: None,
            old_line: Some(old_line),
            new_line: None,
        }
    }

    pub(crate) fn modified(old: &str, new: &str, old_line: usize, new_line: usize) -> Self {
        Self {
            kind: ChangeKind::Modified,
            content: new.to_owned(),
            old_content: Some(old.to_owned()),
            old_line: Some(old_line),
            new_line: Some(new_line),
        }
    }

    /// The text this change contributes to the old side, if any.
    pub fn old_text(&self) -> Option<&str> {
        match self.kind {
            ChangeKind::Unchanged | ChangeKind::Deleted | ChangeKind::Reordered => {
                Some(&self.content)
            }
            ChangeKind::Modified => self.old_content.as_deref(),
            ChangeKind::Added => None,
        }
    }

    /// The text this change contributes to the new side, if any.
    pub fn new_text(&self) -> Option<&str> {
        match self.kind {
            ChangeKind::Deleted => None,
            _ => Some(&self.content),
        }
    }
}

/// An ordered run of line changes and the line ranges it covers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// First old line covered (1-based).
    pub old_start: usize,
    /// Number of old lines covered.
    pub old_count: usize,
    /// First new line covered (1-based).
    pub new_start: usize,
    /// Number of new lines covered.
    pub new_count: usize,
    /// The changes, in output order.
    pub changes: Vec<LineChange>,
}

impl Hunk {
    pub(crate) fn new(old_count: usize, new_count: usize) -> Self {
        Self {
            old_start: 1,
            old_count,
            new_start: 1,
            new_count,
            changes: Vec::with_capacity(old_count.max(new_count)),
        }
    }

    /// Returns `true` if every change is `Unchanged`.
    pub fn is_unchanged(&self) -> bool {
        self.changes.iter().all(|c| !c.kind.is_change())
    }

    /// Number of added lines.
    pub fn additions(&self) -> usize {
        self.count(ChangeKind::Added)
    }

    /// Number of deleted lines.
    pub fn deletions(&self) -> usize {
        self.count(ChangeKind::Deleted)
    }

    /// Number of modified lines.
    pub fn modifications(&self) -> usize {
        self.count(ChangeKind::Modified)
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }

    /// Rebuild the old side from the changes.
    pub fn old_lines(&self) -> Vec<&str> {
        self.changes.iter().filter_map(LineChange::old_text).collect()
    }

    /// Rebuild the new side from the changes.
    pub fn new_lines(&self) -> Vec<&str> {
        self.changes.iter().filter_map(LineChange::new_text).collect()
    }
}

/// One row of a two-column diff view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentRow {
    /// 1-based old line number, absent for added rows.
    pub left_line: Option<usize>,
    /// 1-based new line number, absent for deleted rows.
    pub right_line: Option<usize>,
    /// Old text (empty when `left_line` is absent).
    pub left: String,
    /// New text (empty when `right_line` is absent).
    pub right: String,
    /// Row classification.
    pub kind: ChangeKind,
}

impl AlignmentRow {
    pub(crate) fn paired(
        left_line: usize,
        right_line: usize,
        left: &str,
        right: &str,
        kind: ChangeKind,
    ) -> Self {
        Self {
            left_line: Some(left_line),
            right_line: Some(right_line),
            left: left.to_owned(),
            right: right.to_owned(),
            kind,
        }
    }

    pub(crate) fn left_only(line: usize, text: &str) -> Self {
        Self {
            left_line: Some(line),
            right_line: None,
            left: text.to_owned(),
            right: String::new(),
            kind: ChangeKind::Deleted,
        }
    }

    pub(crate) fn right_only(line: usize, text: &str) -> Self {
        Self {
            left_line: None,
            right_line: Some(line),
            left: String::new(),
            right: text.to_owned(),
            kind: ChangeKind::Added,
        }
    }
}

/// Row-per-line side-by-side diff with running counts per kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideBySideTable {
    rows: Vec<AlignmentRow>,
    /// Number of old lines the table covers.
    pub old_lines: usize,
    /// Number of new lines the table covers.
    pub new_lines: usize,
    added: usize,
    deleted: usize,
    modified: usize,
    reordered: usize,
}

impl SideBySideTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row and update the counters.
    ///
    /// Rows with neither line number are ignored.
    pub fn push(&mut self, row: AlignmentRow) {
        if row.left_line.is_none() && row.right_line.is_none() {
            return;
        }
        match row.kind {
            ChangeKind::Added => self.added += 1,
            ChangeKind::Deleted => self.deleted += 1,
            ChangeKind::Modified => self.modified += 1,
            ChangeKind::Reordered => self.reordered += 1,
            ChangeKind::Unchanged => {}
        }
        self.rows.push(row);
    }

    /// Move every row of `other` onto the end of this table.
    pub fn extend(&mut self, other: SideBySideTable) {
        self.old_lines += other.old_lines;
        self.new_lines += other.new_lines;
        for row in other.rows {
            self.push(row);
        }
    }

    /// Remove all rows and reset the counters.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The rows in display order.
    pub fn rows(&self) -> &[AlignmentRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of `Added` rows.
    pub fn added(&self) -> usize {
        self.added
    }

    /// Number of `Deleted` rows.
    pub fn deleted(&self) -> usize {
        self.deleted
    }

    /// Number of `Modified` rows.
    pub fn modified(&self) -> usize {
        self.modified
    }

    /// Number of `Reordered` rows.
    pub fn reordered(&self) -> usize {
        self.reordered
    }

    /// Total rows that are not `Unchanged`.
    pub fn total_changes(&self) -> usize {
        self.added + self.deleted + self.modified + self.reordered
    }

    /// Iterate over rows that carry a change.
    pub fn changed_rows(&self) -> impl Iterator<Item = &AlignmentRow> {
        self.rows.iter().filter(|r| r.kind.is_change())
    }
}
