//! Edit-script alignment of two line sequences.
//!
//! `similar` produces the raw edit script. Each gap between equal runs is
//! then folded so that deleted and inserted lines at the same relative
//! position pair up as modifications. The result is kept in two forms: a
//! flat script for hunks and one tag stream per side for the side-by-side
//! reconciliation.

use similar::{Algorithm, DiffOp};

/// Per-line classification of one side of the alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tag {
    Unchanged,
    Deleted,
    Inserted,
    Modified,
}

/// One step of the folded edit script. Indices are zero-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Equal { old: usize, new: usize },
    Modified { old: usize, new: usize },
    Deleted { old: usize },
    Inserted { new: usize },
}

#[derive(Debug)]
pub(crate) struct Alignment {
    pub left: Vec<Tag>,
    pub right: Vec<Tag>,
    pub script: Vec<Step>,
}

pub(crate) fn align(algorithm: Algorithm, old: &[&str], new: &[&str]) -> Alignment {
    let ops = similar::capture_diff_slices(algorithm, old, new);

    let mut out = Alignment {
        left: vec![Tag::Unchanged; old.len()],
        right: vec![Tag::Unchanged; new.len()],
        script: Vec::with_capacity(old.len().max(new.len())),
    };
    let mut gap_old: Vec<usize> = Vec::new();
    let mut gap_new: Vec<usize> = Vec::new();

    for op in ops {
        match op {
            DiffOp::Equal {
                old_index,
                new_index,
                len,
            } => {
                flush_gap(&mut out, &mut gap_old, &mut gap_new);
                out.script.extend((0..len).map(|k| Step::Equal {
                    old: old_index + k,
                    new: new_index + k,
                }));
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => gap_old.extend(old_index..old_index + old_len),
            DiffOp::Insert {
                new_index, new_len, ..
            } => gap_new.extend(new_index..new_index + new_len),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                gap_old.extend(old_index..old_index + old_len);
                gap_new.extend(new_index..new_index + new_len);
            }
        }
    }
    flush_gap(&mut out, &mut gap_old, &mut gap_new);

    out
}

fn flush_gap(out: &mut Alignment, gap_old: &mut Vec<usize>, gap_new: &mut Vec<usize>) {
    let paired = gap_old.len().min(gap_new.len());

    for (&o, &n) in gap_old.iter().zip(gap_new.iter()) {
        out.left[o] = Tag::Modified;
        out.right[n] = Tag::Modified;
        out.script.push(Step::Modified { old: o, new: n });
    }
    for &o in &gap_old[paired..] {
        out.left[o] = Tag::Deleted;
        out.script.push(Step::Deleted { old: o });
    }
    for &n in &gap_new[paired..] {
        out.right[n] = Tag::Inserted;
        out.script.push(Step::Inserted { new: n });
    }

    gap_old.clear();
    gap_new.clear();
}
