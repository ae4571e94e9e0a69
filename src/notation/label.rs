//! Index labels.

use core::fmt;
use core::hash::Hash;

/// A token naming one tensor axis.
///
/// Equal labels denote the same logical index. Any small, ordered, hashable
/// value works: `char` for notation written by hand, integers for
/// generated networks.
pub trait Label: Copy + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> Label for T where T: Copy + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

/// Returns true if no label occurs twice in `labels`.
///
/// ```ignore
/// assert!(all_unique(&['i', 'j', 'k']));
/// assert!(!all_unique(&['i', 'j', 'i']));
/// ```
pub fn all_unique<L: PartialEq>(labels: &[L]) -> bool {
    labels
        .iter()
        .enumerate()
        .all(|(pos, l)| !labels[..pos].contains(l))
}

/// Returns the distinct labels of `labels` in first-appearance order.
pub fn unique_labels<L: Label>(labels: &[L]) -> Vec<L> {
    let mut seen = Vec::with_capacity(labels.len());
    for &l in labels {
        if !seen.contains(&l) {
            seen.push(l);
        }
    }
    seen
}

/// Returns true if `a` and `b` contain the same labels, ignoring order and multiplicity.
pub fn same_label_set<L: Label>(a: &[L], b: &[L]) -> bool {
    a.iter().all(|l| b.contains(l)) && b.iter().all(|l| a.contains(l))
}

/// Returns true if every label of `ix` also occurring in `iy` keeps its relative order.
///
/// `(i, j, k)` against `(i, k)` keeps order, against `(k, i)` it does not.
pub fn keeps_order<L: Label>(ix: &[L], iy: &[L]) -> bool {
    let shared: Vec<L> = ix.iter().copied().filter(|l| iy.contains(l)).collect();
    let in_output: Vec<L> = iy.iter().copied().filter(|l| ix.contains(l)).collect();
    shared == in_output
}
