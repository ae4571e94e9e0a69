//! Unary operation pattern detection.
//!
//! Each predicate is self-contained: it checks the single-input requirement
//! itself, so it can serve both as a classification rule and as the
//! precondition of the matching kernel.

use crate::notation::{EinsumNotation, Label, same_label_set};

/// Returns the sole input and the output labels of a unary notation.
fn unary_labels<L: Label>(notation: &EinsumNotation<L>) -> Option<(&[L], &[L])> {
    if !notation.is_unary() {
        return None;
    }
    Some((notation.inputs()[0].as_slice(), notation.output().as_slice()))
}

/// `ijk->ijk`: unique labels, output identical to the input.
///
/// Uniqueness separates the identity from diagonal projections like `ii->ii`.
pub fn is_identity<L: Label>(notation: &EinsumNotation<L>) -> bool {
    match unary_labels(notation) {
        Some((ix, iy)) => notation.inputs()[0].is_unique() && ix == iy,
        None => false,
    }
}

/// `ijk->kij`: unique labels, output a reordering of the input.
pub fn is_permutation<L: Label>(notation: &EinsumNotation<L>) -> bool {
    let Some((ix, iy)) = unary_labels(notation) else {
        return false;
    };

    notation.inputs()[0].is_unique()
        && ix.len() == iy.len()
        && ix != iy
        && ix.iter().all(|l| iy.contains(l))
}

/// `ii->`: a single matrix whose two axes carry the same label, scalar output.
pub fn is_trace<L: Label>(notation: &EinsumNotation<L>) -> bool {
    match unary_labels(notation) {
        Some((ix, iy)) => iy.is_empty() && ix.len() == 2 && ix[0] == ix[1],
        None => false,
    }
}

/// `ijkl->il`: unique labels on both sides, output a strict subset of the input.
pub fn is_sum<L: Label>(notation: &EinsumNotation<L>) -> bool {
    let Some((ix, iy)) = unary_labels(notation) else {
        return false;
    };

    notation.inputs()[0].is_unique()
        && notation.output().is_unique()
        && iy.len() < ix.len()
        && iy.iter().all(|l| ix.contains(l))
}

/// `ij->lijk`: unique labels on both sides, output a strict superset of the input.
pub fn is_repeat<L: Label>(notation: &EinsumNotation<L>) -> bool {
    let Some((ix, iy)) = unary_labels(notation) else {
        return false;
    };

    notation.inputs()[0].is_unique()
        && notation.output().is_unique()
        && iy.len() > ix.len()
        && ix.iter().all(|l| iy.contains(l))
}

/// `ijkj->ikj`: the input repeats a label, the output keeps every label once.
pub fn is_diag<L: Label>(notation: &EinsumNotation<L>) -> bool {
    let Some((ix, iy)) = unary_labels(notation) else {
        return false;
    };

    !notation.inputs()[0].is_unique()
        && notation.output().is_unique()
        && same_label_set(ix, iy)
}

/// `ikj->ijkj`: unique input labels, the output repeats some of them.
pub fn is_duplicate<L: Label>(notation: &EinsumNotation<L>) -> bool {
    let Some((ix, iy)) = unary_labels(notation) else {
        return false;
    };

    notation.inputs()[0].is_unique()
        && !notation.output().is_unique()
        && same_label_set(ix, iy)
}

/// Position in `ix` of every label of `iy`, i.e. the axis permutation that
/// turns a tensor labelled `ix` into one labelled `iy`.
///
/// `ij->ji` gives `[1, 0]`. Returns `None` if some label of `iy` is missing.
pub fn permutation_of<L: Label>(ix: &[L], iy: &[L]) -> Option<Vec<usize>> {
    iy.iter()
        .map(|l| ix.iter().position(|x| x == l))
        .collect()
}
