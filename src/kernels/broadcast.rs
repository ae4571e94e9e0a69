//! Broadcast (repeat) kernel.
//!
//! `ij->ikj`: the input is reordered to the output's label order, unit axes
//! are inserted for the new labels, and the view is broadcast to the sizes
//! given by the size map.

use ndarray::{ArrayD, ArrayViewD, Axis, ErrorKind, IxDyn, ShapeError};

use super::{Element, unary_labels};
use crate::error::{EinsumError, EinsumResult};
use crate::notation::{EinsumNotation, Label, SizeMap};
use crate::pattern::{OperationKind, permutation_of};

/// `ij->ikj`: broadcasts the input across the labels only the output carries.
pub fn repeat<L: Label, T: Element>(
    notation: &EinsumNotation<L>,
    x: &ArrayViewD<'_, T>,
    sizes: &SizeMap<L>,
) -> EinsumResult<ArrayD<T>> {
    super::check(OperationKind::Repeat, notation)?;

    let (ix, iy) = unary_labels(notation);
    let shape = sizes.shape_of(iy)?;

    let ordered: Vec<L> = iy.iter().copied().filter(|l| ix.contains(l)).collect();
    let perm = permutation_of(ix, &ordered)
        .ok_or_else(|| EinsumError::contract_violation(OperationKind::Repeat, notation))?;

    let mut view = x.view().permuted_axes(IxDyn(&perm));
    for (axis, label) in iy.iter().enumerate() {
        if !ix.contains(label) {
            view = view.insert_axis(Axis(axis));
        }
    }

    let broadcast = view
        .broadcast(IxDyn(&shape))
        .ok_or_else(|| ShapeError::from_kind(ErrorKind::IncompatibleShape))?;

    Ok(broadcast.to_owned())
}
