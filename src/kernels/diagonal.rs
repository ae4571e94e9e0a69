//! Diagonal kernels.
//!
//! - Diag: `iij->ji`, extracts the hyper-diagonal along repeated input labels
//! - Duplicate: `ij->iji`, writes the input along the diagonal of repeated
//!   output labels; every other cell is zero

use ndarray::{ArrayD, ArrayViewD, IxDyn};
use smallvec::SmallVec;

use super::{Element, unary_labels};
use crate::error::{EinsumError, EinsumResult};
use crate::notation::{EinsumNotation, Label, SizeMap};
use crate::pattern::{OperationKind, permutation_of};

/// `iij->ji`: one output axis per distinct input label.
pub fn diag<L: Label, T: Element>(
    notation: &EinsumNotation<L>,
    x: &ArrayViewD<'_, T>,
    sizes: &SizeMap<L>,
) -> EinsumResult<ArrayD<T>> {
    super::check(OperationKind::Diag, notation)?;

    let (ix, iy) = unary_labels(notation);
    let shape = sizes.shape_of(iy)?;

    // For every input axis, the output axis carrying its label.
    let source = permutation_of(iy, ix)
        .ok_or_else(|| EinsumError::contract_violation(OperationKind::Diag, notation))?;

    let mut index: SmallVec<[usize; 8]> = SmallVec::from_elem(0, ix.len());
    let y = ArrayD::from_shape_fn(IxDyn(&shape), |out| {
        for (slot, &axis) in index.iter_mut().zip(&source) {
            *slot = out[axis];
        }
        x[&index[..]]
    });

    Ok(y)
}

/// `ij->iji`: the inverse of [`diag`], zero away from the diagonal.
pub fn duplicate<L: Label, T: Element>(
    notation: &EinsumNotation<L>,
    x: &ArrayViewD<'_, T>,
    sizes: &SizeMap<L>,
) -> EinsumResult<ArrayD<T>> {
    super::check(OperationKind::Duplicate, notation)?;

    let (ix, iy) = unary_labels(notation);
    let shape = sizes.shape_of(iy)?;

    // For every output axis, the input axis carrying its label.
    let source = permutation_of(ix, iy)
        .ok_or_else(|| EinsumError::contract_violation(OperationKind::Duplicate, notation))?;

    let mut y = ArrayD::zeros(IxDyn(&shape));
    let mut index: SmallVec<[usize; 8]> = SmallVec::from_elem(0, iy.len());
    for (at, &value) in x.indexed_iter() {
        for (slot, &axis) in index.iter_mut().zip(&source) {
            *slot = at[axis];
        }
        y[&index[..]] = value;
    }

    Ok(y)
}
