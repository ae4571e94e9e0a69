//! Identity and permutation kernels.
//!
//! A permuted view only swaps strides; the result is copied into standard
//! layout so later reshapes see contiguous data.

use ndarray::{ArrayD, ArrayViewD, IxDyn};

use super::{Element, unary_labels};
use crate::error::{EinsumError, EinsumResult};
use crate::notation::{EinsumNotation, Label};
use crate::pattern::{OperationKind, permutation_of};

/// `ijk->ijk`: returns the input unchanged.
///
/// The result is an owned copy, as every kernel returns an owned array.
pub fn identity<L: Label, T: Element>(
    notation: &EinsumNotation<L>,
    x: &ArrayViewD<'_, T>,
) -> EinsumResult<ArrayD<T>> {
    super::check(OperationKind::Identity, notation)?;
    Ok(x.to_owned())
}

/// `ijk->kij`: transposes the input into output order.
pub fn permute<L: Label, T: Element>(
    notation: &EinsumNotation<L>,
    x: &ArrayViewD<'_, T>,
) -> EinsumResult<ArrayD<T>> {
    super::check(OperationKind::Permutation, notation)?;

    let (ix, iy) = unary_labels(notation);
    let perm = permutation_of(ix, iy)
        .ok_or_else(|| EinsumError::contract_violation(OperationKind::Permutation, notation))?;

    Ok(permute_to_standard(x.view(), perm))
}

/// Applies `perm` to the axes of `x` and copies into standard layout.
pub(crate) fn permute_to_standard<T: Element>(x: ArrayViewD<'_, T>, perm: Vec<usize>) -> ArrayD<T> {
    if perm.iter().enumerate().all(|(axis, &p)| axis == p) {
        return x.to_owned();
    }
    x.permuted_axes(IxDyn(&perm)).as_standard_layout().into_owned()
}
