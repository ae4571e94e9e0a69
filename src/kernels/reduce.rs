//! Reduction kernels.
//!
//! - Trace: `ii->`, sum of the diagonal of a matrix
//! - Sum: `ijk->ki`, reduction over every label missing from the output

use ndarray::{ArrayD, ArrayViewD, Axis, Ix2, IxDyn};

use super::permute::permute_to_standard;
use super::{Element, unary_labels};
use crate::error::{EinsumError, EinsumResult};
use crate::notation::{EinsumNotation, Label, keeps_order};
use crate::pattern::{OperationKind, permutation_of};

/// `ii->`: returns a rank-0 tensor holding the sum of the diagonal.
pub fn trace<L: Label, T: Element>(
    notation: &EinsumNotation<L>,
    x: &ArrayViewD<'_, T>,
) -> EinsumResult<ArrayD<T>> {
    super::check(OperationKind::Trace, notation)?;

    let matrix = x.view().into_dimensionality::<Ix2>()?;
    let total = matrix.diag().sum();

    Ok(ArrayD::from_elem(IxDyn(&[]), total))
}

/// `ijk->ki`: sums out the dropped labels, then orders the kept axes like the output.
pub fn sum<L: Label, T: Element>(
    notation: &EinsumNotation<L>,
    x: &ArrayViewD<'_, T>,
) -> EinsumResult<ArrayD<T>> {
    super::check(OperationKind::Sum, notation)?;

    let (ix, iy) = unary_labels(notation);

    // Highest axis first so the remaining positions stay valid.
    let mut dropped = ix
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, label)| !iy.contains(label))
        .map(|(axis, _)| Axis(axis));

    let first = dropped
        .next()
        .ok_or_else(|| EinsumError::contract_violation(OperationKind::Sum, notation))?;
    let reduced = dropped.fold(x.sum_axis(first), |acc, axis| acc.sum_axis(axis));

    if keeps_order(ix, iy) {
        return Ok(reduced);
    }

    let kept: Vec<L> = ix.iter().copied().filter(|l| iy.contains(l)).collect();
    let perm = permutation_of(&kept, iy)
        .ok_or_else(|| EinsumError::contract_violation(OperationKind::Sum, notation))?;

    Ok(permute_to_standard(reduced.view(), perm))
}
