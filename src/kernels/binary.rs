//! Pairwise contraction kernel.
//!
//! Both inputs are transposed so their labels line up as
//! `A[l.., i.., j..]` and `B[l.., j.., k..]`, then fused into rank-3
//! operands `A(L, I, J)` and `B(L, J, K)`. The [`BinaryPattern`] picks the
//! dense primitive computing `C(L, I, K)`, which is split back into labels
//! and transposed into output order.

use ndarray::linalg::general_mat_mul;
use ndarray::{Array1, Array3, ArrayD, ArrayView1, ArrayViewD, Axis, CowArray, Ix3, IxDyn, s};

use super::Element;
use super::permute::permute_to_standard;
use crate::error::{EinsumError, EinsumResult};
use crate::notation::{EinsumNotation, Label, SizeMap};
use crate::pattern::{BinaryPattern, OperationKind, analyze_binary, permutation_of};

/// Contracts two tensors with the primitive selected by their label groups.
pub fn simple_binary<L: Label, T: Element>(
    notation: &EinsumNotation<L>,
    a: &ArrayViewD<'_, T>,
    b: &ArrayViewD<'_, T>,
    sizes: &SizeMap<L>,
) -> EinsumResult<ArrayD<T>> {
    super::check(OperationKind::SimpleBinary, notation)?;

    let violation = || EinsumError::contract_violation(OperationKind::SimpleBinary, notation);
    let analysis = analyze_binary(notation).ok_or_else(violation)?;

    let batch = group_size(sizes, &analysis.batch)?;
    let left = group_size(sizes, &analysis.left)?;
    let contracted = group_size(sizes, &analysis.contracted)?;
    let right = group_size(sizes, &analysis.right)?;

    let inputs = notation.inputs();
    let a_perm = permutation_of(inputs[0].as_slice(), &analysis.lhs_order()).ok_or_else(violation)?;
    let b_perm = permutation_of(inputs[1].as_slice(), &analysis.rhs_order()).ok_or_else(violation)?;
    let c_order = analysis.result_order();
    let c_perm = permutation_of(&c_order, notation.output().as_slice()).ok_or_else(violation)?;

    log::trace!(
        "{} as {} with (L, I, J, K) = ({}, {}, {}, {})",
        notation,
        analysis.pattern.name(),
        batch,
        left,
        contracted,
        right
    );

    let a3 = fuse(a, a_perm, (batch, left, contracted))?;
    let b3 = fuse(b, b_perm, (batch, contracted, right))?;
    let c3 = contract(analysis.pattern, &a3, &b3);

    unfuse(c3, &sizes.shape_of(&c_order)?, c_perm)
}

fn group_size<L: Label>(sizes: &SizeMap<L>, labels: &[L]) -> EinsumResult<usize> {
    labels.iter().map(|&l| sizes.size_of(l)).product()
}

/// Transposes `x` by `perm` and reshapes it to rank 3.
fn fuse<'a, T: Element>(
    x: &'a ArrayViewD<'_, T>,
    perm: Vec<usize>,
    shape: (usize, usize, usize),
) -> EinsumResult<CowArray<'a, T, Ix3>> {
    let permuted = x.view().permuted_axes(IxDyn(&perm));

    let fused = if permuted.is_standard_layout() {
        CowArray::from(permuted.into_shape_with_order(shape)?)
    } else {
        CowArray::from(
            permuted
                .as_standard_layout()
                .into_owned()
                .into_shape_with_order(shape)?,
        )
    };
    Ok(fused)
}

/// Computes `C(L, I, K)` from `A(L, I, J)` and `B(L, J, K)`.
///
/// Unbatched patterns have `L = 1` and work on the single matrix slice.
fn contract<T: Element>(
    pattern: BinaryPattern,
    a: &CowArray<'_, T, Ix3>,
    b: &CowArray<'_, T, Ix3>,
) -> Array3<T> {
    match pattern {
        BinaryPattern::Dot => {
            let x: ArrayView1<'_, T> = a.slice(s![0, 0, ..]);
            let y: ArrayView1<'_, T> = b.slice(s![0, .., 0]);
            Array3::from_elem((1, 1, 1), x.dot(&y))
        }
        BinaryPattern::MatVec => {
            let v: ArrayView1<'_, T> = b.slice(s![0, .., 0]);
            let c: Array1<T> = a.index_axis(Axis(0), 0).dot(&v);
            c.insert_axis(Axis(0)).insert_axis(Axis(2))
        }
        BinaryPattern::VecMat => {
            let v: ArrayView1<'_, T> = a.slice(s![0, 0, ..]);
            let c: Array1<T> = v.dot(&b.index_axis(Axis(0), 0));
            c.insert_axis(Axis(0)).insert_axis(Axis(1))
        }
        BinaryPattern::MatMul => a
            .index_axis(Axis(0), 0)
            .dot(&b.index_axis(Axis(0), 0))
            .insert_axis(Axis(0)),
        BinaryPattern::BatchedMatMul => {
            let (batch, left, _) = a.dim();
            let (_, _, right) = b.dim();

            let mut c = Array3::zeros((batch, left, right));
            for l in 0..batch {
                let mut cl = c.index_axis_mut(Axis(0), l);
                general_mat_mul(
                    T::one(),
                    &a.index_axis(Axis(0), l),
                    &b.index_axis(Axis(0), l),
                    T::zero(),
                    &mut cl,
                );
            }
            c
        }
        // No contracted label: J = 1 and `(L, I, 1) * (L, 1, K)` broadcasts.
        BinaryPattern::Scalar
        | BinaryPattern::ScaleLeft
        | BinaryPattern::ScaleRight
        | BinaryPattern::Outer
        | BinaryPattern::Hadamard
        | BinaryPattern::BatchedBroadcast => a * b,
    }
}

/// Splits `C(L, I, K)` back into `shape` and transposes it by `perm`.
fn unfuse<T: Element>(c: Array3<T>, shape: &[usize], perm: Vec<usize>) -> EinsumResult<ArrayD<T>> {
    // `dot` may hand back column-major results.
    let c = if c.is_standard_layout() {
        c
    } else {
        c.as_standard_layout().into_owned()
    };

    let split = c.into_dyn().into_shape_with_order(IxDyn(shape))?;
    if perm.iter().enumerate().all(|(axis, &p)| axis == p) {
        return Ok(split);
    }
    Ok(permute_to_standard(split.view(), perm))
}
