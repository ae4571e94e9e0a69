//! Loop evaluation of arbitrary einsums.

use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, IxDyn};

use super::einarray::EinArray;
use crate::error::EinsumResult;
use crate::kernels::Element;
use crate::notation::{EinsumNotation, Label, SizeMap};

/// Output cell count from which the `rayon` feature reduces in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 12;

/// Evaluates any einsum by streaming over the lazy outer product of its inputs.
///
/// Time is the product of every distinct label size; memory is the output
/// plus a few index buffers.
pub fn loop_einsum<L: Label, T: Element>(
    notation: &EinsumNotation<L>,
    xs: &[ArrayViewD<'_, T>],
    sizes: &SizeMap<L>,
) -> EinsumResult<ArrayD<T>> {
    let array = EinArray::new(notation, xs, sizes)?;

    let mut out = ArrayD::zeros(IxDyn(&array.output_shape()));
    array.reduce_into(out.view_mut(), DEFAULT_PARALLEL_THRESHOLD)?;
    Ok(out)
}

/// Like [`loop_einsum`], writing into a caller-supplied buffer of the output shape.
///
/// The previous contents of `out` are overwritten.
pub fn loop_einsum_into<L: Label, T: Element>(
    notation: &EinsumNotation<L>,
    xs: &[ArrayViewD<'_, T>],
    sizes: &SizeMap<L>,
    out: ArrayViewMutD<'_, T>,
) -> EinsumResult<()> {
    EinArray::new(notation, xs, sizes)?.reduce_into(out, DEFAULT_PARALLEL_THRESHOLD)
}
