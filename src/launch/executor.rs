//! Einsum execution engine.
//!
//! Orchestrates size resolution, classification and kernel dispatch.

use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, CowArray, IxDyn};

use super::backend::EinTensor;
use super::config::{EinsumConfig, record_dispatch};
use crate::error::{EinsumError, EinsumResult};
use crate::fallback::EinArray;
use crate::kernels;
use crate::notation::{EinsumNotation, Label, SizeMap, output_shape, resolve_sizes};
use crate::pattern::{OperationKind, classify};

/// Executes an einsum.
///
/// # Arguments
/// * `notation` - The einsum, e.g. parsed from `"ij,jk->ik"`
/// * `xs` - Input tensors, one per input subscript
///
/// # Example
///
/// ```ignore
/// let c = einsum(&parse_einsum("ij,jk->ik")?, &[&a, &b])?;
/// ```
pub fn einsum<L: Label, T: EinTensor>(notation: &EinsumNotation<L>, xs: &[&T]) -> EinsumResult<T> {
    einsum_with_config(notation, xs, None, &EinsumConfig::default())
}

/// Executes an einsum with explicit label sizes.
///
/// Needed when output labels appear in no input (`i->ik`); sizes of labels
/// the inputs carry are checked against them.
pub fn einsum_with_sizes<L: Label, T: EinTensor>(
    notation: &EinsumNotation<L>,
    xs: &[&T],
    sizes: &SizeMap<L>,
) -> EinsumResult<T> {
    einsum_with_config(notation, xs, Some(sizes), &EinsumConfig::default())
}

/// Executes an einsum with optional size seed and configuration.
pub fn einsum_with_config<L: Label, T: EinTensor>(
    notation: &EinsumNotation<L>,
    xs: &[&T],
    seed: Option<&SizeMap<L>>,
    config: &EinsumConfig,
) -> EinsumResult<T> {
    let sizes = prepare(notation, xs, seed)?;
    let kind = select(notation, config);

    if let Some(result) = backend_kernel(kind, notation, xs, &sizes, config) {
        return result;
    }

    let arrays: Vec<CowArray<'_, T::Elem, IxDyn>> = xs.iter().map(|x| x.view()).collect();
    let views: Vec<ArrayViewD<'_, T::Elem>> = arrays.iter().map(|a| a.view()).collect();

    let result = match kind {
        OperationKind::Fallback => {
            let array = EinArray::new(notation, &views, &sizes)?;
            let mut out = ArrayD::zeros(IxDyn(&array.output_shape()));
            array.reduce_into(out.view_mut(), config.parallel_threshold)?;
            out
        }
        kind => kernels::execute(kind, notation, &views, &sizes)?,
    };

    Ok(T::from_array(result))
}

/// Executes an einsum and writes the result into `out`.
///
/// `out` must have the output shape. Loop-evaluated einsums are reduced
/// straight into it.
pub fn einsum_into<L: Label, T: EinTensor>(
    notation: &EinsumNotation<L>,
    xs: &[&T],
    mut out: ArrayViewMutD<'_, T::Elem>,
    seed: Option<&SizeMap<L>>,
) -> EinsumResult<()> {
    let config = EinsumConfig::default();
    let sizes = prepare(notation, xs, seed)?;

    let expected = output_shape(notation, &sizes)?;
    if out.shape() != expected.as_slice() {
        return Err(EinsumError::OutputShapeMismatch {
            expected,
            got: out.shape().to_vec(),
        });
    }

    let kind = select(notation, &config);
    let result = match backend_kernel(kind, notation, xs, &sizes, &config) {
        Some(result) => result?,
        None if kind == OperationKind::Fallback => {
            let arrays: Vec<_> = xs.iter().map(|x| x.view()).collect();
            let views: Vec<_> = arrays.iter().map(|a| a.view()).collect();
            return EinArray::new(notation, &views, &sizes)?.reduce_into(out, config.parallel_threshold);
        }
        None => {
            let arrays: Vec<_> = xs.iter().map(|x| x.view()).collect();
            let views: Vec<_> = arrays.iter().map(|a| a.view()).collect();
            T::from_array(kernels::execute(kind, notation, &views, &sizes)?)
        }
    };

    out.assign(&result.view());
    Ok(())
}

/// Checks arity and resolves every label size.
fn prepare<L: Label, T: EinTensor>(
    notation: &EinsumNotation<L>,
    xs: &[&T],
    seed: Option<&SizeMap<L>>,
) -> EinsumResult<SizeMap<L>> {
    if notation.num_inputs() == 0 {
        return Err(EinsumError::invalid(format!("`{}` has no inputs", notation)));
    }

    let shapes: Vec<&[usize]> = xs.iter().map(|x| x.shape()).collect();
    resolve_sizes(notation, &shapes, seed)
}

fn select<L: Label>(notation: &EinsumNotation<L>, config: &EinsumConfig) -> OperationKind {
    let kind = if config.force_fallback {
        OperationKind::Fallback
    } else {
        classify(notation)
    };
    record_dispatch(notation, kind);
    kind
}

fn backend_kernel<L: Label, T: EinTensor>(
    kind: OperationKind,
    notation: &EinsumNotation<L>,
    xs: &[&T],
    sizes: &SizeMap<L>,
    config: &EinsumConfig,
) -> Option<EinsumResult<T>> {
    if !config.use_overrides {
        return None;
    }

    let result = T::kernel(kind, notation, xs, sizes)?;
    log::trace!("einsum `{}` evaluated by the backend {} kernel", notation, kind);

    let checked = result.and_then(|y| {
        let expected = output_shape(notation, sizes)?;
        if y.shape() != expected.as_slice() {
            log::error!(
                "backend {} kernel returned shape {:?} for `{}`, expected {:?}",
                kind,
                y.shape(),
                notation,
                expected
            );
            return Err(EinsumError::contract_violation(kind, notation));
        }
        Ok(y)
    });
    Some(checked)
}
