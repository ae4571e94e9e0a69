//! Specialised kernels for the classified einsum rules.
//!
//! Contains implementations of:
//! - Identity and permutation (materialising transposed views)
//! - Reductions (trace, sum)
//! - Broadcast (repeat)
//! - Diagonal extraction and construction (diag, duplicate)
//! - Pairwise contraction (simple binary)
//!
//! Every kernel first re-checks the classifier predicate of its kind and
//! returns [`EinsumError::ContractViolation`] when it does not hold.

mod binary;
mod broadcast;
mod diagonal;
mod permute;
mod reduce;

pub use binary::simple_binary;
pub use broadcast::repeat;
pub use diagonal::{diag, duplicate};
pub use permute::{identity, permute};
pub use reduce::{sum, trace};

use core::fmt::Debug;

use ndarray::{ArrayD, ArrayViewD, LinalgScalar};

use crate::error::{EinsumError, EinsumResult};
use crate::notation::{EinsumNotation, Label, SizeMap};
use crate::pattern::{OperationKind, matches_kind};

/// Scalar element type of dense tensors.
///
/// Anything `ndarray` can multiply as matrices: `f32`, `f64`, the integer
/// types, `half::f16`, ...
pub trait Element: LinalgScalar + Send + Sync + Debug {}

impl<T> Element for T where T: LinalgScalar + Send + Sync + Debug {}

/// Fails with a contract violation unless `notation` satisfies the predicate of `kind`.
fn check<L: Label>(kind: OperationKind, notation: &EinsumNotation<L>) -> EinsumResult<()> {
    if matches_kind(kind, notation) {
        Ok(())
    } else {
        Err(EinsumError::contract_violation(kind, notation))
    }
}

/// Input and output labels of a notation already checked to be unary.
fn unary_labels<L: Label>(notation: &EinsumNotation<L>) -> (&[L], &[L]) {
    (notation.inputs()[0].as_slice(), notation.output().as_slice())
}

/// Runs the built-in kernel of `kind`.
///
/// `Fallback` has no kernel here and is reported as a contract violation;
/// the dispatcher routes it to the loop engine.
pub fn execute<L: Label, T: Element>(
    kind: OperationKind,
    notation: &EinsumNotation<L>,
    xs: &[ArrayViewD<'_, T>],
    sizes: &SizeMap<L>,
) -> EinsumResult<ArrayD<T>> {
    let arity = if kind == OperationKind::SimpleBinary { 2 } else { 1 };
    if kind == OperationKind::Fallback || xs.len() != arity {
        return Err(EinsumError::contract_violation(kind, notation));
    }

    match kind {
        OperationKind::Identity => identity(notation, &xs[0]),
        OperationKind::Permutation => permute(notation, &xs[0]),
        OperationKind::Trace => trace(notation, &xs[0]),
        OperationKind::Sum => sum(notation, &xs[0]),
        OperationKind::Repeat => repeat(notation, &xs[0], sizes),
        OperationKind::Diag => diag(notation, &xs[0], sizes),
        OperationKind::Duplicate => duplicate(notation, &xs[0], sizes),
        OperationKind::SimpleBinary => simple_binary(notation, &xs[0], &xs[1], sizes),
        OperationKind::Fallback => Err(EinsumError::contract_violation(kind, notation)),
    }
}
