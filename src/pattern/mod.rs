//! Pattern recognition for einsum rules.
//!
//! Classifies a notation into one [`OperationKind`] by trying each rule in
//! priority order:
//! - Identity
//! - Permutation
//! - Trace
//! - Sum
//! - Repeat
//! - Diag
//! - Duplicate
//! - SimpleBinary
//! - Fallback
//!
//! Only label structure is inspected, never tensor sizes or values. The same
//! predicates guard the kernels, so a kernel never disagrees with the
//! classifier about what it can evaluate.

mod binary;
mod kind;
mod unary;

pub use binary::{BinaryAnalysis, BinaryPattern, analyze_binary, is_simple_binary};
pub use kind::OperationKind;
pub use unary::{
    is_diag, is_duplicate, is_identity, is_permutation, is_repeat, is_sum, is_trace,
    permutation_of,
};

use crate::notation::{EinsumNotation, Label};

/// Returns true if the structural predicate of `kind` holds for `notation`.
///
/// `Fallback` accepts everything.
pub fn matches_kind<L: Label>(kind: OperationKind, notation: &EinsumNotation<L>) -> bool {
    match kind {
        OperationKind::Identity => is_identity(notation),
        OperationKind::Permutation => is_permutation(notation),
        OperationKind::Trace => is_trace(notation),
        OperationKind::Sum => is_sum(notation),
        OperationKind::Repeat => is_repeat(notation),
        OperationKind::Diag => is_diag(notation),
        OperationKind::Duplicate => is_duplicate(notation),
        OperationKind::SimpleBinary => is_simple_binary(notation),
        OperationKind::Fallback => true,
    }
}

/// Main entry point for pattern recognition.
///
/// Returns the first kind, in priority order, whose predicate holds.
pub fn classify<L: Label>(notation: &EinsumNotation<L>) -> OperationKind {
    OperationKind::ALL
        .into_iter()
        .find(|&kind| matches_kind(kind, notation))
        .unwrap_or(OperationKind::Fallback)
}
