//! Operation kinds selected by the classifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The evaluation strategy chosen for one einsum.
///
/// Variants are listed in classification priority order: the first kind
/// whose structural predicate holds wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationKind {
    /// `ijk->ijk`
    Identity,
    /// `ijk->kij`
    Permutation,
    /// `ii->`
    Trace,
    /// `ijk->ik`, reduction over labels absent from the output.
    Sum,
    /// `ij->ijk`, broadcast into new axes. The inverse of `Sum`.
    Repeat,
    /// `iij->ij`, diagonal extraction.
    Diag,
    /// `ij->iij`, diagonal construction. The inverse of `Diag`.
    Duplicate,
    /// Pairwise contraction expressible as one dense primitive call.
    SimpleBinary,
    /// Lazy loop evaluation, correct for every specification.
    Fallback,
}

impl OperationKind {
    /// Every kind, in classification priority order.
    pub const ALL: [OperationKind; 9] = [
        OperationKind::Identity,
        OperationKind::Permutation,
        OperationKind::Trace,
        OperationKind::Sum,
        OperationKind::Repeat,
        OperationKind::Diag,
        OperationKind::Duplicate,
        OperationKind::SimpleBinary,
        OperationKind::Fallback,
    ];

    /// Returns true if this kind operates on a single tensor.
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            OperationKind::Identity
                | OperationKind::Permutation
                | OperationKind::Trace
                | OperationKind::Sum
                | OperationKind::Repeat
                | OperationKind::Diag
                | OperationKind::Duplicate
        )
    }

    /// Returns true for every kind served by a specialised kernel.
    pub fn is_specialized(&self) -> bool {
        *self != OperationKind::Fallback
    }

    /// Returns a human-readable name for this operation.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Identity => "identity",
            OperationKind::Permutation => "permutation",
            OperationKind::Trace => "trace",
            OperationKind::Sum => "sum",
            OperationKind::Repeat => "repeat",
            OperationKind::Diag => "diag",
            OperationKind::Duplicate => "duplicate",
            OperationKind::SimpleBinary => "simple_binary",
            OperationKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
