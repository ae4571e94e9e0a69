//! Binary operation pattern detection.
//!
//! A pairwise contraction qualifies for a dense primitive when neither input
//! could first be simplified by a unary rule. Its labels then fall in four
//! groups:
//!
//! - `i`: left input and output (left free)
//! - `j`: both inputs, not the output (contracted)
//! - `k`: right input and output (right free)
//! - `l`: both inputs and the output (batch)
//!
//! Which groups are present selects one entry of the closed
//! [`BinaryPattern`] table.

use serde::{Deserialize, Serialize};

use crate::notation::{EinsumNotation, Label};

/// Checks if the notation is a pairwise contraction served by a dense primitive.
///
/// Requirements:
/// - exactly two inputs
/// - no label repeats within either input or the output (no multi-edge)
/// - every label of one input appears in the other input or the output
///   (otherwise a unary `Sum` would have to run first)
/// - every output label comes from an input
pub fn is_simple_binary<L: Label>(notation: &EinsumNotation<L>) -> bool {
    if !notation.is_binary() {
        return false;
    }

    let inputs = notation.inputs();
    let (a, b) = (&inputs[0], &inputs[1]);
    let out = notation.output();

    if !a.is_unique() || !b.is_unique() || !out.is_unique() {
        return false;
    }

    let a_bound = a.iter().all(|&l| b.contains(l) || out.contains(l));
    let b_bound = b.iter().all(|&l| a.contains(l) || out.contains(l));
    let out_bound = out.iter().all(|&l| a.contains(l) || b.contains(l));

    a_bound && b_bound && out_bound
}

/// The closed table of pairwise contraction shapes.
///
/// Named after the representative with one label per group; groups holding
/// several labels are fused by reshaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryPattern {
    /// `,->`
    Scalar,
    /// `i,->i`
    ScaleLeft,
    /// `,k->k`
    ScaleRight,
    /// `j,j->`
    Dot,
    /// `i,k->ik`
    Outer,
    /// `ij,j->i`
    MatVec,
    /// `j,jk->k`
    VecMat,
    /// `ij,jk->ik` and its in-tensor permutations
    MatMul,
    /// `l,l->l`
    Hadamard,
    /// `il,l->il`, `l,kl->kl`, `il,kl->ikl`: batch labels with nothing contracted
    BatchedBroadcast,
    /// `jl,jl->l` up to `ijl,jkl->ikl`: batch labels with a contraction
    BatchedMatMul,
}

impl BinaryPattern {
    /// Selects the table entry from the groups that are present.
    pub fn from_groups(has_i: bool, has_j: bool, has_k: bool, has_l: bool) -> Self {
        match (has_i, has_j, has_k, has_l) {
            (false, false, false, false) => BinaryPattern::Scalar,
            (true, false, false, false) => BinaryPattern::ScaleLeft,
            (false, false, true, false) => BinaryPattern::ScaleRight,
            (false, true, false, false) => BinaryPattern::Dot,
            (true, false, true, false) => BinaryPattern::Outer,
            (true, true, false, false) => BinaryPattern::MatVec,
            (false, true, true, false) => BinaryPattern::VecMat,
            (true, true, true, false) => BinaryPattern::MatMul,
            (false, false, false, true) => BinaryPattern::Hadamard,
            (_, false, _, true) => BinaryPattern::BatchedBroadcast,
            (_, true, _, true) => BinaryPattern::BatchedMatMul,
        }
    }

    /// Returns a human-readable name for this pattern.
    pub fn name(&self) -> &'static str {
        match self {
            BinaryPattern::Scalar => "scalar",
            BinaryPattern::ScaleLeft => "scale_left",
            BinaryPattern::ScaleRight => "scale_right",
            BinaryPattern::Dot => "dot",
            BinaryPattern::Outer => "outer",
            BinaryPattern::MatVec => "matvec",
            BinaryPattern::VecMat => "vecmat",
            BinaryPattern::MatMul => "matmul",
            BinaryPattern::Hadamard => "hadamard",
            BinaryPattern::BatchedBroadcast => "batched_broadcast",
            BinaryPattern::BatchedMatMul => "batched_matmul",
        }
    }
}

/// Label groups of a simple binary contraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryAnalysis<L: Label> {
    /// Left free labels, in left-input order.
    pub left: Vec<L>,
    /// Contracted labels, in left-input order.
    pub contracted: Vec<L>,
    /// Right free labels, in right-input order.
    pub right: Vec<L>,
    /// Batch labels, in output order.
    pub batch: Vec<L>,
    /// The table entry.
    pub pattern: BinaryPattern,
}

impl<L: Label> BinaryAnalysis<L> {
    /// Left operand labels in primitive order: `[batch.., left.., contracted..]`.
    pub fn lhs_order(&self) -> Vec<L> {
        self.batch
            .iter()
            .chain(&self.left)
            .chain(&self.contracted)
            .copied()
            .collect()
    }

    /// Right operand labels in primitive order: `[batch.., contracted.., right..]`.
    pub fn rhs_order(&self) -> Vec<L> {
        self.batch
            .iter()
            .chain(&self.contracted)
            .chain(&self.right)
            .copied()
            .collect()
    }

    /// Labels of the primitive's result: `[batch.., left.., right..]`.
    pub fn result_order(&self) -> Vec<L> {
        self.batch
            .iter()
            .chain(&self.left)
            .chain(&self.right)
            .copied()
            .collect()
    }
}

/// Splits the labels of a simple binary notation into groups.
///
/// Returns `None` if the notation is not simple binary.
pub fn analyze_binary<L: Label>(notation: &EinsumNotation<L>) -> Option<BinaryAnalysis<L>> {
    if !is_simple_binary(notation) {
        return None;
    }

    let inputs = notation.inputs();
    let (a, b) = (&inputs[0], &inputs[1]);
    let out = notation.output();

    let left: Vec<L> = a.iter().copied().filter(|&l| !b.contains(l)).collect();
    let contracted: Vec<L> = a.iter().copied().filter(|&l| b.contains(l) && !out.contains(l)).collect();
    let right: Vec<L> = b.iter().copied().filter(|&l| !a.contains(l)).collect();
    let batch: Vec<L> = out.iter().copied().filter(|&l| a.contains(l) && b.contains(l)).collect();

    let pattern = BinaryPattern::from_groups(
        !left.is_empty(),
        !contracted.is_empty(),
        !right.is_empty(),
        !batch.is_empty(),
    );

    Some(BinaryAnalysis {
        left,
        contracted,
        right,
        batch,
        pattern,
    })
}
