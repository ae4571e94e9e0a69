//! Nested einsum evaluation.
//!
//! A [`NestedEinsum`] is a contraction tree: leaves name the caller's tensors
//! by position, and every node contracts the results of its children with a
//! flat notation. Choosing a good tree is up to the caller.

use serde::{Deserialize, Serialize};

use super::backend::EinTensor;
use super::config::EinsumConfig;
use super::executor::einsum_with_config;
use crate::error::{EinsumError, EinsumResult};
use crate::notation::{EinsumNotation, Label, SizeMap, Subscript};

/// A contraction tree over the caller's tensors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "L: Serialize", deserialize = "L: Deserialize<'de>"))]
pub enum NestedEinsum<L: Label> {
    /// The input tensor at this position.
    Leaf(usize),
    /// Contraction of the children's results, one notation input per child.
    Node {
        args: Vec<NestedEinsum<L>>,
        notation: EinsumNotation<L>,
    },
}

/// An evaluated subtree: a caller tensor or an intermediate result.
enum Operand<'x, T> {
    Input(&'x T),
    Computed(T),
}

impl<T> Operand<'_, T> {
    fn get(&self) -> &T {
        match self {
            Operand::Input(x) => x,
            Operand::Computed(x) => x,
        }
    }
}

impl<L: Label> NestedEinsum<L> {
    /// A leaf referring to input `index`.
    pub fn leaf(index: usize) -> Self {
        NestedEinsum::Leaf(index)
    }

    /// A node contracting `args` with `notation`.
    pub fn node(args: Vec<NestedEinsum<L>>, notation: EinsumNotation<L>) -> Self {
        NestedEinsum::Node { args, notation }
    }

    /// Returns true for a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NestedEinsum::Leaf(_))
    }

    /// Input positions referenced by the tree, left to right.
    pub fn leaves(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<usize>) {
        match self {
            NestedEinsum::Leaf(index) => out.push(*index),
            NestedEinsum::Node { args, .. } => args.iter().for_each(|arg| arg.collect_leaves(out)),
        }
    }

    /// Evaluates the tree bottom-up.
    ///
    /// `sizes` is passed to every node; it only needs to cover output labels
    /// that no input carries.
    pub fn evaluate<T: EinTensor>(&self, xs: &[&T], sizes: Option<&SizeMap<L>>) -> EinsumResult<T> {
        self.evaluate_with_config(xs, sizes, &EinsumConfig::default())
    }

    /// Evaluates the tree bottom-up with an explicit configuration.
    pub fn evaluate_with_config<T: EinTensor>(
        &self,
        xs: &[&T],
        sizes: Option<&SizeMap<L>>,
        config: &EinsumConfig,
    ) -> EinsumResult<T> {
        match self.evaluate_operand(xs, sizes, config)? {
            Operand::Computed(x) => Ok(x),
            Operand::Input(x) => Ok(T::from_array(x.view().into_owned())),
        }
    }

    fn evaluate_operand<'x, T: EinTensor>(
        &self,
        xs: &[&'x T],
        sizes: Option<&SizeMap<L>>,
        config: &EinsumConfig,
    ) -> EinsumResult<Operand<'x, T>> {
        match self {
            NestedEinsum::Leaf(index) => xs.get(*index).map(|&x| Operand::Input(x)).ok_or_else(|| {
                EinsumError::invalid(format!(
                    "leaf refers to input {} of {}",
                    index,
                    xs.len()
                ))
            }),
            NestedEinsum::Node { args, notation } => {
                if args.len() != notation.num_inputs() {
                    return Err(EinsumError::invalid(format!(
                        "node `{}` has {} children",
                        notation,
                        args.len()
                    )));
                }

                let operands = args
                    .iter()
                    .map(|arg| arg.evaluate_operand(xs, sizes, config))
                    .collect::<EinsumResult<Vec<_>>>()?;
                let refs: Vec<&T> = operands.iter().map(Operand::get).collect();

                einsum_with_config(notation, &refs, sizes, config).map(Operand::Computed)
            }
        }
    }

    /// The equivalent flat notation over the caller's tensors.
    ///
    /// Each leaf takes the labels its parent gives it; inputs are ordered by
    /// leaf position and the output is the root's. The tree must reference
    /// every position `0..n` exactly once and its root must be a node.
    /// Flattening assumes a label summed inside a subtree is not reused
    /// outside it, as in any tree built from a flat einsum.
    pub fn flatten(&self) -> EinsumResult<EinsumNotation<L>> {
        let NestedEinsum::Node { notation, .. } = self else {
            return Err(EinsumError::invalid("a single leaf has no notation"));
        };

        let mut inputs: Vec<Option<Subscript<L>>> = vec![None; self.leaves().len()];
        self.collect_leaf_labels(&mut inputs)?;

        let inputs = inputs
            .into_iter()
            .enumerate()
            .map(|(position, labels)| {
                labels.ok_or_else(|| EinsumError::invalid(format!("input {} is never referenced", position)))
            })
            .collect::<EinsumResult<Vec<_>>>()?;

        Ok(EinsumNotation::new(inputs, notation.output().clone()))
    }

    fn collect_leaf_labels(&self, inputs: &mut [Option<Subscript<L>>]) -> EinsumResult<()> {
        let NestedEinsum::Node { args, notation } = self else {
            return Ok(());
        };

        if args.len() != notation.num_inputs() {
            return Err(EinsumError::invalid(format!(
                "node `{}` has {} children",
                notation,
                args.len()
            )));
        }

        for (arg, labels) in args.iter().zip(notation.inputs()) {
            match arg {
                NestedEinsum::Leaf(index) => {
                    let slot = inputs.get_mut(*index).ok_or_else(|| {
                        EinsumError::invalid(format!("leaf {} is out of range", index))
                    })?;
                    if slot.is_some() {
                        return Err(EinsumError::invalid(format!("input {} is referenced twice", index)));
                    }
                    *slot = Some(labels.clone());
                }
                node => node.collect_leaf_labels(inputs)?,
            }
        }
        Ok(())
    }
}
