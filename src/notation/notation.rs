//! Complete einsum notation representation.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::label::{Label, unique_labels};
use super::subscript::Subscript;

/// A flat einsum specification: one subscript per input tensor and one
/// output subscript.
///
/// Labels that appear in inputs but not in the output are summed over.
/// Output labels may repeat (the result gets a diagonal structure) and may be
/// absent from every input provided their size is supplied explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound(serialize = "L: Serialize", deserialize = "L: Deserialize<'de>"))]
pub struct EinsumNotation<L: Label> {
    /// Input tensor subscripts, in argument order.
    inputs: Vec<Subscript<L>>,
    /// Output tensor subscript.
    output: Subscript<L>,
}

impl<L: Label> EinsumNotation<L> {
    /// Creates a notation from input subscripts and the output subscript.
    pub fn new(inputs: Vec<Subscript<L>>, output: Subscript<L>) -> Self {
        Self { inputs, output }
    }

    /// Convenience constructor from plain label slices.
    ///
    /// ```ignore
    /// let matmul = EinsumNotation::from_labels(&[&['i', 'j'], &['j', 'k']], &['i', 'k']);
    /// ```
    pub fn from_labels(inputs: &[&[L]], output: &[L]) -> Self {
        Self::new(
            inputs.iter().map(|&ix| Subscript::from(ix)).collect(),
            Subscript::from(output),
        )
    }

    /// Returns the input subscripts.
    #[inline]
    pub fn inputs(&self) -> &[Subscript<L>] {
        &self.inputs
    }

    /// Returns the output subscript.
    #[inline]
    pub fn output(&self) -> &Subscript<L> {
        &self.output
    }

    /// Returns the number of input tensors.
    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Returns true if this is a unary operation (single input).
    #[inline]
    pub fn is_unary(&self) -> bool {
        self.inputs.len() == 1
    }

    /// Returns true if this is a binary operation (two inputs).
    #[inline]
    pub fn is_binary(&self) -> bool {
        self.inputs.len() == 2
    }

    /// Returns true if output is scalar (empty subscript).
    #[inline]
    pub fn is_scalar_output(&self) -> bool {
        self.output.is_empty()
    }

    /// Returns true if `label` occurs in at least one input.
    pub fn in_inputs(&self, label: L) -> bool {
        self.inputs.iter().any(|ix| ix.contains(label))
    }

    /// Counts total occurrences of a label across all inputs.
    pub fn count_in_inputs(&self, label: L) -> usize {
        self.inputs.iter().map(|ix| ix.count(label)).sum()
    }

    /// Returns which inputs contain a given label.
    pub fn inputs_containing(&self, label: L) -> Vec<usize> {
        self.inputs
            .iter()
            .enumerate()
            .filter_map(|(pos, ix)| ix.contains(label).then_some(pos))
            .collect()
    }

    /// Distinct output labels, in first-appearance order.
    pub fn unique_output_labels(&self) -> Vec<L> {
        self.output.unique()
    }

    /// Labels that are summed over: present in some input, absent from the
    /// output. Listed once each, in first-appearance order across inputs.
    pub fn summed_labels(&self) -> Vec<L> {
        let all: Vec<L> = self.inputs.iter().flat_map(|ix| ix.iter().copied()).collect();
        unique_labels(&all)
            .into_iter()
            .filter(|&l| !self.output.contains(l))
            .collect()
    }

    /// Returns true if `label` is summed over.
    #[inline]
    pub fn is_summed(&self, label: L) -> bool {
        !self.output.contains(label) && self.in_inputs(label)
    }

    /// Every distinct label of the notation: output labels first, then summed
    /// labels, each in first-appearance order.
    pub fn all_labels(&self) -> Vec<L> {
        let mut all = self.unique_output_labels();
        all.extend(self.summed_labels());
        all
    }

    /// Output labels that no input carries. Their sizes must be supplied.
    pub fn unbound_output_labels(&self) -> Vec<L> {
        self.unique_output_labels()
            .into_iter()
            .filter(|&l| !self.in_inputs(l))
            .collect()
    }
}

impl<L: Label> fmt::Display for EinsumNotation<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", input)?;
        }
        write!(f, "->{}", self.output)
    }
}
