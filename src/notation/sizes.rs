//! Label size resolution.
//!
//! Derives the label -> dimension-size mapping of an einsum from the concrete
//! input shapes, checking that every occurrence of a label agrees.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use super::label::Label;
use super::notation::EinsumNotation;
use crate::error::{EinsumError, EinsumResult};

/// Mapping from labels to dimension sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeMap<L: Label> {
    sizes: HashMap<L, usize>,
}

impl<L: Label> SizeMap<L> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            sizes: HashMap::new(),
        }
    }

    /// Adds an entry, builder style.
    pub fn with(mut self, label: L, size: usize) -> Self {
        self.sizes.insert(label, size);
        self
    }

    /// Records `size` for `label`, failing if a different size is already known.
    pub fn bind(&mut self, label: L, size: usize) -> EinsumResult<()> {
        match self.sizes.entry(label) {
            Entry::Occupied(existing) => {
                if *existing.get() != size {
                    return Err(EinsumError::SizeMismatch {
                        label: label.to_string(),
                        expected: *existing.get(),
                        got: size,
                    });
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(size);
            }
        }
        Ok(())
    }

    /// Returns the size of `label`, if known.
    #[inline]
    pub fn get(&self, label: L) -> Option<usize> {
        self.sizes.get(&label).copied()
    }

    /// Returns the size of `label` or an `UnboundOutputLabel` error.
    pub fn size_of(&self, label: L) -> EinsumResult<usize> {
        self.get(label).ok_or_else(|| EinsumError::UnboundOutputLabel {
            label: label.to_string(),
        })
    }

    /// Returns the shape described by `labels`.
    pub fn shape_of(&self, labels: &[L]) -> EinsumResult<Vec<usize>> {
        labels.iter().map(|&l| self.size_of(l)).collect()
    }

    /// Returns true if `label` has a size.
    #[inline]
    pub fn contains(&self, label: L) -> bool {
        self.sizes.contains_key(&label)
    }

    /// Number of labels with a known size.
    #[inline]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Returns true if no size is known.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Iterates over `(label, size)` entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (L, usize)> + '_ {
        self.sizes.iter().map(|(&l, &s)| (l, s))
    }
}

impl<L: Label> Default for SizeMap<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Label> FromIterator<(L, usize)> for SizeMap<L> {
    fn from_iter<I: IntoIterator<Item = (L, usize)>>(iter: I) -> Self {
        Self {
            sizes: iter.into_iter().collect(),
        }
    }
}

/// Resolves the size of every label of `notation` from the input `shapes`.
///
/// `seed` supplies sizes up front, typically for output labels that no input
/// carries; its entries are checked against the inputs like any other
/// occurrence.
///
/// Checks:
/// - one shape per input subscript
/// - every subscript has one label per tensor axis
/// - every occurrence of a label has the same size
/// - every output label has a size
pub fn resolve_sizes<L: Label>(
    notation: &EinsumNotation<L>,
    shapes: &[&[usize]],
    seed: Option<&SizeMap<L>>,
) -> EinsumResult<SizeMap<L>> {
    if shapes.len() != notation.num_inputs() {
        return Err(EinsumError::invalid(format!(
            "`{}` expects {} input tensors, got {}",
            notation,
            notation.num_inputs(),
            shapes.len()
        )));
    }

    let mut sizes = seed.cloned().unwrap_or_default();

    for (input, (subscript, shape)) in notation.inputs().iter().zip(shapes).enumerate() {
        if subscript.len() != shape.len() {
            return Err(EinsumError::RankMismatch {
                input,
                labels: subscript.to_string(),
                expected: subscript.len(),
                got: shape.len(),
            });
        }

        for (&label, &dim) in subscript.iter().zip(shape.iter()) {
            sizes.bind(label, dim)?;
        }
    }

    for label in notation.unique_output_labels() {
        sizes.size_of(label)?;
    }

    Ok(sizes)
}

/// Computes the output shape of `notation` under `sizes`.
pub fn output_shape<L: Label>(notation: &EinsumNotation<L>, sizes: &SizeMap<L>) -> EinsumResult<Vec<usize>> {
    sizes.shape_of(notation.output().as_slice())
}
