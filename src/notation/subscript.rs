//! Label sequence for one tensor of an einsum.

use core::fmt;
use core::ops::Index;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::label::{Label, all_unique, unique_labels};

/// Inline capacity; tensors of rank up to this never touch the heap.
const INLINE_LABELS: usize = 8;

/// The labels of a single tensor, one per axis, in the tensor's axis order.
///
/// For example, in `ij,jk->ik`, the subscripts are `ij`, `jk`, and `ik`.
/// A label may repeat (`ii`), marking a diagonal on that tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound(serialize = "L: Serialize", deserialize = "L: Deserialize<'de>"))]
pub struct Subscript<L: Label> {
    labels: SmallVec<[L; INLINE_LABELS]>,
}

impl<L: Label> Subscript<L> {
    /// Creates an empty subscript (a scalar).
    pub fn new() -> Self {
        Self {
            labels: SmallVec::new(),
        }
    }

    /// Creates a subscript from labels in axis order.
    pub fn from_labels(labels: impl IntoIterator<Item = L>) -> Self {
        Self {
            labels: labels.into_iter().collect(),
        }
    }

    /// Appends a label.
    pub fn push(&mut self, label: L) {
        self.labels.push(label);
    }

    /// Returns the number of axes described.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns an iterator over the labels.
    pub fn iter(&self) -> impl Iterator<Item = &L> {
        self.labels.iter()
    }

    /// Returns the labels as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[L] {
        &self.labels
    }

    /// Checks if this subscript contains `label`.
    pub fn contains(&self, label: L) -> bool {
        self.labels.contains(&label)
    }

    /// Counts occurrences of `label`.
    pub fn count(&self, label: L) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    /// Returns the position of `label` (first occurrence).
    pub fn position(&self, label: L) -> Option<usize> {
        self.labels.iter().position(|&l| l == label)
    }

    /// Returns true if no label repeats.
    pub fn is_unique(&self) -> bool {
        all_unique(&self.labels)
    }

    /// Returns the distinct labels in first-appearance order.
    pub fn unique(&self) -> Vec<L> {
        unique_labels(&self.labels)
    }

    /// Returns the labels occurring more than once, in first-appearance order.
    pub fn repeated(&self) -> Vec<L> {
        self.unique()
            .into_iter()
            .filter(|&l| self.count(l) > 1)
            .collect()
    }
}

impl<L: Label> Default for Subscript<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Label> Index<usize> for Subscript<L> {
    type Output = L;

    fn index(&self, axis: usize) -> &L {
        &self.labels[axis]
    }
}

impl<L: Label> FromIterator<L> for Subscript<L> {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        Self::from_labels(iter)
    }
}

impl<L: Label> From<&[L]> for Subscript<L> {
    fn from(labels: &[L]) -> Self {
        Self::from_labels(labels.iter().copied())
    }
}

impl<L: Label, const N: usize> From<[L; N]> for Subscript<L> {
    fn from(labels: [L; N]) -> Self {
        Self::from_labels(labels)
    }
}

impl<L: Label> From<Vec<L>> for Subscript<L> {
    fn from(labels: Vec<L>) -> Self {
        Self::from_labels(labels)
    }
}

/// `char` labels are written back to back (`ij`); other label types are
/// space separated (`1 2`) so multi-digit labels stay readable.
impl<L: Label> fmt::Display for Subscript<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let packed = core::any::TypeId::of::<L>() == core::any::TypeId::of::<char>();
        for (pos, label) in self.labels.iter().enumerate() {
            if pos > 0 && !packed {
                write!(f, " ")?;
            }
            write!(f, "{}", label)?;
        }
        Ok(())
    }
}

impl<'a, L: Label> IntoIterator for &'a Subscript<L> {
    type Item = &'a L;
    type IntoIter = core::slice::Iter<'a, L>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}
