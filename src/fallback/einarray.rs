//! Lazy outer product over every distinct label.
//!
//! An [`EinArray`] stands for the rank-|D| array whose cell at a multi-index
//! over the labels `D` is the product of the input entries that index
//! selects. Nothing is stored: every cell is recomputed from the inputs on
//! demand, and reductions stream over the summed axes.

use ndarray::{ArrayViewD, ArrayViewMutD};
use smallvec::{SmallVec, smallvec};

use crate::error::{EinsumError, EinsumResult};
use crate::kernels::Element;
use crate::notation::{EinsumNotation, Label, SizeMap};

/// Scratch buffer for one multi-index.
pub(crate) type IndexBuf = SmallVec<[usize; 8]>;

/// Maps a multi-index over `D` to the index of one tensor.
///
/// `axes[a]` is the position in `D` of the label on tensor axis `a`. Repeated
/// labels map several axes to the same position, which reads the diagonal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EinIndexer {
    axes: SmallVec<[usize; 8]>,
}

impl EinIndexer {
    /// Builds the indexer of a tensor labelled `labels` against `all`.
    ///
    /// Returns `None` if some label is missing from `all`.
    pub fn new<L: Label>(labels: &[L], all: &[L]) -> Option<Self> {
        let axes = labels
            .iter()
            .map(|l| all.iter().position(|x| x == l))
            .collect::<Option<_>>()?;
        Some(Self { axes })
    }

    /// Positions in `D`, one per tensor axis.
    pub fn axes(&self) -> &[usize] {
        &self.axes
    }

    /// Writes the tensor index selected by `full` into `out`.
    #[inline]
    pub fn project(&self, full: &[usize], out: &mut IndexBuf) {
        out.clear();
        out.extend(self.axes.iter().map(|&p| full[p]));
    }
}

/// The virtual outer product of an einsum's inputs.
#[derive(Debug)]
pub struct EinArray<'s, 'a, L: Label, T: Element> {
    /// `D`: distinct output labels, then summed labels.
    labels: Vec<L>,
    /// Size of every label of `D`.
    shape: Vec<usize>,
    /// Number of leading labels of `D` that belong to the output.
    num_output: usize,
    tensors: &'s [ArrayViewD<'a, T>],
    indexers: Vec<EinIndexer>,
    /// Position in `D` of every output axis, repeats included.
    output_axes: EinIndexer,
}

impl<'s, 'a, L: Label, T: Element> EinArray<'s, 'a, L, T> {
    /// Builds the lazy array of `notation` over `xs`.
    ///
    /// `sizes` must hold every label; the tensor shapes are checked against it.
    pub fn new(
        notation: &EinsumNotation<L>,
        xs: &'s [ArrayViewD<'a, T>],
        sizes: &SizeMap<L>,
    ) -> EinsumResult<Self> {
        if xs.len() != notation.num_inputs() {
            return Err(EinsumError::invalid(format!(
                "`{}` expects {} input tensors, got {}",
                notation,
                notation.num_inputs(),
                xs.len()
            )));
        }

        let labels = notation.all_labels();
        let shape = sizes.shape_of(&labels)?;
        let num_output = notation.unique_output_labels().len();

        let mut indexers = Vec::with_capacity(xs.len());
        for (input, (subscript, x)) in notation.inputs().iter().zip(xs).enumerate() {
            if subscript.len() != x.ndim() {
                return Err(EinsumError::RankMismatch {
                    input,
                    labels: subscript.to_string(),
                    expected: subscript.len(),
                    got: x.ndim(),
                });
            }

            for (&label, &dim) in subscript.iter().zip(x.shape()) {
                let expected = sizes.size_of(label)?;
                if expected != dim {
                    return Err(EinsumError::SizeMismatch {
                        label: label.to_string(),
                        expected,
                        got: dim,
                    });
                }
            }

            indexers.push(indexer(subscript.as_slice(), &labels, notation)?);
        }

        let output_axes = indexer(notation.output().as_slice(), &labels, notation)?;

        Ok(Self {
            labels,
            shape,
            num_output,
            tensors: xs,
            indexers,
            output_axes,
        })
    }

    /// The labels `D`, one per axis.
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// The size of every axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of leading axes that belong to the output.
    pub fn num_output(&self) -> usize {
        self.num_output
    }

    /// Shape of the einsum result, repeated output labels included.
    pub fn output_shape(&self) -> Vec<usize> {
        self.output_axes.axes().iter().map(|&p| self.shape[p]).collect()
    }

    /// The value at `index`: the product of the selected input entries.
    ///
    /// An einsum without inputs is the empty product, one.
    pub fn get(&self, index: &[usize]) -> T {
        let mut scratch = IndexBuf::new();
        self.get_with(index, &mut scratch)
    }

    fn get_with(&self, index: &[usize], scratch: &mut IndexBuf) -> T {
        let mut value = T::one();
        for (x, indexer) in self.tensors.iter().zip(&self.indexers) {
            indexer.project(index, scratch);
            value = value * x[&scratch[..]];
        }
        value
    }

    /// Sums the cells whose leading output coordinates are `outer`.
    pub fn reduced(&self, outer: &[usize]) -> T {
        let summed_shape = &self.shape[self.num_output..];
        if summed_shape.contains(&0) {
            return T::zero();
        }

        let mut full: IndexBuf = smallvec![0; self.shape.len()];
        full[..self.num_output].copy_from_slice(outer);

        let mut scratch = IndexBuf::new();
        let mut total = T::zero();
        loop {
            total = total + self.get_with(&full, &mut scratch);
            if !advance(&mut full[self.num_output..], summed_shape) {
                break;
            }
        }
        total
    }

    /// Evaluates the einsum into `out`.
    ///
    /// `out` is zero-filled first; cells whose repeated output labels
    /// disagree keep that zero. With the `rayon` feature, outputs with at
    /// least `parallel_threshold` distinct cells are reduced in parallel.
    #[cfg_attr(not(feature = "rayon"), allow(unused_variables))]
    pub fn reduce_into(
        &self,
        mut out: ArrayViewMutD<'_, T>,
        parallel_threshold: usize,
    ) -> EinsumResult<()> {
        let expected = self.output_shape();
        if out.shape() != expected.as_slice() {
            return Err(EinsumError::OutputShapeMismatch {
                expected,
                got: out.shape().to_vec(),
            });
        }

        out.fill(T::zero());

        let outer_shape = &self.shape[..self.num_output];
        let cells: usize = outer_shape.iter().product();
        if cells == 0 {
            return Ok(());
        }

        let mut outer: IndexBuf = smallvec![0; self.num_output];
        let mut target = IndexBuf::new();

        #[cfg(feature = "rayon")]
        if cells >= parallel_threshold {
            return self.reduce_parallel(out, cells);
        }

        loop {
            let value = self.reduced(&outer);
            self.output_axes.project(&outer, &mut target);
            out[&target[..]] = value;
            if !advance(&mut outer, outer_shape) {
                break;
            }
        }
        Ok(())
    }

    /// Reduces every output cell on the rayon pool, then scatters the
    /// results into `out`.
    #[cfg(feature = "rayon")]
    fn reduce_parallel(&self, mut out: ArrayViewMutD<'_, T>, cells: usize) -> EinsumResult<()> {
        use rayon::prelude::*;

        let outer_shape = &self.shape[..self.num_output];

        let values: Vec<T> = (0..cells)
            .into_par_iter()
            .map(|linear| {
                let mut outer: IndexBuf = smallvec![0; self.num_output];
                unravel(linear, outer_shape, &mut outer);
                self.reduced(&outer)
            })
            .collect();

        let mut outer: IndexBuf = smallvec![0; self.num_output];
        let mut target = IndexBuf::new();
        for value in values {
            self.output_axes.project(&outer, &mut target);
            out[&target[..]] = value;
            advance(&mut outer, outer_shape);
        }
        Ok(())
    }
}

fn indexer<L: Label>(labels: &[L], all: &[L], notation: &EinsumNotation<L>) -> EinsumResult<EinIndexer> {
    EinIndexer::new(labels, all).ok_or_else(|| EinsumError::invalid(format!("`{}` has unknown labels", notation)))
}

/// Steps `index` to the next multi-index of `shape` in row-major order.
///
/// Returns false once every index has been visited, leaving `index` at zero.
pub(crate) fn advance(index: &mut [usize], shape: &[usize]) -> bool {
    for (i, &n) in index.iter_mut().zip(shape).rev() {
        *i += 1;
        if *i < n {
            return true;
        }
        *i = 0;
    }
    false
}

/// Writes the row-major multi-index of `linear` over `shape` into `index`.
#[cfg(feature = "rayon")]
pub(crate) fn unravel(mut linear: usize, shape: &[usize], index: &mut [usize]) {
    for (i, &n) in index.iter_mut().zip(shape).rev() {
        *i = linear % n;
        linear /= n;
    }
}
