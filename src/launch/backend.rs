//! Tensor backends.
//!
//! The dispatcher works with any type implementing [`EinTensor`]. A backend
//! exposes its data as an `ndarray` view for the built-in kernels and may
//! take over any [`OperationKind`] with its own kernel.

use ndarray::{ArrayD, CowArray, IxDyn};

use crate::error::EinsumResult;
use crate::kernels::Element;
use crate::notation::{EinsumNotation, Label, SizeMap};
use crate::pattern::OperationKind;

/// A dense tensor the einsum dispatcher can evaluate.
pub trait EinTensor: Sized {
    /// Scalar element type.
    type Elem: Element;

    /// Size of every axis.
    fn shape(&self) -> &[usize];

    /// Row-major readable data, borrowed when possible.
    fn view(&self) -> CowArray<'_, Self::Elem, IxDyn>;

    /// Wraps a result computed by the built-in kernels.
    fn from_array(array: ArrayD<Self::Elem>) -> Self;

    /// Backend-specific kernel for `kind`.
    ///
    /// Called after classification with the resolved sizes. Returning `None`
    /// hands the einsum to the built-in kernel (or the loop engine for
    /// [`OperationKind::Fallback`]).
    fn kernel<L: Label>(
        kind: OperationKind,
        notation: &EinsumNotation<L>,
        xs: &[&Self],
        sizes: &SizeMap<L>,
    ) -> Option<EinsumResult<Self>> {
        let _ = (kind, notation, xs, sizes);
        None
    }
}

impl<T: Element> EinTensor for ArrayD<T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        ndarray::ArrayBase::shape(self)
    }

    fn view(&self) -> CowArray<'_, T, IxDyn> {
        CowArray::from(ndarray::ArrayBase::view(self))
    }

    fn from_array(array: ArrayD<T>) -> Self {
        array
    }
}
