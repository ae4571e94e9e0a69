//! Custom backends taking over classified einsums.

use std::sync::atomic::{AtomicUsize, Ordering};

use einsum_rules::notation::{EinsumNotation, Label, SizeMap, parse_einsum};
use einsum_rules::{
    EinTensor, EinsumConfig, EinsumError, EinsumResult, OperationKind, einsum, einsum_into, einsum_with_config,
};
use ndarray::{Array1, Array2, ArrayD, CowArray, IxDyn, array};
use pretty_assertions::assert_eq;

static TRACE_CALLS: AtomicUsize = AtomicUsize::new(0);

/// A tensor that keeps square diagonal matrices compressed.
#[derive(Debug, Clone, PartialEq)]
enum Sparse {
    Dense(ArrayD<f64>),
    Diagonal { values: Array1<f64>, shape: [usize; 2] },
}

impl Sparse {
    fn diagonal(values: Vec<f64>) -> Self {
        let n = values.len();
        Sparse::Diagonal {
            values: Array1::from(values),
            shape: [n, n],
        }
    }
}

impl EinTensor for Sparse {
    type Elem = f64;

    fn shape(&self) -> &[usize] {
        match self {
            Sparse::Dense(array) => array.shape(),
            Sparse::Diagonal { shape, .. } => shape,
        }
    }

    fn view(&self) -> CowArray<'_, f64, IxDyn> {
        match self {
            Sparse::Dense(array) => CowArray::from(array.view()),
            Sparse::Diagonal { values, .. } => CowArray::from(Array2::from_diag(values).into_dyn()),
        }
    }

    fn from_array(array: ArrayD<f64>) -> Self {
        Sparse::Dense(array)
    }

    fn kernel<L: Label>(
        kind: OperationKind,
        _notation: &EinsumNotation<L>,
        xs: &[&Self],
        _sizes: &SizeMap<L>,
    ) -> Option<EinsumResult<Self>> {
        match (kind, xs) {
            (OperationKind::Trace, [Sparse::Diagonal { values, .. }]) => {
                TRACE_CALLS.fetch_add(1, Ordering::SeqCst);
                Some(Ok(Sparse::Dense(ArrayD::from_elem(IxDyn(&[]), values.sum()))))
            }
            (OperationKind::Diag, [Sparse::Diagonal { values, .. }]) => {
                Some(Ok(Sparse::Dense(values.clone().into_dyn())))
            }
            _ => None,
        }
    }
}

/// A backend whose sum kernel returns a result of the wrong length.
#[derive(Debug, Clone, PartialEq)]
struct Misshaped(ArrayD<f64>);

impl EinTensor for Misshaped {
    type Elem = f64;

    fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    fn view(&self) -> CowArray<'_, f64, IxDyn> {
        CowArray::from(self.0.view())
    }

    fn from_array(array: ArrayD<f64>) -> Self {
        Misshaped(array)
    }

    fn kernel<L: Label>(
        kind: OperationKind,
        _notation: &EinsumNotation<L>,
        _xs: &[&Self],
        _sizes: &SizeMap<L>,
    ) -> Option<EinsumResult<Self>> {
        (kind == OperationKind::Sum).then(|| Ok(Misshaped(ArrayD::zeros(IxDyn(&[5])))))
    }
}

#[test]
fn test_backend_trace_override() {
    let x = Sparse::diagonal(vec![1.0, 2.0, 3.0]);
    let notation = parse_einsum("ii->").unwrap();

    let before = TRACE_CALLS.load(Ordering::SeqCst);
    let y = einsum(&notation, &[&x]).unwrap();
    assert!(TRACE_CALLS.load(Ordering::SeqCst) > before);
    assert_eq!(y, Sparse::Dense(ArrayD::from_elem(IxDyn(&[]), 6.0)));
}

#[test]
fn test_backend_overrides_can_be_disabled() {
    let x = Sparse::diagonal(vec![4.0, 5.0]);
    let config = EinsumConfig::new().with_overrides(false);

    let trace = einsum_with_config(&parse_einsum("ii->").unwrap(), &[&x], None, &config).unwrap();
    assert_eq!(trace, Sparse::Dense(ArrayD::from_elem(IxDyn(&[]), 9.0)));

    let diag = einsum_with_config(&parse_einsum("ii->i").unwrap(), &[&x], None, &config).unwrap();
    assert_eq!(diag, Sparse::Dense(array![4.0, 5.0].into_dyn()));
}

#[test]
fn test_backend_falls_back_to_builtin_kernels() {
    let a = Sparse::diagonal(vec![2.0, 3.0]);
    let b = Sparse::Dense(array![[1.0, 1.0], [1.0, 1.0]].into_dyn());

    let c = einsum(&parse_einsum("ij,jk->ik").unwrap(), &[&a, &b]).unwrap();
    assert_eq!(c, Sparse::Dense(array![[2.0, 2.0], [3.0, 3.0]].into_dyn()));

    let loops = einsum(&parse_einsum("ij,jk,kl->il").unwrap(), &[&a, &b, &a]).unwrap();
    assert_eq!(loops, Sparse::Dense(array![[4.0, 6.0], [6.0, 9.0]].into_dyn()));
}

#[test]
fn test_backend_diag_override_matches_builtin() {
    let x = Sparse::diagonal(vec![7.0, 8.0, 9.0]);
    let notation = parse_einsum("ii->i").unwrap();

    let fast = einsum(&notation, &[&x]).unwrap();
    let builtin = einsum_with_config(&notation, &[&x], None, &EinsumConfig::reference()).unwrap();
    assert_eq!(fast, builtin);
}

#[test]
fn test_backend_wrong_shape_is_reported() {
    let x = Misshaped(array![[1.0, 2.0], [3.0, 4.0]].into_dyn());
    let notation = parse_einsum("ij->i").unwrap();

    let err = einsum(&notation, &[&x]).unwrap_err();
    assert!(matches!(err, EinsumError::ContractViolation { kind: OperationKind::Sum, .. }));

    let mut out = ArrayD::from_elem(IxDyn(&[2]), -1.0);
    let err = einsum_into(&notation, &[&x], out.view_mut(), None).unwrap_err();
    assert!(err.is_internal());
    assert_eq!(out, array![-1.0, -1.0].into_dyn());

    let config = EinsumConfig::new().with_overrides(false);
    let y = einsum_with_config(&notation, &[&x], None, &config).unwrap();
    assert_eq!(y, Misshaped(array![3.0, 7.0].into_dyn()));
}
