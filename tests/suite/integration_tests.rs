//! Integration tests for einsum-rules.
//!
//! These tests execute einsums end to end through the dispatcher.

use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use einsum_rules::notation::{EinsumNotation, SizeMap, parse_einsum};
use einsum_rules::{
    DispatchRecord, EinsumConfig, EinsumError, OperationKind, allow_loops, einsum, einsum_with_config,
    einsum_with_sizes, loops_allowed, set_dispatch_observer,
};
use half::f16;
use ndarray::{Array, ArrayD, IxDyn, array};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random(rng: &mut StdRng, shape: &[usize]) -> ArrayD<f64> {
    let len = shape.iter().product();
    Array::from_shape_vec(IxDyn(shape), (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()).unwrap()
}

fn reference(notation: &EinsumNotation<char>, xs: &[&ArrayD<f64>], sizes: Option<&SizeMap<char>>) -> ArrayD<f64> {
    einsum_with_config(notation, xs, sizes, &EinsumConfig::reference()).unwrap()
}

#[test]
fn test_matmul_integration() {
    let notation = parse_einsum("ij,jk->ik").unwrap();
    let a = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
    let b = array![[5.0, 6.0], [7.0, 8.0]].into_dyn();
    let expected = array![[19.0, 22.0], [43.0, 50.0]].into_dyn();

    assert_eq!(einsum(&notation, &[&a, &b]).unwrap(), expected);
    assert_eq!(reference(&notation, &[&a, &b], None), expected);
}

#[test]
fn test_attention_scores() {
    let mut rng = StdRng::seed_from_u64(42);
    let notation = parse_einsum("bhqd,bhkd->bhqk").unwrap();
    let q = random(&mut rng, &[2, 3, 4, 8]);
    let k = random(&mut rng, &[2, 3, 5, 8]);

    let scores = einsum(&notation, &[&q, &k]).unwrap();
    assert_eq!(scores.shape(), &[2, 3, 4, 5]);
    assert_abs_diff_eq!(scores, reference(&notation, &[&q, &k], None), epsilon = 1e-12);
}

#[test]
fn test_size_conflict_before_kernel() {
    let notation = parse_einsum("ij,ik->jk").unwrap();
    let a = ArrayD::<f64>::zeros(IxDyn(&[2, 3]));
    let b = ArrayD::<f64>::zeros(IxDyn(&[4, 5]));

    match einsum(&notation, &[&a, &b]) {
        Err(EinsumError::SizeMismatch { label, expected, got }) => {
            assert_eq!(label, "i");
            assert_eq!((expected, got), (2, 4));
        }
        other => panic!("expected size mismatch, got {:?}", other),
    }
}

#[test]
fn test_rank_mismatch() {
    let notation = parse_einsum("ijk->i").unwrap();
    let x = ArrayD::<f64>::zeros(IxDyn(&[2, 3]));

    let err = einsum(&notation, &[&x]).unwrap_err();
    assert!(matches!(err, EinsumError::RankMismatch { input: 0, expected: 3, got: 2, .. }));
}

#[test]
fn test_unbound_output_label() {
    let notation = parse_einsum("i->ik").unwrap();
    let x = array![1.0, 2.0].into_dyn();

    let err = einsum(&notation, &[&x]).unwrap_err();
    assert!(matches!(err, EinsumError::UnboundOutputLabel { ref label } if label == "k"));

    let sizes = SizeMap::new().with('k', 2);
    let y = einsum_with_sizes(&notation, &[&x], &sizes).unwrap();
    assert_eq!(y, array![[1.0, 1.0], [2.0, 2.0]].into_dyn());
}

#[test]
fn test_wrong_tensor_count() {
    let notation = parse_einsum("ij,jk->ik").unwrap();
    let a = ArrayD::<f64>::zeros(IxDyn(&[2, 2]));

    let err = einsum(&notation, &[&a]).unwrap_err();
    assert!(matches!(err, EinsumError::InvalidSpec { .. }));
}

#[test]
fn test_identity_law() {
    let mut rng = StdRng::seed_from_u64(1);
    for labels in ["", "i", "ij", "kji", "abcd"] {
        let notation = parse_einsum(&format!("{labels}->{labels}")).unwrap();
        let shape: Vec<usize> = (0..labels.len()).map(|axis| axis + 2).collect();
        let x = random(&mut rng, &shape);

        assert_eq!(einsum(&notation, &[&x]).unwrap(), x, "{labels}");
    }
}

#[test]
fn test_sum_then_repeat_is_not_identity() {
    let x = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
    let sizes = SizeMap::new().with('j', 2);

    let reduced = einsum(&parse_einsum("ij->i").unwrap(), &[&x]).unwrap();
    let repeated = einsum_with_sizes(&parse_einsum("i->ij").unwrap(), &[&reduced], &sizes).unwrap();

    assert_eq!(repeated, array![[3.0, 3.0], [7.0, 7.0]].into_dyn());
    assert_ne!(repeated, x);
}

#[test]
fn test_sum_then_repeat_of_constant_rows() {
    let x = array![[1.0, 1.0, 1.0], [5.0, 5.0, 5.0]].into_dyn();
    let sizes = SizeMap::new().with('j', 3);

    let reduced = einsum(&parse_einsum("ij->i").unwrap(), &[&x]).unwrap();
    let repeated = einsum_with_sizes(&parse_einsum("i->ij").unwrap(), &[&reduced], &sizes).unwrap();

    assert_eq!(repeated, x * 3.0);
}

#[test]
fn test_trace_is_sum_of_diagonal() {
    let mut rng = StdRng::seed_from_u64(5);
    let m = random(&mut rng, &[5, 5]);

    let trace = einsum(&parse_einsum("ii->").unwrap(), &[&m]).unwrap();
    let diag = einsum(&parse_einsum("ii->i").unwrap(), &[&m]).unwrap();
    let total = einsum(&parse_einsum("i->").unwrap(), &[&diag]).unwrap();

    assert_eq!(trace.ndim(), 0);
    assert_abs_diff_eq!(trace, total, epsilon = 1e-12);
}

#[test]
fn test_half_precision() {
    let notation = parse_einsum("ij,jk->ik").unwrap();
    let a = array![[1.0, 2.0], [3.0, 4.0]].mapv(f16::from_f32).into_dyn();
    let b = array![[5.0, 6.0], [7.0, 8.0]].mapv(f16::from_f32).into_dyn();

    let c = einsum(&notation, &[&a, &b]).unwrap();
    let slow = einsum_with_config(&notation, &[&a, &b], None, &EinsumConfig::reference()).unwrap();

    assert_eq!(c, array![[19.0, 22.0], [43.0, 50.0]].mapv(f16::from_f32).into_dyn());
    assert_eq!(c, slow);
}

#[test]
fn test_integer_labels_end_to_end() {
    let notation = EinsumNotation::from_labels(&[&[10u32, 20], &[20, 30]], &[30, 10]);
    let a = array![[1i64, 2], [3, 4]].into_dyn();
    let b = array![[5i64, 6], [7, 8]].into_dyn();

    assert_eq!(einsum(&notation, &[&a, &b]).unwrap(), array![[19, 43], [22, 50]].into_dyn());
}

#[test]
fn test_dispatch_observer_and_loop_switch() {
    let seen: Arc<Mutex<Vec<DispatchRecord>>> = Arc::default();
    let sink = Arc::clone(&seen);
    set_dispatch_observer(Some(Box::new(move |record: &DispatchRecord| {
        if let Ok(mut records) = sink.lock() {
            records.push(record.clone());
        }
    })));

    allow_loops(false);
    assert!(!loops_allowed());

    let x = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
    let fallback = einsum(&parse_einsum("ab,bc,cd->ad").unwrap(), &[&x, &x, &x]).unwrap();
    let kernel = einsum(&parse_einsum("ab->ba").unwrap(), &[&x]).unwrap();

    allow_loops(true);
    set_dispatch_observer(None);

    // Loops being disallowed only affects logging.
    assert_eq!(fallback, array![[37.0, 54.0], [81.0, 118.0]].into_dyn());
    assert_eq!(kernel, array![[1.0, 3.0], [2.0, 4.0]].into_dyn());

    let records = seen.lock().unwrap();
    assert!(records.contains(&DispatchRecord {
        notation: "ab,bc,cd->ad".to_string(),
        kind: OperationKind::Fallback,
    }));
    assert!(records.contains(&DispatchRecord {
        notation: "ab->ba".to_string(),
        kind: OperationKind::Permutation,
    }));
}

#[test]
fn test_notation_serde_roundtrip() {
    let notation = parse_einsum("bij,bjk->bik").unwrap();

    let json = serde_json::to_string(&notation).unwrap();
    let back: EinsumNotation<char> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, notation);

    let kind = serde_json::to_string(&OperationKind::SimpleBinary).unwrap();
    assert_eq!(kind, "\"SimpleBinary\"");
}
