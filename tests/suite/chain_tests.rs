//! Tests for chain contractions (nested trees of einsums).

use einsum_rules::notation::{SizeMap, parse_einsum};
use einsum_rules::{EinsumConfig, EinsumError, NestedEinsum, einsum, einsum_with_sizes};
use ndarray::{Array, ArrayD, IxDyn};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random(rng: &mut StdRng, shape: &[usize]) -> ArrayD<i64> {
    let len = shape.iter().product();
    Array::from_shape_vec(IxDyn(shape), (0..len).map(|_| rng.gen_range(-4..=4)).collect()).unwrap()
}

fn node(args: Vec<NestedEinsum<char>>, s: &str) -> NestedEinsum<char> {
    NestedEinsum::node(args, parse_einsum(s).unwrap())
}

#[test]
fn test_matrix_chain_matches_flat() {
    let mut rng = StdRng::seed_from_u64(7);
    let a = random(&mut rng, &[3, 4]);
    let b = random(&mut rng, &[4, 5]);
    let c = random(&mut rng, &[5, 2]);

    // A (B C)
    let tree = node(
        vec![NestedEinsum::leaf(0), node(vec![NestedEinsum::leaf(1), NestedEinsum::leaf(2)], "jk,kl->jl")],
        "ij,jl->il",
    );

    let nested: ArrayD<i64> = tree.evaluate(&[&a, &b, &c], None).unwrap();
    let flat = einsum(&tree.flatten().unwrap(), &[&a, &b, &c]).unwrap();

    assert_eq!(tree.flatten().unwrap(), parse_einsum("ij,jk,kl->il").unwrap());
    assert_eq!(nested, flat);
}

#[test]
fn test_tensor_network_matches_flat() {
    let mut rng = StdRng::seed_from_u64(11);
    let a = random(&mut rng, &[2, 3, 2]);
    let b = random(&mut rng, &[3, 4]);
    let c = random(&mut rng, &[4, 2, 3]);

    // (A B) C with a trace-like closing of the loop over `i` and `l`.
    let tree = node(
        vec![node(vec![NestedEinsum::leaf(0), NestedEinsum::leaf(1)], "ijk,jm->ikm"), NestedEinsum::leaf(2)],
        "ikm,mil->kl",
    );

    let nested: ArrayD<i64> = tree.evaluate(&[&a, &b, &c], None).unwrap();
    let flat = einsum(&tree.flatten().unwrap(), &[&a, &b, &c]).unwrap();

    assert_eq!(nested.shape(), &[2, 3]);
    assert_eq!(nested, flat);
}

#[test]
fn test_nested_with_unbound_output_label() {
    let a = ArrayD::from_elem(IxDyn(&[2]), 1i64);
    let b = ArrayD::from_elem(IxDyn(&[2]), 3i64);
    let sizes = SizeMap::new().with('z', 3);

    let tree = node(
        vec![node(vec![NestedEinsum::leaf(0), NestedEinsum::leaf(1)], "i,i->"), NestedEinsum::leaf(0)],
        ",i->iz",
    );

    let nested: ArrayD<i64> = tree.evaluate(&[&a, &b], Some(&sizes)).unwrap();
    assert_eq!(nested, ArrayD::from_elem(IxDyn(&[2, 3]), 6));

    // Leaf 0 is referenced twice, so there is no flat equivalent.
    assert!(tree.flatten().is_err());
}

#[test]
fn test_flat_with_unbound_output_label() {
    let a = ArrayD::from_elem(IxDyn(&[2]), 2i64);
    let sizes = SizeMap::new().with('z', 2);

    let tree = node(vec![NestedEinsum::leaf(0)], "i->zi");
    let nested: ArrayD<i64> = tree.evaluate(&[&a], Some(&sizes)).unwrap();
    let flat = einsum_with_sizes(&tree.flatten().unwrap(), &[&a], &sizes).unwrap();

    assert_eq!(nested, flat);
    assert_eq!(flat.shape(), &[2, 2]);
}

#[test]
fn test_nested_reference_config() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = random(&mut rng, &[3, 3]);
    let b = random(&mut rng, &[3, 3]);

    let tree = node(
        vec![node(vec![NestedEinsum::leaf(0)], "ii->i"), NestedEinsum::leaf(1)],
        "i,ij->j",
    );

    let fast: ArrayD<i64> = tree.evaluate(&[&a, &b], None).unwrap();
    let slow: ArrayD<i64> = tree.evaluate_with_config(&[&a, &b], None, &EinsumConfig::reference()).unwrap();
    assert_eq!(fast, slow);
}

#[test]
fn test_nested_size_conflict_propagates() {
    let a = ArrayD::<i64>::zeros(IxDyn(&[2, 3]));
    let b = ArrayD::<i64>::zeros(IxDyn(&[4, 5]));

    let tree = node(vec![NestedEinsum::leaf(0), NestedEinsum::leaf(1)], "ij,jk->ik");
    let err = tree.evaluate(&[&a, &b], None).unwrap_err();

    assert!(matches!(err, EinsumError::SizeMismatch { ref label, expected: 3, got: 4 } if label == "j"));
}
