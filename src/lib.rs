//! # einsum-rules
//!
//! Einstein summation over dense tensors by rule classification.
//!
//! ## Features
//!
//! - Einsum model generic over the label type (`char`, integers, ...)
//! - Structural classifier picking the cheapest applicable rule
//! - Specialised kernels on `ndarray` (transpose, trace, sum, broadcast,
//!   diagonals, pairwise contractions)
//! - Lazy loop engine evaluating any einsum, used when no rule applies
//! - Backend-specific kernel overrides through [`EinTensor`]
//! - Nested contraction trees
//!
//! ## Example
//!
//! ```ignore
//! use einsum_rules::{einsum, parse_einsum};
//!
//! // Matrix multiplication
//! let c = einsum(&parse_einsum("ij,jk->ik")?, &[&a, &b])?;
//!
//! // Batched attention scores
//! let scores = einsum(&parse_einsum("bhqd,bhkd->bhqk")?, &[&queries, &keys])?;
//! ```

pub mod error;
pub mod fallback;
pub mod kernels;
pub mod launch;
pub mod notation;
pub mod pattern;

pub use error::{EinsumError, EinsumResult};
pub use fallback::{EinArray, loop_einsum, loop_einsum_into};
pub use kernels::Element;
pub use launch::{
    DispatchRecord, EinTensor, EinsumConfig, NestedEinsum, allow_loops, einsum, einsum_into,
    einsum_with_config, einsum_with_sizes, loops_allowed, set_dispatch_observer,
};
pub use notation::{EinsumNotation, Label, SizeMap, Subscript, parse_einsum, resolve_sizes};
pub use pattern::{BinaryPattern, OperationKind, classify, matches_kind};
