//! Generic loop engine.
//!
//! Correct for every einsum, including those no kernel covers: three or more
//! inputs, multi-edges inside a binary einsum, repeated output labels and
//! output labels that no input carries.

mod einarray;
mod loop_einsum;

pub use einarray::{EinArray, EinIndexer};
pub use loop_einsum::{DEFAULT_PARALLEL_THRESHOLD, loop_einsum, loop_einsum_into};
