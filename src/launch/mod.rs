//! Launch module for einsum operations.
//!
//! Provides the high-level API: evaluation of flat and nested einsums over
//! any [`EinTensor`] backend.

mod backend;
mod config;
mod executor;
mod nested;

pub use backend::EinTensor;
pub use config::{
    DispatchObserver, DispatchRecord, EinsumConfig, allow_loops, loops_allowed, set_dispatch_observer,
};
pub use executor::{einsum, einsum_into, einsum_with_config, einsum_with_sizes};
pub use nested::NestedEinsum;
