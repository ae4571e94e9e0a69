//! Einsum specification model.
//!
//! - [`Label`]: the token naming one axis
//! - [`Subscript`]: the labels of one tensor
//! - [`EinsumNotation`]: inputs plus output, the full specification
//! - [`SizeMap`] / [`resolve_sizes`]: label sizes checked against concrete shapes
//! - [`parse_einsum`]: `"ij,jk->ik"` strings into `char`-labelled notation

mod label;
mod notation;
mod parser;
mod sizes;
mod subscript;

pub use label::{Label, all_unique, keeps_order, same_label_set, unique_labels};
pub use notation::EinsumNotation;
pub use parser::parse_einsum;
pub use sizes::{SizeMap, output_shape, resolve_sizes};
pub use subscript::Subscript;
