//! Error types for einsum operations.

use crate::pattern::OperationKind;

/// Errors that can occur while resolving and evaluating an einsum.
///
/// Labels are carried as their `Display` rendering so the error type stays
/// independent of the label type.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EinsumError {
    /// Invalid einsum notation syntax.
    #[error("parse error: {message}")]
    ParseError { message: String },

    /// A label sequence does not have one label per tensor axis.
    #[error("input {input}: labels `{labels}` describe {expected} axes, tensor has {got}")]
    RankMismatch {
        input: usize,
        labels: String,
        expected: usize,
        got: usize,
    },

    /// Two occurrences of the same label disagree on the dimension size.
    #[error("size mismatch for label '{label}': {expected} vs {got}")]
    SizeMismatch {
        label: String,
        expected: usize,
        got: usize,
    },

    /// A caller-supplied output buffer does not have the result's shape.
    #[error("output buffer has shape {got:?}, the einsum produces {expected:?}")]
    OutputShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Output label absent from every input and from the explicit size map.
    #[error("output label '{label}' does not appear in any input and has no explicit size")]
    UnboundOutputLabel { label: String },

    /// Structurally invalid specification (arity, tree shape, ...).
    #[error("invalid einsum specification: {message}")]
    InvalidSpec { message: String },

    /// A kernel was asked to evaluate a notation outside its precondition.
    ///
    /// This is never user-triggered: it means the classifier and a kernel disagree.
    #[error("kernel `{kind}` cannot evaluate `{notation}`: classifier and kernel disagree")]
    ContractViolation {
        kind: OperationKind,
        notation: String,
    },

    /// Reshape failure inside a kernel.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl EinsumError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            message: message.into(),
        }
    }

    pub fn contract_violation(kind: OperationKind, notation: impl ToString) -> Self {
        Self::ContractViolation {
            kind,
            notation: notation.to_string(),
        }
    }

    /// Returns true for errors that indicate a defect rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::ContractViolation { .. } | Self::Shape(_))
    }
}

/// Result type for einsum operations.
pub type EinsumResult<T> = core::result::Result<T, EinsumError>;
