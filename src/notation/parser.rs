//! Einsum notation parser.
//!
//! Parses strings like "ij,jk->ik" into structured [`EinsumNotation`] with
//! `char` labels. Nested (parenthesized) expressions are built with
//! [`NestedEinsum`](crate::launch::NestedEinsum) instead.

use super::notation::EinsumNotation;
use super::subscript::Subscript;
use crate::error::{EinsumError, EinsumResult};

/// Parses a flat einsum notation string.
///
/// # Grammar
///
/// ```text
/// einsum      ::= inputs '->' output | inputs
/// inputs      ::= subscript (',' subscript)*
/// output      ::= subscript
/// subscript   ::= label*
/// label       ::= [a-zA-Z] | [α-ω]
/// ```
///
/// # Examples
///
/// ```ignore
/// let notation = parse_einsum("ij,jk->ik")?;  // Matrix multiply
/// let notation = parse_einsum("ii->")?;       // Trace
/// let notation = parse_einsum("ij,jk")?;      // Implicit output
/// ```
pub fn parse_einsum(notation: &str) -> EinsumResult<EinsumNotation<char>> {
    let notation = notation.trim();

    if notation.is_empty() {
        return Err(EinsumError::parse("empty notation"));
    }

    // Split into inputs and output
    let (inputs_str, output_str) = match notation.find("->") {
        Some(arrow_pos) => (&notation[..arrow_pos], Some(&notation[arrow_pos + 2..])),
        None => (notation, None),
    };

    // An empty input list is one scalar input; zero tensors cannot be written.
    let inputs = inputs_str
        .split(',')
        .map(|input_str| parse_subscript(input_str.trim()))
        .collect::<EinsumResult<Vec<_>>>()?;

    // Parse or infer output subscript
    let output = match output_str {
        Some(out_str) => parse_subscript(out_str.trim())?,
        None => infer_output(&inputs),
    };

    Ok(EinsumNotation::new(inputs, output))
}

/// Parses a single subscript string.
fn parse_subscript(s: &str) -> EinsumResult<Subscript<char>> {
    let mut subscript = Subscript::new();

    for c in s.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | 'α'..='ω' => subscript.push(c),
            // Whitespace is ignored
            ' ' | '\t' => continue,
            _ => {
                return Err(EinsumError::parse(format!(
                    "invalid character '{}' in subscript '{}'",
                    c, s
                )));
            }
        }
    }

    Ok(subscript)
}

/// Infers the output subscript when not explicitly provided.
///
/// Labels appearing exactly once across all inputs are kept, sorted.
fn infer_output(inputs: &[Subscript<char>]) -> Subscript<char> {
    let mut counts: hashbrown::HashMap<char, usize> = hashbrown::HashMap::new();

    for input in inputs {
        for &c in input {
            *counts.entry(c).or_insert(0) += 1;
        }
    }

    let mut output_labels: Vec<char> = counts
        .iter()
        .filter(|&(_, count)| *count == 1)
        .map(|(&c, _)| c)
        .collect();
    output_labels.sort_unstable();

    Subscript::from(output_labels)
}
