//! Equality policy for candidate and reference outputs
//!
//! Everything compares exactly except floats, which match within a
//! relative tolerance. The tolerance applies at any depth, so floats
//! nested inside lists and tuples are treated the same as top-level ones.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{format_case, TestCase, Value};

/// Default relative tolerance for float comparison
pub const DEFAULT_REL_TOL: f64 = 1e-9;

/// What one side of a case produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Observation {
    /// Return value of a value-returning function
    Value(Value),
    /// Printed text of a print-only function
    Text(String),
    /// Output plus argument state of a destructive function
    Mutated {
        /// Return value, or printed text as a string for print-only functions
        output: Value,
        /// Arguments after the call
        arguments: TestCase,
    },
    /// The call panicked
    Error(String),
}

impl Observation {
    /// Whether the call failed
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Mutated { output, arguments } if output.is_none() => {
                write!(f, "{}", format_case(arguments))
            }
            Self::Mutated { output, arguments } => {
                write!(f, "{output} with {}", format_case(arguments))
            }
            Self::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

/// Whether two floats are equal within `rel_tol`
///
/// Identical values (including matching infinities) and two NaNs match.
#[must_use]
pub fn floats_match(a: f64, b: f64, rel_tol: f64) -> bool {
    if a == b || (a.is_nan() && b.is_nan()) {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= rel_tol * a.abs().max(b.abs())
}

/// Whether two values are equal under the tolerance policy
#[must_use]
pub fn values_match(expected: &Value, actual: &Value, rel_tol: f64) -> bool {
    match (expected, actual) {
        (Value::Float(a), Value::Float(b)) => floats_match(*a, *b, rel_tol),
        (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
            sequences_match(a, b, rel_tol)
        }
        _ => expected == actual,
    }
}

fn sequences_match(expected: &[Value], actual: &[Value], rel_tol: f64) -> bool {
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual)
            .all(|(e, a)| values_match(e, a, rel_tol))
}

/// Whether two observations are equal under the tolerance policy
///
/// Errors never match anything, not even an identical error.
#[must_use]
pub fn observations_match(expected: &Observation, actual: &Observation, rel_tol: f64) -> bool {
    match (expected, actual) {
        (Observation::Value(e), Observation::Value(a)) => values_match(e, a, rel_tol),
        (Observation::Text(e), Observation::Text(a)) => e == a,
        (
            Observation::Mutated {
                output: e_out,
                arguments: e_args,
            },
            Observation::Mutated {
                output: a_out,
                arguments: a_args,
            },
        ) => values_match(e_out, a_out, rel_tol) && sequences_match(e_args, a_args, rel_tol),
        _ => false,
    }
}
