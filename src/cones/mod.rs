//! Cone specifications.
//!
//! The constraint rows `A x + s = b` are partitioned into convex cones by a
//! [`ConeSpec`], a mapping from a short cone key to the number of rows the
//! cone occupies.  Rows are always assigned in the canonical order of
//! [`ConeKind`], whatever order the keys were given in.

mod spec;
pub use spec::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Convex cone kinds recognised in a [`ConeSpec`].
///
/// Variants are declared in the canonical row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConeKind {
    /// The zero cone `{0}`, key `"f"` (alias `"z"`).
    #[serde(rename = "f")]
    Zero,
    /// The nonnegative orthant, key `"l"`.
    #[serde(rename = "l")]
    Nonnegative,
    /// A single second order cone, key `"q"`.
    #[serde(rename = "q")]
    SecondOrder,
    /// A single positive semidefinite cone in vectorised upper triangular
    /// form, key `"s"`.  The row count must be a triangular number.
    #[serde(rename = "s")]
    PsdTriangle,
    /// Primal exponential cones of three rows each, key `"ep"`.
    #[serde(rename = "ep")]
    Exponential,
    /// Dual exponential cones of three rows each, key `"ed"`.
    #[serde(rename = "ed")]
    DualExponential,
}

impl ConeKind {
    /// all kinds, in canonical row order
    pub const ALL: [ConeKind; 6] = [
        ConeKind::Zero,
        ConeKind::Nonnegative,
        ConeKind::SecondOrder,
        ConeKind::PsdTriangle,
        ConeKind::Exponential,
        ConeKind::DualExponential,
    ];

    /// The key used for this kind in a cone specification
    pub fn key(&self) -> &'static str {
        match self {
            ConeKind::Zero => "f",
            ConeKind::Nonnegative => "l",
            ConeKind::SecondOrder => "q",
            ConeKind::PsdTriangle => "s",
            ConeKind::Exponential => "ep",
            ConeKind::DualExponential => "ed",
        }
    }

    // check that `size` rows can be covered by cones of this kind
    fn check_size(&self, size: usize) -> Result<(), ConeSpecError> {
        let reason = match self {
            ConeKind::PsdTriangle if !is_triangular(size) => "must be a triangular number",
            ConeKind::Exponential | ConeKind::DualExponential if size % 3 != 0 => {
                "must be a multiple of 3"
            }
            _ => return Ok(()),
        };
        Err(ConeSpecError::BadSize {
            kind: *self,
            size,
            reason,
        })
    }
}

impl fmt::Display for ConeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ConeKind {
    type Err = ConeSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f" | "z" => Ok(ConeKind::Zero),
            "l" => Ok(ConeKind::Nonnegative),
            "q" => Ok(ConeKind::SecondOrder),
            "s" => Ok(ConeKind::PsdTriangle),
            "ep" => Ok(ConeKind::Exponential),
            "ed" => Ok(ConeKind::DualExponential),
            _ => Err(ConeSpecError::UnknownKind(s.to_string())),
        }
    }
}

/// A single cone occupying `dim` consecutive constraint rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConeBlock {
    pub kind: ConeKind,
    pub dim: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned when a cone specification is malformed or does not
/// partition the constraint rows.
pub enum ConeSpecError {
    #[error("unrecognized cone kind \"{0}\" (expected one of {keys})", keys = key_list())]
    UnknownKind(String),
    #[error("cone kind \"{0}\" given more than once")]
    Duplicate(ConeKind),
    #[error("size {size} for cone kind \"{kind}\" {reason}")]
    BadSize {
        kind: ConeKind,
        size: usize,
        reason: &'static str,
    },
    #[error("cone sizes sum to {found} but the constraint matrix has {expected} rows")]
    RowCount { expected: usize, found: usize },
    #[error("cone sizes sum to more rows than can be addressed")]
    RowOverflow,
}

fn key_list() -> String {
    use itertools::Itertools;
    ConeKind::ALL.iter().map(|k| format!("\"{}\"", k)).join(", ")
}

// size == k(k+1)/2 for some k, with k within one of sqrt(2 size)
fn is_triangular(size: usize) -> bool {
    let k = (2.0 * size as f64).sqrt() as usize;
    (k.saturating_sub(1)..=k + 1)
        .any(|k| k.checked_mul(k + 1).map_or(false, |t| t / 2 == size))
}
