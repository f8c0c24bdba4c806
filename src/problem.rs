#![allow(non_snake_case)]

use crate::algebra::{CscMatrix, SparseFormatError};
use crate::cones::ConeSpec;
use crate::error::ModelError;

/// Problem dimensions: `n` variables and `m` constraint rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub n: usize,
    pub m: usize,
}

/// A validated copy of the problem
///
/// $$
/// \begin{array}{rl}
/// \text{minimize} & \frac{1}{2}x^T P x + q^T x\\\\\[2ex\]
///  \text{subject to} & Ax + s = b \\\\\[1ex\]
///         & s \in \mathcal{K}
///  \end{array}
/// $$
///
/// where the cone $\mathcal{K}$ is described by a [`ConeSpec`].  Holding a
/// `ProblemData` guarantees that all dimensions agree, both matrices are in
/// valid CSC format and `P` is symmetric.
#[derive(Debug, Clone)]
pub struct ProblemData {
    P: CscMatrix<f64>,
    q: Vec<f64>,
    A: CscMatrix<f64>,
    b: Vec<f64>,
    cone: ConeSpec,
}

impl ProblemData {
    /// Validate and copy problem data.
    ///
    /// Checks are made in a fixed order and the first failure is returned:
    /// matrix formats, `P` square, `q`, columns of `A`, `b`, cone row
    /// coverage and finally symmetry of `P`.
    pub fn new(
        P: &CscMatrix<f64>,
        q: &[f64],
        A: &CscMatrix<f64>,
        b: &[f64],
        cone: &ConeSpec,
    ) -> Result<Self, ModelError> {
        check_format("P", P)?;
        check_format("A", A)?;

        let n = P.n;
        check_dim("rows of P", n, P.m)?;
        check_dim("length of q", n, q.len())?;
        check_dim("columns of A", n, A.n)?;
        check_dim("length of b", A.m, b.len())?;

        cone.check_rows(A.m)?;

        if !P.is_symmetric() {
            return Err(ModelError::InvalidMatrix {
                name: "P",
                source: SparseFormatError::NotSymmetric,
            });
        }

        Ok(Self {
            P: P.clone(),
            q: q.to_vec(),
            A: A.clone(),
            b: b.to_vec(),
            cone: cone.clone(),
        })
    }

    pub fn dims(&self) -> Dims {
        Dims {
            n: self.P.n,
            m: self.A.m,
        }
    }

    /// quadratic cost, full symmetric storage
    pub fn P(&self) -> &CscMatrix<f64> {
        &self.P
    }

    pub fn q(&self) -> &[f64] {
        &self.q
    }

    pub fn A(&self) -> &CscMatrix<f64> {
        &self.A
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    pub fn cone(&self) -> &ConeSpec {
        &self.cone
    }
}

fn check_format(name: &'static str, M: &CscMatrix<f64>) -> Result<(), ModelError> {
    M.check_format()
        .map_err(|source| ModelError::InvalidMatrix { name, source })
}

pub(crate) fn check_dim(what: &'static str, expected: usize, found: usize) -> Result<(), ModelError> {
    if expected != found {
        return Err(ModelError::DimensionMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}
