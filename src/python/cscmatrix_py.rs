#![allow(non_snake_case)]

use crate::algebra::CscMatrix;
use core::ops::Deref;
use pyo3::prelude::*;

//We can't implement the foreign trait FromPyObject directly on CscMatrix
//since it is outside the crate, so put a dummy wrapper around it here.
pub struct PyCscMatrix(CscMatrix<f64>);

impl Deref for PyCscMatrix {
    type Target = CscMatrix<f64>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<PyCscMatrix> for CscMatrix<f64> {
    fn from(mat: PyCscMatrix) -> Self {
        mat.0
    }
}

impl<'a> FromPyObject<'a> for PyCscMatrix {
    fn extract_bound(obj: &Bound<'a, PyAny>) -> PyResult<Self> {
        // accept any scipy sparse format.  tocsc() may return the caller's
        // own object, so canonicalize a copy
        let csc = obj.call_method0("tocsc")?.call_method0("copy")?;
        csc.call_method0("sum_duplicates")?;

        let nzval: Vec<f64> = csc.getattr("data")?.extract()?;
        let rowval: Vec<usize> = csc.getattr("indices")?.extract()?;
        let colptr: Vec<usize> = csc.getattr("indptr")?.extract()?;
        let (m, n): (usize, usize) = csc.getattr("shape")?.extract()?;

        // malformed data is reported by the model's format checks
        Ok(PyCscMatrix(CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }))
    }
}
