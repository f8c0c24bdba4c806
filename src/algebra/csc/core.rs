#![allow(non_snake_case)]

use crate::algebra::{FloatT, SparseFormatError};
use itertools::izip;

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use cosmo::algebra::CscMatrix;
///
/// let A : CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 //colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        //rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], //nzval
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
///
/// ```
///
/// The fields are public so that data arriving from a foreign caller can be
/// wrapped without the assertions made by [`new`](CscMatrix::new).  Such
/// data should be checked with [`check_format`](CscMatrix::check_format)
/// before use.

#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer.
    ///
    /// Ths field should have length `n+1`. The last entry corresponds
    /// to the the number of nonzeros and should agree with the lengths
    /// of the `rowval` and `nzval` fields.
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.   This constructor does __not__
    /// ensure that rows indices are all in bounds or that data is arranged
    /// such that entries within each column appear in order of increasing
    /// row index.   Responsibility for ensuring these conditions hold
    /// is left to the caller.
    ///
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// allocate space for a sparse matrix with `nnz` elements
    ///
    /// To make an m x n matrix of zeros, use
    /// ```no_run
    /// use cosmo::algebra::CscMatrix;
    /// let m = 3;
    /// let n = 4;
    /// let A : CscMatrix<f64> = CscMatrix::spalloc(m,n,0);
    /// ```
    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::zero(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// Build from dense row-major data, keeping only the nonzero entries.
    ///
    /// ```no_run
    /// use cosmo::algebra::CscMatrix;
    /// let P = CscMatrix::from_rows(&[[4., 1.], [1., 2.]]);
    /// assert_eq!(P.nnz(), 4);
    /// ```
    pub fn from_rows<const N: usize>(rows: &[[T; N]]) -> Self {
        let m = rows.len();
        let mut colptr = Vec::with_capacity(N + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();

        colptr.push(0);
        for col in 0..N {
            for (row, data) in rows.iter().enumerate() {
                if data[col] != T::zero() {
                    rowval.push(row);
                    nzval.push(data[col]);
                }
            }
            colptr.push(rowval.len());
        }
        CscMatrix::new(m, N, colptr, rowval, nzval)
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// (rows, columns)
    pub fn size(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    /// true if the matrix has as many rows as columns
    pub fn is_square(&self) -> bool {
        self.m == self.n
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.is_empty()
            || (self.colptr.len() - 1) != self.n
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        //check for colptr monotonicity
        if self.colptr[0] != 0 || self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        //check for rowval monotonicity within each column
        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            if self.rowval[rng].windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowOrdering);
            }
        }
        //check for row values out of bounds
        if !self.rowval.iter().all(|r| r < &self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        Ok(())
    }

    /// Allocates a new matrix containing only entries from the upper triangular part
    ///
    /// # Panics
    /// Panics if the matrix is not square.
    pub fn to_triu(&self) -> Self {
        assert_eq!(self.m, self.n);
        let (m, n) = (self.m, self.n);
        let mut colptr = vec![0; n + 1];
        let mut rowval = Vec::with_capacity(self.nnz());
        let mut nzval = Vec::with_capacity(self.nnz());

        for col in 0..n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            for (&row, &val) in izip!(&self.rowval[rng.clone()], &self.nzval[rng]) {
                if row <= col {
                    rowval.push(row);
                    nzval.push(val);
                }
            }
            colptr[col + 1] = rowval.len();
        }
        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// True if the matrix is upper triangular
    pub fn is_triu(&self) -> bool {
        // check lower triangle for any structural entries, regardless
        // of the values that may be assigned to them
        (0..self.n).all(|col| {
            let rows = &self.rowval[self.colptr[col]..self.colptr[col + 1]];
            rows.iter().all(|&row| row <= col)
        })
    }

    /// True if the matrix is square and equal to its transpose.
    ///
    /// A structural entry holding an explicit zero matches a missing
    /// entry in the transposed position.  Assumes `check_format` passes.
    pub fn is_symmetric(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        (0..self.n).all(|col| {
            let rng = self.colptr[col]..self.colptr[col + 1];
            izip!(&self.rowval[rng.clone()], &self.nzval[rng]).all(|(&row, &val)| {
                let mirror = self.get_entry((col, row)).unwrap_or_else(T::zero);
                mirror == val
            })
        })
    }

    /// Returns the value at the given (row,col) index as an Option.
    /// Returns None if the given index is not a structural nonzero.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        let (row, col) = idx;
        assert!(row < self.m && col < self.n);

        let first = self.colptr[col];
        let last = self.colptr[col + 1];
        let rows_in_this_column = &self.rowval[first..last];
        match rows_in_this_column.binary_search(&row) {
            Ok(idx) => Some(self.nzval[first + idx]),
            Err(_) => None,
        }
    }
}

#[test]
fn test_csc_get_entry() {
    // A =
    //[ ⋅   4.0    ⋅    ⋅   12.0]
    //[1.0  5.0    ⋅    ⋅     ⋅ ]
    //[ ⋅   6.0    ⋅    ⋅   13.0]
    //[2.0  7.0  10.0   ⋅     ⋅ ]
    //[ ⋅   8.0  11.0   ⋅   14.0]
    //[3.0  9.0    ⋅    ⋅     ⋅ ]

    let A = CscMatrix::new(
        6,                                                                 // m
        5,                                                                 // n
        vec![0, 3, 9, 11, 11, 14],                                         // colptr
        vec![1, 3, 5, 0, 1, 2, 3, 4, 5, 3, 4, 0, 2, 4],                    // rowval
        vec![1., 2., 3., 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14.], // nzval
    );

    assert_eq!(A.get_entry((1, 0)).unwrap(), 1.);
    assert_eq!(A.get_entry((5, 1)).unwrap(), 9.);
    assert_eq!(A.get_entry((4, 4)).unwrap(), 14.);

    assert!(A.get_entry((0, 0)).is_none());
    assert!(A.get_entry((1, 3)).is_none());
    assert!(A.check_format().is_ok());
}

#[test]
fn test_csc_from_rows() {
    let A = CscMatrix::from_rows(&[[1., 1.], [1., 0.], [0., 1.]]);
    assert_eq!(A.size(), (3, 2));
    assert_eq!(A.colptr, vec![0, 2, 4]);
    assert_eq!(A.rowval, vec![0, 1, 0, 2]);
    assert_eq!(A.nzval, vec![1., 1., 1., 1.]);
}

#[test]
fn test_csc_check_format() {
    let mut A = CscMatrix::from_rows(&[[1., 2.], [3., 4.]]);
    assert!(A.check_format().is_ok());

    A.rowval.swap(0, 1);
    assert_eq!(A.check_format(), Err(SparseFormatError::BadRowOrdering));

    let mut B = CscMatrix::from_rows(&[[1., 2.], [3., 4.]]);
    B.rowval[3] = 2;
    assert_eq!(B.check_format(), Err(SparseFormatError::BadRowval));

    let mut C = CscMatrix::from_rows(&[[1., 2.], [3., 4.]]);
    C.colptr = vec![0, 5, 4];
    assert_eq!(C.check_format(), Err(SparseFormatError::BadColptr));

    let mut D = CscMatrix::from_rows(&[[1., 2.], [3., 4.]]);
    D.nzval.pop();
    assert_eq!(D.check_format(), Err(SparseFormatError::IncompatibleDimension));
}

#[test]
fn test_csc_triu_and_symmetry() {
    let P = CscMatrix::from_rows(&[[4., 1.], [1., 2.]]);
    assert!(P.is_symmetric());
    assert!(!P.is_triu());

    let U = P.to_triu();
    assert!(U.is_triu());
    assert_eq!(U.colptr, vec![0, 1, 3]);
    assert_eq!(U.rowval, vec![0, 0, 1]);
    assert_eq!(U.nzval, vec![4., 1., 2.]);
    assert!(!U.is_symmetric());

    let N = CscMatrix::from_rows(&[[4., 1.], [3., 2.]]);
    assert!(!N.is_symmetric());

    // explicit zeros mirror missing entries
    let Z = CscMatrix::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1., 0., 1.]);
    assert!(Z.is_symmetric());

    let R = CscMatrix::<f64>::spalloc(2, 3, 0);
    assert!(!R.is_symmetric());
}
