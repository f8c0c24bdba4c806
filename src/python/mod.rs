//! COSMO Python interface.
//!
//! This module implements the `cosmo_python` extension module using
//! [PyO3](https://pyo3.rs/).   To build these wrappers from `cargo`, compile the crate with
//! `--features python`.   This module has no public API.
//!
//! Problem matrices are taken from scipy sparse matrices, the cone as a
//! `dict[str, int]` and solver options as keyword arguments of `setup`.
//! Errors are raised as subclasses of `cosmo_python.CosmoError`.

mod cscmatrix_py;
pub(crate) mod io;
mod model_py;
mod module_py;

// NB : Nothing is actually public here, but the python module itself
// is made public so that we can force the docstring above to appear
// in the API documentation.

pub(crate) use cscmatrix_py::*;
pub(crate) use model_py::*;
