//! Sparse matrix types and the floating point trait used throughout the crate.
//!
//! Only the handful of operations needed to validate and forward problem data
//! are provided here.  All numerical work happens inside the solver engine.

#![allow(non_snake_case)]

mod csc;
mod error_types;
mod floats;

pub use csc::*;
pub use error_types::*;
pub use floats::*;
