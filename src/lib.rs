//! __cosmo__ is a Rust interface to [COSMO.jl](https://github.com/oxfordcontrol/COSMO.jl),
//! a conic operator splitting solver for convex optimization problems of the form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T P x + q^T x\\\\\[2ex\]
//!  \text{subject to} & Ax + s = b \\\\\[1ex\]
//!         & s \in \mathcal{K}
//!  \end{array}
//! $$
//!
//! with decision variables
//! $x \in \mathbb{R}^n$,
//! $s \in \mathbb{R}^m$
//! and data matrices
//! $P=P^\top \succeq 0$,
//! $q \in \mathbb{R}^n$,
//! $A \in \mathbb{R}^{m \times n}$, and
//! $b \in \mathbb{R}^m$.
//! The convex set $\mathcal{K}$ is a composition of convex cones described by a
//! [`ConeSpec`].
//!
//! A [`Model`] holds one problem.  By default the numerical work is done by
//! COSMO.jl inside a Julia runtime shared by the whole process (see
//! [`engine::julia`]).  The runtime needs a Julia installation with the `COSMO`
//! and `JSON` packages; the executable and project can be chosen with the
//! `COSMO_JULIA` and `COSMO_JULIA_PROJECT` environment variables.  An
//! in-process engine based on Clarabel is available as
//! [`ClarabelEngine`](engine::ClarabelEngine) for problems it supports.
//!
//! # Python interface
//!
//! Built with the `python` feature, the crate is also the `cosmo_python`
//! extension module.
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

pub mod algebra;
pub mod cones;
pub mod engine;
mod error;
pub mod io;
mod model;
pub mod problem;
mod settings;

#[cfg(feature = "python")]
pub mod python;

pub use algebra::CscMatrix;
pub use cones::{ConeKind, ConeSpec, ConeSpecError};
pub use engine::{AnyEngine, SolverEngine, SolverStatus};
pub use error::ModelError;
pub use model::Model;
pub use settings::{Settings, SettingsBuilder, SettingsBuilderError, SettingsError};
