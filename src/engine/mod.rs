//! The boundary between a [`Model`](crate::Model) and the solver that does the
//! numerical work.
//!
//! An engine owns at most one solver workspace.  The workspace is created by
//! [`configure`](SolverEngine::configure) and released when the engine is
//! dropped.  Two engines are provided:
//!
//! * [`JuliaEngine`], forwarding to COSMO.jl in a process-wide Julia runtime,
//! * [`ClarabelEngine`], an in-process interior point solver useful where no
//!   Julia installation is available.
//!
//! Other implementations (e.g. test doubles) can be used through
//! [`Model::with_engine`](crate::Model::with_engine).

use crate::problem::ProblemData;
use crate::settings::Settings;
use enum_dispatch::enum_dispatch;
use thiserror::Error;

pub mod clarabel;
pub mod julia;
mod solution;

pub use self::clarabel::ClarabelEngine;
pub use julia::JuliaEngine;
pub use solution::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by engines.  Messages from the external solver are
/// carried verbatim.
pub enum EngineError {
    /// The engine rejected the problem or its options
    #[error("{0}")]
    Initialization(String),
    /// The engine failed or is unavailable
    #[error("{0}")]
    Runtime(String),
}

/// Initial guess for the next solve.  `s` (slacks) and `y` (duals) are
/// optional and have the constraint dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarmStart {
    pub x: Vec<f64>,
    pub s: Option<Vec<f64>>,
    pub y: Option<Vec<f64>>,
}

/// Capabilities a solver must provide to back a [`Model`](crate::Model).
///
/// Calls arrive in lifecycle order: `configure` exactly once, then any mix of
/// `set_initial_guess` and `run`, with `read_result` after each `run`.  Input
/// has already been validated when it reaches the engine.
#[enum_dispatch]
pub trait SolverEngine {
    /// Create the solver workspace for `problem`.
    fn configure(&mut self, problem: &ProblemData, settings: &Settings) -> Result<(), EngineError>;

    /// Store an initial guess, replacing any previous one.
    fn set_initial_guess(&mut self, guess: &WarmStart) -> Result<(), EngineError>;

    /// Run the solver to termination.
    fn run(&mut self) -> Result<(), EngineError>;

    /// Result of the most recent `run`.
    fn read_result(&mut self) -> Result<SolveResult, EngineError>;
}

/// The engines shipped with this crate.
#[enum_dispatch(SolverEngine)]
#[derive(Debug)]
pub enum AnyEngine {
    JuliaEngine,
    ClarabelEngine,
}

impl AnyEngine {
    /// Engine selected by name, `"julia"` or `"clarabel"`.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "julia" => Ok(JuliaEngine::new().into()),
            "clarabel" => Ok(ClarabelEngine::new().into()),
            _ => Err(EngineError::Initialization(format!(
                "unknown engine \"{}\" (expected \"julia\" or \"clarabel\")",
                name
            ))),
        }
    }
}

impl Default for AnyEngine {
    fn default() -> Self {
        JuliaEngine::new().into()
    }
}
