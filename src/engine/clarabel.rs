//! In-process engine backed by the Clarabel interior point solver.
//!
//! Clarabel solves the same problem class (`A x + s = b`, `s ∈ K`) without a
//! Julia installation.  Only the options and cones with a direct Clarabel
//! counterpart are accepted.

#![allow(non_snake_case)]

use super::{EngineError, ResultTimes, SolveResult, SolverEngine, SolverStatus, WarmStart};
use crate::algebra::CscMatrix;
use crate::cones::ConeKind;
use crate::problem::ProblemData;
use crate::settings::Settings;
use ::clarabel::algebra as cl_algebra;
use ::clarabel::solver::{
    DefaultSettings, DefaultSettingsBuilder, DefaultSolver, IPSolver, SupportedConeT,
};

/// KKT solver name accepted by this engine
const QDLDL_KKT_SOLVER: &str = "QdldlKKTSolver";

/// Engine running Clarabel in the host process.
///
/// Warm starts are accepted and ignored, since interior point methods do not
/// benefit from a primal starting point.
#[derive(Default)]
pub struct ClarabelEngine {
    solver: Option<DefaultSolver<f64>>,
    guess: Option<WarmStart>,
}

impl std::fmt::Debug for ClarabelEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClarabelEngine")
            .field("configured", &self.solver.is_some())
            .field("guess", &self.guess)
            .finish()
    }
}

impl ClarabelEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent initial guess.  Stored for inspection only.
    pub fn initial_guess(&self) -> Option<&WarmStart> {
        self.guess.as_ref()
    }

    fn solver(&mut self) -> Result<&mut DefaultSolver<f64>, EngineError> {
        self.solver
            .as_mut()
            .ok_or_else(|| EngineError::Runtime("Clarabel solver has not been configured".to_string()))
    }
}

// the solver constructor became fallible in later clarabel releases
trait IntoSolver {
    fn into_solver(self) -> Result<DefaultSolver<f64>, EngineError>;
}

impl IntoSolver for DefaultSolver<f64> {
    fn into_solver(self) -> Result<DefaultSolver<f64>, EngineError> {
        Ok(self)
    }
}

impl<E: std::fmt::Display> IntoSolver for Result<DefaultSolver<f64>, E> {
    fn into_solver(self) -> Result<DefaultSolver<f64>, EngineError> {
        self.map_err(|e| EngineError::Initialization(e.to_string()))
    }
}

impl SolverEngine for ClarabelEngine {
    fn configure(&mut self, problem: &ProblemData, settings: &Settings) -> Result<(), EngineError> {
        if self.solver.is_some() {
            return Err(EngineError::Initialization(
                "the engine already holds a Clarabel solver".to_string(),
            ));
        }
        let cones = cone_types(problem)?;
        let settings = solver_settings(settings)?;

        let P = to_clarabel(&upper_triangle(problem.P()));
        let A = to_clarabel(problem.A());

        let solver = DefaultSolver::new(&P, problem.q(), &A, problem.b(), &cones, settings)
            .into_solver()?;
        self.solver = Some(solver);
        Ok(())
    }

    fn set_initial_guess(&mut self, guess: &WarmStart) -> Result<(), EngineError> {
        self.guess = Some(guess.clone());
        Ok(())
    }

    fn run(&mut self) -> Result<(), EngineError> {
        self.solver()?.solve();
        Ok(())
    }

    fn read_result(&mut self) -> Result<SolveResult, EngineError> {
        let solution = &self.solver()?.solution;
        Ok(SolveResult {
            x: solution.x.clone(),
            y: solution.z.clone(),
            s: solution.s.clone(),
            obj_val: solution.obj_val,
            status: status_from(&solution.status),
            iterations: solution.iterations,
            times: ResultTimes {
                solver_time: solution.solve_time,
                ..ResultTimes::default()
            },
        })
    }
}

// Clarabel expects the upper triangle of P only
fn upper_triangle(P: &CscMatrix<f64>) -> CscMatrix<f64> {
    let U = P.to_triu();
    debug_assert!(U.is_triu());
    U
}

fn to_clarabel(M: &CscMatrix<f64>) -> cl_algebra::CscMatrix<f64> {
    cl_algebra::CscMatrix::new(
        M.m,
        M.n,
        M.colptr.clone(),
        M.rowval.clone(),
        M.nzval.clone(),
    )
}

fn unsupported(what: String) -> EngineError {
    EngineError::Initialization(format!("{} is not supported by the Clarabel engine", what))
}

fn cone_types(problem: &ProblemData) -> Result<Vec<SupportedConeT<f64>>, EngineError> {
    problem
        .cone()
        .blocks()
        .into_iter()
        .map(|block| match block.kind {
            ConeKind::Zero => Ok(SupportedConeT::ZeroConeT(block.dim)),
            ConeKind::Nonnegative => Ok(SupportedConeT::NonnegativeConeT(block.dim)),
            ConeKind::SecondOrder => Ok(SupportedConeT::SecondOrderConeT(block.dim)),
            ConeKind::Exponential => Ok(SupportedConeT::ExponentialConeT()),
            // Clarabel's PSD cone scales off-diagonal entries differently
            kind @ (ConeKind::PsdTriangle | ConeKind::DualExponential) => {
                Err(unsupported(format!("cone \"{}\"", kind.key())))
            }
        })
        .collect()
}

fn solver_settings(settings: &Settings) -> Result<DefaultSettings<f64>, EngineError> {
    if let Some(name) = settings.extra.keys().next() {
        return Err(unsupported(format!("option `{}`", name)));
    }

    let mut builder = DefaultSettingsBuilder::default();
    builder
        .verbose(settings.verbose)
        .max_iter(settings.max_iter)
        .tol_gap_abs(settings.eps_abs)
        .tol_feas(settings.eps_abs)
        .tol_gap_rel(settings.eps_rel);

    if settings.time_limit > 0. {
        builder.time_limit(settings.time_limit);
    }

    match settings.kkt_solver.as_deref() {
        None => {}
        Some(QDLDL_KKT_SOLVER) => {
            builder.direct_solve_method("qdldl".to_string());
        }
        Some(other) => return Err(unsupported(format!("kkt_solver \"{}\"", other))),
    }

    builder
        .build()
        .map_err(|e| EngineError::Initialization(e.to_string()))
}

fn status_from(status: &::clarabel::solver::SolverStatus) -> SolverStatus {
    use ::clarabel::solver::SolverStatus as Cl;
    match status {
        Cl::Unsolved => SolverStatus::Unsolved,
        Cl::Solved => SolverStatus::Solved,
        Cl::PrimalInfeasible => SolverStatus::PrimalInfeasible,
        Cl::DualInfeasible => SolverStatus::DualInfeasible,
        Cl::MaxIterations => SolverStatus::MaxIterReached,
        Cl::MaxTime => SolverStatus::TimeLimitReached,
        other => SolverStatus::Other(format!("{:?}", other)),
    }
}
