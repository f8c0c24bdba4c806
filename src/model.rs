#![allow(non_snake_case)]

use crate::algebra::CscMatrix;
use crate::cones::ConeSpec;
use crate::engine::{AnyEngine, ResultTimes, SolveResult, SolverEngine, SolverStatus, WarmStart};
use crate::error::ModelError;
use crate::problem::{check_dim, Dims, ProblemData};
use crate::settings::Settings;

#[derive(Debug)]
enum State {
    Uninitialized,
    Configured { dims: Dims },
    Solved { dims: Dims, result: SolveResult },
}

/// A handle to one optimization problem held by a solver engine.
///
/// The handle is created empty, configured once with [`setup`](Model::setup),
/// optionally warm started and then solved with [`optimize`](Model::optimize).
/// Results are read with the `get_*` accessors.
///
/// ```no_run
/// use cosmo::{ConeSpec, CscMatrix, Model, Settings};
///
/// # fn main() -> Result<(), cosmo::ModelError> {
/// let P = CscMatrix::from_rows(&[[4., 1.], [1., 2.]]);
/// let A = CscMatrix::from_rows(&[[1., 1.], [1., 0.], [0., 1.]]);
/// let cone = ConeSpec::from_pairs([("f", 1), ("l", 2)])?;
///
/// let mut model = Model::new();
/// model.setup(&P, &[1., 1.], &A, &[1., 0.7, 0.7], &cone, Settings::default())?;
/// model.optimize()?;
/// println!("x = {:?}", model.get_x()?);
/// # Ok(())
/// # }
/// ```
///
/// The external workspace is released when the handle is dropped.
#[derive(Debug)]
pub struct Model<E: SolverEngine = AnyEngine> {
    engine: E,
    state: State,
}

impl Model<AnyEngine> {
    /// An empty handle backed by COSMO.jl.  The Julia runtime is not
    /// contacted until [`setup`](Model::setup).
    pub fn new() -> Self {
        Self::with_engine(AnyEngine::default())
    }
}

impl Default for Model<AnyEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SolverEngine> Model<E> {
    /// An empty handle backed by `engine`.
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            state: State::Uninitialized,
        }
    }

    /// Validate the problem data and create the solver workspace.
    ///
    /// A handle can be set up only once.  On failure the handle stays empty
    /// and `setup` may be called again.
    pub fn setup(
        &mut self,
        P: &CscMatrix<f64>,
        q: &[f64],
        A: &CscMatrix<f64>,
        b: &[f64],
        cone: &ConeSpec,
        settings: Settings,
    ) -> Result<(), ModelError> {
        if !matches!(self.state, State::Uninitialized) {
            return Err(ModelError::AlreadySetup);
        }
        let problem = ProblemData::new(P, q, A, b, cone)?;
        self.engine.configure(&problem, &settings)?;
        self.state = State::Configured {
            dims: problem.dims(),
        };
        Ok(())
    }

    /// Provide an initial guess for the next [`optimize`](Model::optimize).
    ///
    /// `x` has length `n`; slacks `s` and duals `y`, when given, have length
    /// `m`.  A later call replaces the whole guess.
    pub fn warm_start(
        &mut self,
        x: &[f64],
        s: Option<&[f64]>,
        y: Option<&[f64]>,
    ) -> Result<(), ModelError> {
        let dims = self.dims().ok_or(ModelError::NotSetup)?;
        check_dim("length of x", dims.n, x.len())?;
        if let Some(s) = s {
            check_dim("length of s", dims.m, s.len())?;
        }
        if let Some(y) = y {
            check_dim("length of y", dims.m, y.len())?;
        }

        let guess = WarmStart {
            x: x.to_vec(),
            s: s.map(<[f64]>::to_vec),
            y: y.map(<[f64]>::to_vec),
        };
        self.engine.set_initial_guess(&guess)?;
        Ok(())
    }

    /// Run the solver and store its result, replacing any earlier one.
    ///
    /// Returns the termination status.  Statuses other than `Solved` are not
    /// errors; check [`get_status`](Model::get_status) before using the
    /// solution.
    pub fn optimize(&mut self) -> Result<&SolverStatus, ModelError> {
        let dims = self.dims().ok_or(ModelError::NotSetup)?;

        // a failed run leaves no result behind
        self.state = State::Configured { dims };
        self.engine.run()?;
        let result = self.engine.read_result()?;
        self.state = State::Solved { dims, result };
        Ok(&self.result()?.status)
    }

    /// Everything reported by the last solve
    pub fn result(&self) -> Result<&SolveResult, ModelError> {
        match &self.state {
            State::Solved { result, .. } => Ok(result),
            _ => Err(ModelError::NotSolved),
        }
    }

    /// primal solution
    pub fn get_x(&self) -> Result<&[f64], ModelError> {
        Ok(&self.result()?.x)
    }

    /// dual solution
    pub fn get_y(&self) -> Result<&[f64], ModelError> {
        Ok(&self.result()?.y)
    }

    /// primal slacks
    pub fn get_s(&self) -> Result<&[f64], ModelError> {
        Ok(&self.result()?.s)
    }

    pub fn get_objective_value(&self) -> Result<f64, ModelError> {
        Ok(self.result()?.obj_val)
    }

    pub fn get_status(&self) -> Result<&SolverStatus, ModelError> {
        Ok(&self.result()?.status)
    }

    pub fn get_iterations(&self) -> Result<u32, ModelError> {
        Ok(self.result()?.iterations)
    }

    pub fn get_times(&self) -> Result<ResultTimes, ModelError> {
        Ok(self.result()?.times)
    }

    pub fn is_setup(&self) -> bool {
        !matches!(self.state, State::Uninitialized)
    }

    pub fn is_solved(&self) -> bool {
        matches!(self.state, State::Solved { .. })
    }

    /// Problem dimensions, once set up
    pub fn dims(&self) -> Option<Dims> {
        match self.state {
            State::Uninitialized => None,
            State::Configured { dims } | State::Solved { dims, .. } => Some(dims),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
