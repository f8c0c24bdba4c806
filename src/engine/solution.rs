use std::fmt;
use std::str::FromStr;

/// Termination status reported by the engine.
///
/// Names follow COSMO.jl.  Statuses an engine reports beyond these are kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverStatus {
    Unsolved,
    Solved,
    MaxIterReached,
    TimeLimitReached,
    PrimalInfeasible,
    DualInfeasible,
    Other(String),
}

impl SolverStatus {
    /// COSMO.jl's name for the status
    pub fn name(&self) -> &str {
        match self {
            SolverStatus::Unsolved => "Unsolved",
            SolverStatus::Solved => "Solved",
            SolverStatus::MaxIterReached => "Max_iter_reached",
            SolverStatus::TimeLimitReached => "Time_limit_reached",
            SolverStatus::PrimalInfeasible => "Primal_infeasible",
            SolverStatus::DualInfeasible => "Dual_infeasible",
            SolverStatus::Other(name) => name,
        }
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolverStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s {
            "Unsolved" => SolverStatus::Unsolved,
            "Solved" => SolverStatus::Solved,
            "Max_iter_reached" => SolverStatus::MaxIterReached,
            "Time_limit_reached" => SolverStatus::TimeLimitReached,
            "Primal_infeasible" => SolverStatus::PrimalInfeasible,
            "Dual_infeasible" => SolverStatus::DualInfeasible,
            other => SolverStatus::Other(other.to_string()),
        };
        Ok(status)
    }
}

/// Timings reported by the engine, in seconds.  NaN where the engine
/// does not measure a phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultTimes {
    pub solver_time: f64,
    pub setup_time: f64,
    pub iter_time: f64,
}

impl Default for ResultTimes {
    fn default() -> Self {
        Self {
            solver_time: f64::NAN,
            setup_time: f64::NAN,
            iter_time: f64::NAN,
        }
    }
}

/// Terminal state of a solve, exactly as produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// primal solution
    pub x: Vec<f64>,
    /// dual solution
    pub y: Vec<f64>,
    /// slack variables
    pub s: Vec<f64>,
    /// objective value
    pub obj_val: f64,
    pub status: SolverStatus,
    pub iterations: u32,
    pub times: ResultTimes,
}

#[test]
fn test_status_names() {
    for status in [
        SolverStatus::Unsolved,
        SolverStatus::Solved,
        SolverStatus::MaxIterReached,
        SolverStatus::TimeLimitReached,
        SolverStatus::PrimalInfeasible,
        SolverStatus::DualInfeasible,
    ] {
        assert_eq!(status.name().parse::<SolverStatus>().unwrap(), status);
    }
    let other: SolverStatus = "Almost_solved".parse().unwrap();
    assert_eq!(other, SolverStatus::Other("Almost_solved".to_string()));
    assert_eq!(other.to_string(), "Almost_solved");
}
