use crate::algebra::SparseFormatError;
use crate::cones::ConeSpecError;
use crate::engine::EngineError;
use crate::settings::SettingsError;
use thiserror::Error;

/// Error type returned by [`Model`](crate::Model) operations.
#[derive(Error, Debug)]
pub enum ModelError {
    /// An input does not have the shape or length implied by the others
    #[error("dimension mismatch for {what}: expected {expected}, got {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// The cone specification is malformed or does not partition the rows of `A`
    #[error("invalid cone specification: {0}")]
    InvalidConeSpec(#[from] ConeSpecError),

    /// Sparse matrix data is malformed, or `P` is not symmetric
    #[error("invalid data in matrix {name}: {source}")]
    InvalidMatrix {
        name: &'static str,
        source: SparseFormatError,
    },

    /// The engine rejected the problem configuration or an option
    #[error("solver initialization failed: {0}")]
    SolverInitialization(String),

    /// The model has not been set up
    #[error("model has not been set up; call setup first")]
    NotSetup,

    /// The model already holds a problem
    #[error("model has already been set up; create a new model for a new problem")]
    AlreadySetup,

    /// No solve has completed on the model
    #[error("model has not been solved; call optimize first")]
    NotSolved,

    /// The external engine failed while running
    #[error("external solver error: {0}")]
    ForeignRuntime(String),
}

impl From<EngineError> for ModelError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Initialization(msg) => ModelError::SolverInitialization(msg),
            EngineError::Runtime(msg) => ModelError::ForeignRuntime(msg),
        }
    }
}

impl From<SettingsError> for ModelError {
    fn from(err: SettingsError) -> Self {
        ModelError::SolverInitialization(err.to_string())
    }
}
