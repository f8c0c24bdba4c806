//! COSMO.jl running in a Julia runtime shared by the whole process.
//!
//! The runtime is started by [`initialize`], or lazily by the first
//! [`JuliaEngine`] that needs it, and stopped by [`shutdown`].  Every engine
//! owns one COSMO model inside the runtime, freed when the engine is dropped.

use super::{EngineError, SolveResult, SolverEngine, WarmStart};
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::problem::ProblemData;
use crate::settings::Settings;
use lazy_static::lazy_static;
use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

mod protocol;
mod runtime;

pub use runtime::{JuliaConfig, JuliaConfigBuilder, JuliaConfigBuilderError, JuliaRuntime};
use protocol::Request;

lazy_static! {
    static ref RUNTIME: Mutex<Option<Arc<JuliaRuntime>>> = Mutex::new(None);
}

fn global() -> MutexGuard<'static, Option<Arc<JuliaRuntime>>> {
    RUNTIME.lock().unwrap_or_else(PoisonError::into_inner)
}

fn start_global(
    global: &mut Option<Arc<JuliaRuntime>>,
    config: JuliaConfig,
) -> Result<Arc<JuliaRuntime>, EngineError> {
    if let Some(rt) = global.as_ref().filter(|rt| rt.is_alive()) {
        return Ok(Arc::clone(rt));
    }
    let rt = Arc::new(JuliaRuntime::start(config)?);
    *global = Some(Arc::clone(&rt));
    Ok(rt)
}

/// Start the process-wide runtime.
///
/// Does nothing if a runtime is already running, in which case `config` is
/// ignored and the running runtime is returned.
pub fn initialize(config: JuliaConfig) -> Result<Arc<JuliaRuntime>, EngineError> {
    start_global(&mut global(), config)
}

/// The process-wide runtime, started with [`JuliaConfig::from_env`] if it
/// is not running.
pub fn runtime() -> Result<Arc<JuliaRuntime>, EngineError> {
    start_global(&mut global(), JuliaConfig::from_env())
}

/// Stop the process-wide runtime.
///
/// Engines still holding the old runtime fail every later request with
/// [`EngineError::Runtime`].  A later [`initialize`] or [`runtime`] starts a
/// fresh process.
pub fn shutdown() -> Result<(), EngineError> {
    let rt = global().take();
    match rt {
        Some(rt) => rt.terminate(),
        None => Ok(()),
    }
}

pub fn is_running() -> bool {
    global().as_ref().map_or(false, |rt| rt.is_alive())
}

// ---------------------------------------------------------
// engine
// ---------------------------------------------------------

/// Engine forwarding to COSMO.jl.
///
/// COSMO's printed output is relayed to a configurable print target,
/// stdout by default.
#[derive(Debug, Default)]
pub struct JuliaEngine {
    runtime: Option<Arc<JuliaRuntime>>,
    workspace: Option<u64>,
    result: Option<SolveResult>,
    output: PrintTarget,
}

impl JuliaEngine {
    /// An engine using the process-wide runtime.  The runtime is not
    /// contacted until [`configure`](SolverEngine::configure).
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine bound to a specific runtime instead of the process-wide one.
    pub fn with_runtime(runtime: Arc<JuliaRuntime>) -> Self {
        Self {
            runtime: Some(runtime),
            workspace: None,
            result: None,
            output: PrintTarget::default(),
        }
    }

    fn bound_runtime(&mut self) -> Result<Arc<JuliaRuntime>, EngineError> {
        match &self.runtime {
            Some(rt) => Ok(Arc::clone(rt)),
            None => {
                let rt = runtime()?;
                self.runtime = Some(Arc::clone(&rt));
                Ok(rt)
            }
        }
    }

    fn workspace(&self) -> Result<(Arc<JuliaRuntime>, u64), EngineError> {
        match (&self.runtime, self.workspace) {
            (Some(rt), Some(id)) => Ok((Arc::clone(rt), id)),
            _ => Err(EngineError::Runtime(
                "no COSMO model has been created in the Julia runtime".to_string(),
            )),
        }
    }
}

impl SolverEngine for JuliaEngine {
    fn configure(&mut self, problem: &ProblemData, settings: &Settings) -> Result<(), EngineError> {
        if self.workspace.is_some() {
            return Err(EngineError::Initialization(
                "the engine already holds a COSMO model".to_string(),
            ));
        }
        let rt = self.bound_runtime()?;
        let id = rt.next_workspace_id();
        rt.request(&Request::setup(id, problem, settings), &mut self.output)?;
        self.workspace = Some(id);
        Ok(())
    }

    fn set_initial_guess(&mut self, guess: &WarmStart) -> Result<(), EngineError> {
        let (rt, id) = self.workspace()?;
        rt.request(&Request::warm_start(id, guess), &mut self.output)?;
        Ok(())
    }

    fn run(&mut self) -> Result<(), EngineError> {
        let (rt, id) = self.workspace()?;
        self.result = None;
        let result = rt.request(&Request::Optimize { id }, &mut self.output)?;
        self.result = Some(protocol::decode_result(result)?);
        let _ = self.output.flush();
        Ok(())
    }

    fn read_result(&mut self) -> Result<SolveResult, EngineError> {
        self.result
            .clone()
            .ok_or_else(|| EngineError::Runtime("COSMO has not produced a result".to_string()))
    }
}

impl Drop for JuliaEngine {
    fn drop(&mut self) {
        if let Ok((rt, id)) = self.workspace() {
            // fails harmlessly once the runtime has been shut down
            let _ = rt.request(&Request::Free { id }, &mut std::io::sink());
        }
    }
}

impl ConfigurablePrintTarget for JuliaEngine {
    fn print_to_stdout(&mut self) {
        self.output.print_to_stdout();
    }

    fn print_to_file(&mut self, file: File) {
        self.output.print_to_file(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.output.print_to_stream(stream);
    }

    fn print_to_buffer(&mut self) {
        self.output.print_to_buffer();
    }

    fn print_to_sink(&mut self) {
        self.output.print_to_sink();
    }

    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.output.get_print_buffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_engine() {
        let mut engine = JuliaEngine::new();
        let guess = WarmStart {
            x: vec![1.0],
            ..WarmStart::default()
        };
        // nothing reaches the runtime before configure
        assert!(matches!(engine.set_initial_guess(&guess), Err(EngineError::Runtime(_))));
        assert!(matches!(engine.run(), Err(EngineError::Runtime(_))));
        assert!(matches!(engine.read_result(), Err(EngineError::Runtime(_))));
    }

    #[test]
    fn test_print_target() {
        let mut engine = JuliaEngine::new();
        assert!(engine.get_print_buffer().is_err());
        engine.print_to_buffer();
        assert_eq!(engine.get_print_buffer().unwrap(), "");
    }
}
