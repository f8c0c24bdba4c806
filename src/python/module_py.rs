use super::*;
use crate::engine::julia;
use crate::ModelError;
use pyo3::prelude::*;

// stop the shared Julia runtime.  registered with atexit on import
#[pyfunction(name = "shutdown")]
fn shutdown_py() -> PyResult<()> {
    julia::shutdown().map_err(ModelError::from)?;
    Ok(())
}

#[pyfunction(name = "is_running")]
fn is_running_py() -> bool {
    julia::is_running()
}

// Python module and registry, which includes registration of the
// data types defined in the other files in this rust module
#[pymodule]
#[pyo3(name = "cosmo_python")]
fn cosmo_python(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    //module version
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    //runtime lifecycle
    m.add_function(wrap_pyfunction!(shutdown_py, m)?)?;
    m.add_function(wrap_pyfunction!(is_running_py, m)?)?;

    // Main model object
    m.add_class::<PyModel>()?;

    // exceptions
    m.add("CosmoError", py.get_type::<CosmoError>())?;
    m.add("DimensionMismatchError", py.get_type::<DimensionMismatchError>())?;
    m.add("InvalidConeSpecError", py.get_type::<InvalidConeSpecError>())?;
    m.add("InvalidMatrixError", py.get_type::<InvalidMatrixError>())?;
    m.add("SolverInitializationError", py.get_type::<SolverInitializationError>())?;
    m.add("NotSetupError", py.get_type::<NotSetupError>())?;
    m.add("AlreadySetupError", py.get_type::<AlreadySetupError>())?;
    m.add("NotSolvedError", py.get_type::<NotSolvedError>())?;
    m.add("ForeignRuntimeError", py.get_type::<ForeignRuntimeError>())?;

    // tear the runtime down before the interpreter exits
    let atexit = py.import("atexit")?;
    atexit.call_method1("register", (m.getattr("shutdown")?,))?;

    Ok(())
}
