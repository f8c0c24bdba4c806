// Python wrapper for the model handle and the exceptions
// raised from its methods.

#![allow(non_snake_case)]

use super::PyCscMatrix;
use crate::engine::AnyEngine;
use crate::{ConeSpec, Model, ModelError, Settings};
use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyString};
use serde_json::Value;
use std::collections::HashMap;

create_exception!(cosmo_python, CosmoError, PyException);
create_exception!(cosmo_python, DimensionMismatchError, CosmoError);
create_exception!(cosmo_python, InvalidConeSpecError, CosmoError);
create_exception!(cosmo_python, InvalidMatrixError, CosmoError);
create_exception!(cosmo_python, SolverInitializationError, CosmoError);
create_exception!(cosmo_python, NotSetupError, CosmoError);
create_exception!(cosmo_python, AlreadySetupError, CosmoError);
create_exception!(cosmo_python, NotSolvedError, CosmoError);
create_exception!(cosmo_python, ForeignRuntimeError, CosmoError);

impl From<ModelError> for PyErr {
    fn from(err: ModelError) -> PyErr {
        let msg = err.to_string();
        match err {
            ModelError::DimensionMismatch { .. } => DimensionMismatchError::new_err(msg),
            ModelError::InvalidConeSpec(_) => InvalidConeSpecError::new_err(msg),
            ModelError::InvalidMatrix { .. } => InvalidMatrixError::new_err(msg),
            ModelError::SolverInitialization(_) => SolverInitializationError::new_err(msg),
            ModelError::NotSetup => NotSetupError::new_err(msg),
            ModelError::AlreadySetup => AlreadySetupError::new_err(msg),
            ModelError::NotSolved => NotSolvedError::new_err(msg),
            ModelError::ForeignRuntime(_) => ForeignRuntimeError::new_err(msg),
        }
    }
}

// option values as received from **kwargs
fn option_value(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    if obj.is_none() {
        Ok(Value::Null)
    } else if obj.is_instance_of::<PyBool>() {
        Ok(Value::Bool(obj.extract()?))
    } else if obj.is_instance_of::<PyInt>() {
        match obj.extract::<i64>() {
            Ok(v) => Ok(Value::from(v)),
            Err(_) => Ok(Value::from(obj.extract::<u64>()?)),
        }
    } else if obj.is_instance_of::<PyFloat>() {
        float_value(obj.extract()?)
    } else if obj.is_instance_of::<PyString>() {
        Ok(Value::String(obj.extract()?))
    } else if let Ok(v) = obj.extract::<i64>() {
        // numpy integer scalars implement __index__ without subclassing int
        Ok(Value::from(v))
    } else if let Ok(v) = obj.extract::<f64>() {
        float_value(v)
    } else {
        Err(PyTypeError::new_err(format!(
            "unsupported option value {}",
            obj.repr()?
        )))
    }
}

fn float_value(v: f64) -> PyResult<Value> {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .ok_or_else(|| PyValueError::new_err(format!("option value {} is not finite", v)))
}

#[pyclass(name = "Model", unsendable)]
pub struct PyModel {
    inner: Model<AnyEngine>,
}

#[pymethods]
impl PyModel {
    #[new]
    #[pyo3(signature = (engine = None))]
    fn new(engine: Option<&str>) -> PyResult<Self> {
        let engine = match engine {
            None => AnyEngine::default(),
            Some(name) => AnyEngine::from_name(name).map_err(ModelError::from)?,
        };
        Ok(Self {
            inner: Model::with_engine(engine),
        })
    }

    #[pyo3(signature = (P, q, A, b, cone, **options))]
    fn setup(
        &mut self,
        P: PyCscMatrix,
        q: Vec<f64>,
        A: PyCscMatrix,
        b: Vec<f64>,
        cone: HashMap<String, usize>,
        options: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<()> {
        let cone = ConeSpec::try_from(&cone).map_err(ModelError::from)?;

        let mut settings = Settings::default();
        if let Some(options) = options {
            for (key, value) in options.iter() {
                let name: String = key.extract()?;
                settings
                    .set_option(&name, option_value(&value)?)
                    .map_err(ModelError::from)?;
            }
        }

        self.inner.setup(&P, &q, &A, &b, &cone, settings)?;
        Ok(())
    }

    #[pyo3(signature = (x, s = None, y = None))]
    fn warm_start(&mut self, x: Vec<f64>, s: Option<Vec<f64>>, y: Option<Vec<f64>>) -> PyResult<()> {
        self.inner
            .warm_start(&x, s.as_deref(), y.as_deref())?;
        Ok(())
    }

    /// Solve the problem and return the termination status
    fn optimize(&mut self) -> PyResult<String> {
        let status = self.inner.optimize()?;
        Ok(status.to_string())
    }

    fn get_x(&self) -> PyResult<Vec<f64>> {
        Ok(self.inner.get_x()?.to_vec())
    }

    fn get_y(&self) -> PyResult<Vec<f64>> {
        Ok(self.inner.get_y()?.to_vec())
    }

    fn get_s(&self) -> PyResult<Vec<f64>> {
        Ok(self.inner.get_s()?.to_vec())
    }

    fn get_objective_value(&self) -> PyResult<f64> {
        Ok(self.inner.get_objective_value()?)
    }

    fn get_status(&self) -> PyResult<String> {
        Ok(self.inner.get_status()?.to_string())
    }

    fn get_iterations(&self) -> PyResult<u32> {
        Ok(self.inner.get_iterations()?)
    }

    fn get_times(&self) -> PyResult<HashMap<&'static str, f64>> {
        let times = self.inner.get_times()?;
        Ok(HashMap::from([
            ("solver_time", times.solver_time),
            ("setup_time", times.setup_time),
            ("iter_time", times.iter_time),
        ]))
    }

    pub fn __repr__(&self) -> String {
        match self.inner.dims() {
            Some(dims) => format!("COSMO model with {} variables and {} constraints", dims.n, dims.m),
            None => "Empty COSMO model".to_string(),
        }
    }
}
