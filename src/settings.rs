use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Solver options forwarded to the engine.
///
/// Defaults follow COSMO.jl.  Options without a dedicated field are kept in
/// [`extra`](Settings::extra) and passed through to the engine unchanged,
/// which is responsible for rejecting anything it does not recognise.
///
/// ```
/// use cosmo::SettingsBuilder;
///
/// let settings = SettingsBuilder::default()
///     .verbose(true)
///     .kkt_solver("CholmodKKTSolver")
///     .build()
///     .unwrap();
/// assert_eq!(settings.max_iter, 5000);
/// ```

#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,

    ///name of the KKT linear system solver backend (e.g. "QdldlKKTSolver",
    ///"CholmodKKTSolver").  `None` lets the engine choose.
    #[builder(default = "None", setter(into, strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kkt_solver: Option<String>,

    ///absolute residual tolerance
    #[builder(default = "1e-5")]
    pub eps_abs: f64,

    ///relative residual tolerance
    #[builder(default = "1e-5")]
    pub eps_rel: f64,

    ///primal infeasibility tolerance
    #[builder(default = "1e-4")]
    pub eps_prim_inf: f64,

    ///dual infeasibility tolerance
    #[builder(default = "1e-4")]
    pub eps_dual_inf: f64,

    ///maximum number of iterations
    #[builder(default = "5000")]
    pub max_iter: u32,

    ///initial ADMM step size
    #[builder(default = "0.1")]
    pub rho: f64,

    ///ADMM regularization parameter
    #[builder(default = "1e-6")]
    pub sigma: f64,

    ///over-relaxation parameter
    #[builder(default = "1.6")]
    pub alpha: f64,

    ///number of data scaling iterations
    #[builder(default = "10")]
    pub scaling: u32,

    ///adapt the step size during the iteration
    #[builder(default = "true")]
    pub adaptive_rho: bool,

    ///check termination every this many iterations
    #[builder(default = "25")]
    pub check_termination: u32,

    ///check infeasibility every this many iterations
    #[builder(default = "40")]
    pub check_infeasibility: u32,

    ///maximum run time (seconds), 0 for no limit
    #[builder(default = "0.0")]
    pub time_limit: f64,

    ///report detailed timings
    #[builder(default = "false")]
    pub verbose_timing: bool,

    ///enable chordal decomposition of PSD constraints
    #[builder(default = "true")]
    pub decompose: bool,

    ///options passed through to the engine as given
    #[builder(default)]
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Settings {
        SettingsBuilder::default().build().unwrap()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
/// Error type returned when assigning an option by name
pub enum SettingsError {
    /// A recognised option was given a value of the wrong type
    #[error("option `{name}` expects {expected}, got {value}")]
    BadFieldValue {
        name: &'static str,
        expected: &'static str,
        value: Value,
    },
}

// assigns recognised options from a dynamically typed value,
// anything else falls through to the pass-through map
macro_rules! assign_typed_options {
    ($self:ident, $name:ident, $value:ident; $($field:ident => $conv:ident),* $(,)?) => {
        $(
            if $name == stringify!($field) {
                $self.$field = $conv(stringify!($field), &$value)?;
                return Ok(());
            }
        )*
    };
}

impl Settings {
    /// Assign an option by name, as received from a dynamically typed caller.
    ///
    /// Recognised option names are type checked.  Unrecognised names are
    /// stored in [`extra`](Settings::extra) for the engine to validate.
    pub fn set_option(&mut self, name: &str, value: Value) -> Result<(), SettingsError> {
        assign_typed_options!(self, name, value;
            verbose => as_bool,
            kkt_solver => as_opt_string,
            eps_abs => as_f64,
            eps_rel => as_f64,
            eps_prim_inf => as_f64,
            eps_dual_inf => as_f64,
            max_iter => as_u32,
            rho => as_f64,
            sigma => as_f64,
            alpha => as_f64,
            scaling => as_u32,
            adaptive_rho => as_bool,
            check_termination => as_u32,
            check_infeasibility => as_u32,
            time_limit => as_f64,
            verbose_timing => as_bool,
            decompose => as_bool,
        );
        self.extra.insert(name.to_string(), value);
        Ok(())
    }
}

fn bad_value(name: &'static str, expected: &'static str, value: &Value) -> SettingsError {
    SettingsError::BadFieldValue {
        name,
        expected,
        value: value.clone(),
    }
}

fn as_bool(name: &'static str, value: &Value) -> Result<bool, SettingsError> {
    value.as_bool().ok_or_else(|| bad_value(name, "a boolean", value))
}

fn as_f64(name: &'static str, value: &Value) -> Result<f64, SettingsError> {
    value.as_f64().ok_or_else(|| bad_value(name, "a number", value))
}

fn as_u32(name: &'static str, value: &Value) -> Result<u32, SettingsError> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| bad_value(name, "a nonnegative integer", value))
}

fn as_opt_string(name: &'static str, value: &Value) -> Result<Option<String>, SettingsError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(bad_value(name, "a string", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.verbose);
        assert_eq!(settings.kkt_solver, None);
        assert_eq!(settings.eps_abs, 1e-5);
        assert_eq!(settings.max_iter, 5000);
        assert_eq!(settings.time_limit, 0.0);
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn test_set_option() {
        let mut settings = Settings::default();
        settings.set_option("verbose", json!(true)).unwrap();
        settings.set_option("kkt_solver", json!("CholmodKKTSolver")).unwrap();
        settings.set_option("max_iter", json!(100)).unwrap();
        settings.set_option("eps_abs", json!(1)).unwrap();

        assert!(settings.verbose);
        assert_eq!(settings.kkt_solver.as_deref(), Some("CholmodKKTSolver"));
        assert_eq!(settings.max_iter, 100);
        assert_eq!(settings.eps_abs, 1.0);
    }

    #[test]
    fn test_set_option_bad_type() {
        let mut settings = Settings::default();
        let err = settings.set_option("max_iter", json!(-3)).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::BadFieldValue { name: "max_iter", .. }
        ));
        assert!(settings.set_option("verbose", json!("yes")).is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_passthrough_options() {
        let mut settings = Settings::default();
        settings.set_option("merge_strategy", json!("CliqueGraphMerge")).unwrap();
        assert_eq!(settings.extra["merge_strategy"], json!("CliqueGraphMerge"));

        // pass-through options are flattened next to the typed ones
        let wire = serde_json::to_value(&settings).unwrap();
        assert_eq!(wire["merge_strategy"], json!("CliqueGraphMerge"));
        assert_eq!(wire["max_iter"], json!(5000));
        assert!(wire.get("kkt_solver").is_none());
    }
}
