//! Line-delimited JSON protocol spoken with the Julia driver.
//!
//! Each request is one JSON object on one line of the runtime's stdin.  The
//! runtime may print any amount of solver output on stdout; the response is
//! the first stdout line starting with [`RESPONSE_MARKER`].

#![allow(non_snake_case)]

use crate::algebra::CscMatrix;
use crate::cones::ConeBlock;
use crate::engine::{EngineError, ResultTimes, SolveResult, SolverStatus, WarmStart};
use crate::problem::ProblemData;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, Write};

pub(crate) const RESPONSE_MARKER: &str = "@@cosmo-response@@ ";

/// A float that survives JSON: non-finite values travel as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum JsonFloat {
    Number(f64),
    Text(String),
}

impl From<f64> for JsonFloat {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            JsonFloat::Number(v)
        } else if v.is_nan() {
            JsonFloat::Text("NaN".to_string())
        } else if v > 0. {
            JsonFloat::Text("Inf".to_string())
        } else {
            JsonFloat::Text("-Inf".to_string())
        }
    }
}

impl TryFrom<JsonFloat> for f64 {
    type Error = EngineError;

    fn try_from(v: JsonFloat) -> Result<f64, EngineError> {
        match v {
            JsonFloat::Number(v) => Ok(v),
            JsonFloat::Text(s) => match s.as_str() {
                "Inf" | "inf" => Ok(f64::INFINITY),
                "-Inf" | "-inf" => Ok(f64::NEG_INFINITY),
                "NaN" | "nan" => Ok(f64::NAN),
                _ => Err(malformed(format!("\"{}\" is not a number", s))),
            },
        }
    }
}

fn encode(v: &[f64]) -> Vec<JsonFloat> {
    v.iter().map(|&x| x.into()).collect()
}

fn decode(v: Vec<JsonFloat>) -> Result<Vec<f64>, EngineError> {
    v.into_iter().map(f64::try_from).collect()
}

fn malformed(detail: String) -> EngineError {
    EngineError::Runtime(format!("malformed response from the Julia runtime: {}", detail))
}

// ---------------------------------------------------------
// requests
// ---------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct WireMatrix<'a> {
    m: usize,
    n: usize,
    colptr: &'a [usize],
    rowval: &'a [usize],
    nzval: Vec<JsonFloat>,
}

impl<'a> From<&'a CscMatrix<f64>> for WireMatrix<'a> {
    fn from(M: &'a CscMatrix<f64>) -> Self {
        Self {
            m: M.m,
            n: M.n,
            colptr: &M.colptr,
            rowval: &M.rowval,
            nzval: encode(&M.nzval),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct WireProblem<'a> {
    P: WireMatrix<'a>,
    q: Vec<JsonFloat>,
    A: WireMatrix<'a>,
    b: Vec<JsonFloat>,
    cones: Vec<ConeBlock>,
}

impl<'a> From<&'a ProblemData> for WireProblem<'a> {
    fn from(problem: &'a ProblemData) -> Self {
        Self {
            P: problem.P().into(),
            q: encode(problem.q()),
            A: problem.A().into(),
            b: encode(problem.b()),
            cones: problem.cone().blocks(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum Request<'a> {
    Setup {
        id: u64,
        problem: WireProblem<'a>,
        settings: &'a Settings,
    },
    WarmStart {
        id: u64,
        x: Vec<JsonFloat>,
        s: Option<Vec<JsonFloat>>,
        y: Option<Vec<JsonFloat>>,
    },
    Optimize {
        id: u64,
    },
    Free {
        id: u64,
    },
    Exit,
}

impl<'a> Request<'a> {
    pub(crate) fn setup(id: u64, problem: &'a ProblemData, settings: &'a Settings) -> Self {
        Request::Setup {
            id,
            problem: problem.into(),
            settings,
        }
    }

    pub(crate) fn warm_start(id: u64, guess: &WarmStart) -> Self {
        Request::WarmStart {
            id,
            x: encode(&guess.x),
            s: guess.s.as_deref().map(encode),
            y: guess.y.as_deref().map(encode),
        }
    }
}

pub(crate) fn write_request<W: Write>(writer: &mut W, request: &Request<'_>) -> std::io::Result<()> {
    serde_json::to_writer(&mut *writer, request)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

// ---------------------------------------------------------
// responses
// ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FailureKind {
    Initialization,
    Runtime,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum Response {
    Ok {
        #[serde(default)]
        result: Value,
    },
    Error {
        kind: FailureKind,
        message: String,
    },
}

impl Response {
    pub(crate) fn into_result(self) -> Result<Value, EngineError> {
        match self {
            Response::Ok { result } => Ok(result),
            Response::Error { kind, message } => match kind {
                FailureKind::Initialization => Err(EngineError::Initialization(message)),
                FailureKind::Runtime => Err(EngineError::Runtime(message)),
            },
        }
    }
}

/// Read stdout lines until a response arrives, forwarding every other line
/// to `chatter`.
///
/// Errors are transport failures (closed stream, unreadable response).
pub(crate) fn read_response<R: BufRead>(
    reader: &mut R,
    chatter: &mut dyn Write,
) -> Result<Response, EngineError> {
    let mut line = String::new();
    loop {
        line.clear();
        let nread = reader.read_line(&mut line).map_err(|e| {
            EngineError::Runtime(format!("failed to read from the Julia runtime: {}", e))
        })?;
        if nread == 0 {
            return Err(EngineError::Runtime(
                "the Julia runtime exited before responding".to_string(),
            ));
        }
        let text = line.trim_end_matches(|c| c == '\n' || c == '\r');
        match text.strip_prefix(RESPONSE_MARKER) {
            Some(json) => {
                return serde_json::from_str(json).map_err(|e| malformed(e.to_string()));
            }
            None => {
                // solver output is best effort
                let _ = writeln!(chatter, "{}", text);
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireTimes {
    solver_time: Option<JsonFloat>,
    setup_time: Option<JsonFloat>,
    iter_time: Option<JsonFloat>,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    x: Vec<JsonFloat>,
    y: Vec<JsonFloat>,
    s: Vec<JsonFloat>,
    obj_val: JsonFloat,
    iter: u32,
    status: String,
    #[serde(default)]
    times: WireTimes,
}

fn time_or_nan(t: Option<JsonFloat>) -> Result<f64, EngineError> {
    t.map_or(Ok(f64::NAN), f64::try_from)
}

/// Decode the `result` payload of an `optimize` response.
pub(crate) fn decode_result(result: Value) -> Result<SolveResult, EngineError> {
    let wire: WireResult = serde_json::from_value(result).map_err(|e| malformed(e.to_string()))?;

    let status = match wire.status.parse::<SolverStatus>() {
        Ok(status) => status,
        Err(never) => match never {},
    };

    Ok(SolveResult {
        x: decode(wire.x)?,
        y: decode(wire.y)?,
        s: decode(wire.s)?,
        obj_val: wire.obj_val.try_into()?,
        status,
        iterations: wire.iter,
        times: ResultTimes {
            solver_time: time_or_nan(wire.times.solver_time)?,
            setup_time: time_or_nan(wire.times.setup_time)?,
            iter_time: time_or_nan(wire.times.iter_time)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cones::ConeSpec;
    use serde_json::json;
    use std::io::Cursor;

    fn problem() -> ProblemData {
        let P = CscMatrix::from_rows(&[[4., 1.], [1., 2.]]);
        let A = CscMatrix::from_rows(&[[1., 1.], [1., 0.], [0., 1.]]);
        let cone = ConeSpec::from_pairs([("f", 1), ("l", 2)]).unwrap();
        ProblemData::new(&P, &[1., 1.], &A, &[1., f64::INFINITY, 0.7], &cone).unwrap()
    }

    #[test]
    fn test_setup_request() {
        let problem = problem();
        let settings = Settings::default();
        let request = Request::setup(3, &problem, &settings);
        let wire = serde_json::to_value(&request).unwrap();

        assert_eq!(wire["op"], json!("setup"));
        assert_eq!(wire["id"], json!(3));
        assert_eq!(wire["problem"]["P"]["colptr"], json!([0, 2, 4]));
        assert_eq!(wire["problem"]["A"]["m"], json!(3));
        assert_eq!(wire["problem"]["b"], json!([1.0, "Inf", 0.7]));
        assert_eq!(
            wire["problem"]["cones"],
            json!([{"kind": "f", "dim": 1}, {"kind": "l", "dim": 2}])
        );
        assert_eq!(wire["settings"]["eps_abs"], json!(1e-5));
    }

    #[test]
    fn test_other_requests() {
        let guess = WarmStart {
            x: vec![1., 0.],
            s: None,
            y: Some(vec![f64::NAN]),
        };
        let wire = serde_json::to_value(Request::warm_start(1, &guess)).unwrap();
        assert_eq!(
            wire,
            json!({"op": "warm_start", "id": 1, "x": [1.0, 0.0], "s": null, "y": ["NaN"]})
        );

        let mut buffer = Vec::new();
        write_request(&mut buffer, &Request::Optimize { id: 7 }).unwrap();
        write_request(&mut buffer, &Request::Exit).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "{\"op\":\"optimize\",\"id\":7}\n{\"op\":\"exit\"}\n"
        );
    }

    #[test]
    fn test_read_response_forwards_chatter() {
        let stream = format!(
            "------ COSMO ------\niter 1\n{}{{\"status\":\"ok\",\"result\":null}}\nleftover\n",
            RESPONSE_MARKER
        );
        let mut reader = Cursor::new(stream.into_bytes());
        let mut chatter = Vec::new();

        let response = read_response(&mut reader, &mut chatter).unwrap();
        assert_eq!(response.into_result().unwrap(), Value::Null);
        assert_eq!(
            String::from_utf8(chatter).unwrap(),
            "------ COSMO ------\niter 1\n"
        );
    }

    #[test]
    fn test_read_response_failures() {
        let mut chatter = Vec::new();

        let mut closed = Cursor::new(b"partial output\n".to_vec());
        assert!(matches!(
            read_response(&mut closed, &mut chatter),
            Err(EngineError::Runtime(_))
        ));

        let mut garbage = Cursor::new(format!("{}not json\n", RESPONSE_MARKER).into_bytes());
        assert!(matches!(
            read_response(&mut garbage, &mut chatter),
            Err(EngineError::Runtime(_))
        ));
    }

    #[test]
    fn test_error_responses() {
        let init: Response = serde_json::from_value(json!({
            "status": "error", "kind": "initialization", "message": "UndefVarError: FooKKTSolver not defined"
        }))
        .unwrap();
        assert_eq!(
            init.into_result(),
            Err(EngineError::Initialization(
                "UndefVarError: FooKKTSolver not defined".to_string()
            ))
        );

        let runtime: Response = serde_json::from_value(json!({
            "status": "error", "kind": "runtime", "message": "PosDefException"
        }))
        .unwrap();
        assert_eq!(
            runtime.into_result(),
            Err(EngineError::Runtime("PosDefException".to_string()))
        );
    }

    #[test]
    fn test_decode_result() {
        let result = decode_result(json!({
            "x": [0.3, 0.7],
            "y": [0.0, "Inf"],
            "s": [1, 0.0],
            "obj_val": 1.88,
            "iter": 50,
            "status": "Solved",
            "times": {"solver_time": 0.01, "setup_time": 0.002, "iter_time": "NaN"}
        }))
        .unwrap();

        assert_eq!(result.x, vec![0.3, 0.7]);
        assert_eq!(result.y[1], f64::INFINITY);
        assert_eq!(result.s, vec![1.0, 0.0]);
        assert_eq!(result.obj_val, 1.88);
        assert_eq!(result.iterations, 50);
        assert_eq!(result.status, SolverStatus::Solved);
        assert_eq!(result.times.setup_time, 0.002);
        assert!(result.times.iter_time.is_nan());

        // times are optional, missing phases read as NaN
        let result = decode_result(json!({
            "x": [], "y": [], "s": [], "obj_val": "-Inf", "iter": 0, "status": "Dual_infeasible"
        }))
        .unwrap();
        assert_eq!(result.obj_val, f64::NEG_INFINITY);
        assert_eq!(result.status, SolverStatus::DualInfeasible);
        assert!(result.times.solver_time.is_nan());

        assert!(decode_result(json!({"x": [0.3]})).is_err());
    }
}
