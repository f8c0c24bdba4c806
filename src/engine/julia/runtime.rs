use super::protocol::{self, Request};
use crate::engine::EngineError;
use derive_builder::Builder;
use serde_json::Value;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Julia source of the request loop run inside the runtime process.
const DRIVER_SOURCE: &str = include_str!("driver.jl");

/// How to launch the Julia runtime.
///
/// The command line is
/// `executable [args...] [--project=P] [--threads=N] --startup-file=no --quiet -e <driver>`.
/// The Julia environment must provide the `COSMO` and `JSON` packages.

#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct JuliaConfig {
    ///path to the julia executable
    #[builder(default = r#"PathBuf::from("julia")"#, setter(into))]
    pub executable: PathBuf,

    ///Julia project (environment) providing COSMO
    #[builder(default = "None", setter(into, strip_option))]
    pub project: Option<PathBuf>,

    ///number of Julia threads
    #[builder(default = "None", setter(strip_option))]
    pub threads: Option<usize>,

    ///extra leading command line arguments
    #[builder(default)]
    pub args: Vec<String>,
}

impl Default for JuliaConfig {
    fn default() -> JuliaConfig {
        JuliaConfigBuilder::default().build().unwrap()
    }
}

impl JuliaConfig {
    /// Default configuration, with the executable taken from `COSMO_JULIA`
    /// and the project from `COSMO_JULIA_PROJECT` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(exe) = std::env::var_os("COSMO_JULIA") {
            config.executable = exe.into();
        }
        if let Some(project) = std::env::var_os("COSMO_JULIA_PROJECT") {
            config.project = Some(project.into());
        }
        config
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.args);
        if let Some(project) = &self.project {
            cmd.arg(format!("--project={}", project.display()));
        }
        if let Some(threads) = self.threads {
            cmd.arg(format!("--threads={}", threads));
        }
        cmd.args(["--startup-file=no", "--quiet", "-e", DRIVER_SOURCE]);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        cmd
    }
}

struct JuliaProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl JuliaProcess {
    fn spawn(config: &JuliaConfig) -> Result<Self, EngineError> {
        let mut child = config.command().spawn().map_err(|e| {
            EngineError::Runtime(format!(
                "failed to start Julia ({}): {}",
                config.executable.display(),
                e
            ))
        })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, BufReader::new(stdout)),
            _ => {
                let _ = child.kill();
                return Err(EngineError::Runtime(
                    "Julia runtime started without piped stdio".to_string(),
                ));
            }
        };

        let mut process = Self {
            child,
            stdin,
            stdout,
        };

        // the driver announces itself once COSMO has loaded
        let ready = protocol::read_response(&mut process.stdout, &mut crate::io::stdout())
            .and_then(|response| response.into_result());
        if let Err(e) = ready {
            process.kill();
            return Err(EngineError::Runtime(format!(
                "Julia runtime failed to load COSMO: {}",
                e
            )));
        }
        Ok(process)
    }

    // transport failures only, the response may still be an error
    fn exchange(
        &mut self,
        request: &Request<'_>,
        chatter: &mut dyn Write,
    ) -> Result<protocol::Response, EngineError> {
        protocol::write_request(&mut self.stdin, request).map_err(|e| {
            EngineError::Runtime(format!("failed to write to the Julia runtime: {}", e))
        })?;
        protocol::read_response(&mut self.stdout, chatter)
    }

    fn exit(mut self) -> Result<(), EngineError> {
        if let Err(e) = self.exchange(&Request::Exit, &mut io::sink()) {
            self.kill();
            return Err(e);
        }
        // closing stdin also ends a driver that ignored the request
        let JuliaProcess { mut child, stdin, .. } = self;
        drop(stdin);
        child
            .wait()
            .map(|_| ())
            .map_err(|e| EngineError::Runtime(format!("failed to stop the Julia runtime: {}", e)))
    }

    fn has_exited(&mut self) -> bool {
        !matches!(self.child.try_wait(), Ok(None))
    }

    fn kill(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A Julia process running the COSMO driver.
///
/// Requests from all models sharing the runtime are serialized.  Each model
/// owns a workspace in the runtime identified by a number from
/// [`next_workspace_id`](JuliaRuntime::next_workspace_id).
pub struct JuliaRuntime {
    config: JuliaConfig,
    process: Mutex<Option<JuliaProcess>>,
    next_id: AtomicU64,
}

impl JuliaRuntime {
    /// Launch a runtime and wait until COSMO has loaded.
    ///
    /// Most users should go through [`initialize`](super::initialize) instead,
    /// which keeps a single runtime per process.
    pub fn start(config: JuliaConfig) -> Result<Self, EngineError> {
        let process = JuliaProcess::spawn(&config)?;
        Ok(Self {
            config,
            process: Mutex::new(Some(process)),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &JuliaConfig {
        &self.config
    }

    /// False once the runtime has been terminated or its process has died.
    pub fn is_alive(&self) -> bool {
        let mut guard = self.lock();
        let exited = match guard.as_mut() {
            Some(process) => process.has_exited(),
            None => return false,
        };
        if exited {
            // reap the exited process
            if let Some(mut process) = guard.take() {
                process.kill();
            }
        }
        !exited
    }

    pub(crate) fn next_workspace_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Send one request and wait for its response.  Solver output printed
    /// while waiting goes to `chatter`.
    pub(crate) fn request(
        &self,
        request: &Request<'_>,
        chatter: &mut dyn Write,
    ) -> Result<Value, EngineError> {
        let mut guard = self.lock();
        let process = guard.as_mut().ok_or_else(|| {
            EngineError::Runtime("the Julia runtime has been shut down".to_string())
        })?;

        match process.exchange(request, chatter) {
            Ok(response) => response.into_result(),
            Err(e) => {
                // the stream is out of sync or closed, nothing more can be sent
                if let Some(mut process) = guard.take() {
                    process.kill();
                }
                Err(e)
            }
        }
    }

    /// Stop the Julia process.  Later requests fail with
    /// [`EngineError::Runtime`].
    pub fn terminate(&self) -> Result<(), EngineError> {
        match self.lock().take() {
            Some(process) => process.exit(),
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<JuliaProcess>> {
        self.process.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for JuliaRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JuliaRuntime")
            .field("config", &self.config)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl Drop for JuliaRuntime {
    fn drop(&mut self) {
        let _ = self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let config = JuliaConfigBuilder::default()
            .executable("/opt/julia/bin/julia")
            .project("/work/env")
            .threads(4)
            .args(vec!["--optimize=2".to_string()])
            .build()
            .unwrap();

        let cmd = config.command();
        assert_eq!(cmd.get_program(), "/opt/julia/bin/julia");

        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            &args[..6],
            &[
                "--optimize=2",
                "--project=/work/env",
                "--threads=4",
                "--startup-file=no",
                "--quiet",
                "-e",
            ]
        );
        assert!(args[6].contains("using COSMO"));
    }

    #[test]
    fn test_driver_handlers() {
        // each workspace op dispatches to a named handler
        for op in ["setup", "warm_start", "optimize", "free"] {
            let dispatch = format!("op == \"{op}\" && return ok({op}(req))");
            assert!(DRIVER_SOURCE.contains(&dispatch), "no handler for {op}");
            assert!(DRIVER_SOURCE.contains(&format!("function {op}(req)")));
        }
    }

    #[test]
    fn test_default_config() {
        let config = JuliaConfig::default();
        assert_eq!(config.executable, PathBuf::from("julia"));
        assert_eq!(config.project, None);
        assert!(config.args.is_empty());
    }

    #[test]
    fn test_missing_executable() {
        let config = JuliaConfigBuilder::default()
            .executable("/nonexistent/cosmo/julia")
            .build()
            .unwrap();
        assert!(matches!(
            JuliaRuntime::start(config),
            Err(EngineError::Runtime(_))
        ));
    }
}
