// A stand-in for the Julia runtime: a shell script speaking the driver's
// line protocol with canned responses.  Every request line is appended to
// a log file so tests can check what was sent.

#![allow(dead_code)]

use cosmo::engine::julia::{JuliaConfigBuilder, JuliaRuntime};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const FAKE_DRIVER: &str = r#"
LOG="$1"
M='@@cosmo-response@@ '
ok() { printf '%s%s\n' "$M" '{"status":"ok","result":null}'; }

echo "fake julia loading COSMO"
ok
while IFS= read -r line; do
  echo "$line" >> "$LOG"
  case "$line" in
    *'"op":"setup"'*FooKKTSolver*)
      printf '%s%s\n' "$M" '{"status":"error","kind":"initialization","message":"UndefVarError: FooKKTSolver not defined"}' ;;
    *'"op":"setup"'*) ok ;;
    *'"op":"warm_start"'*666*) exit 3 ;;
    *'"op":"warm_start"'*) ok ;;
    *'"op":"optimize"'*)
      echo "------ COSMO v0.8.8 ------"
      echo "Iter:  Objective:"
      printf '%s%s\n' "$M" '{"status":"ok","result":{"x":[0.3,0.7],"y":[0.0,0.0,0.0,1.6,0.0,0.0],"s":[0.0,0.4,0.0,0.0,0.3,0.7],"obj_val":1.88,"iter":25,"status":"Solved","times":{"solver_time":0.01,"setup_time":0.002,"iter_time":"NaN"}}}' ;;
    *'"op":"free"'*) ok ;;
    *'"op":"exit"'*) ok; exit 0 ;;
    *) printf '%s%s\n' "$M" '{"status":"error","kind":"runtime","message":"unknown request"}' ;;
  esac
done
"#;

// field order matters: the runtime exits before its directory goes
pub struct FakeJulia {
    pub runtime: Arc<JuliaRuntime>,
    dir: TempDir,
}

impl FakeJulia {
    pub fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("julia.sh");
        std::fs::write(&script, FAKE_DRIVER).unwrap();

        let config = JuliaConfigBuilder::default()
            .executable("sh")
            .args(vec![
                script.display().to_string(),
                Self::log_path(&dir).display().to_string(),
            ])
            .build()
            .unwrap();

        let runtime = Arc::new(JuliaRuntime::start(config).unwrap());
        FakeJulia { runtime, dir }
    }

    fn log_path(dir: &TempDir) -> PathBuf {
        dir.path().join("requests.log")
    }

    /// request lines received so far
    pub fn requests(&self) -> Vec<String> {
        std::fs::read_to_string(Self::log_path(&self.dir))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
