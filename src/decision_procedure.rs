// SPDX-License-Identifier: Apache-2.0

//! The seam between a solving session and the program that decides queries.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;

/// Decides the SMT-LIB query at `query_path`, writing everything it prints
/// to `output_path`.
///
/// Implementations only report failures to run at all; a solver that runs
/// and prints an error message has still produced output.
pub trait DecisionProcedure: Send + Sync {
    fn run(&self, query_path: &Path, output_path: &Path) -> io::Result<()>;
}

/// How to invoke an external solver binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SolverConfig {
    /// Solver executable, resolved through `PATH` when relative.
    pub solver_path: PathBuf,

    /// Arguments placed before the query file path.
    #[serde(default)]
    pub solver_args: Vec<String>,

    /// Directory for on-disk result artifacts.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl SolverConfig {
    pub fn z3() -> Self {
        SolverConfig {
            solver_path: PathBuf::from("z3"),
            solver_args: vec!["-smt2".to_string()],
            cache_dir: None,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig::z3()
    }
}

/// Runs `solver_path solver_args... <query>` with stdout sent to the output
/// file.
#[derive(Debug, Clone)]
pub struct ExternalSolver {
    config: SolverConfig,
}

impl ExternalSolver {
    pub fn new(config: SolverConfig) -> Self {
        ExternalSolver { config }
    }

    pub fn z3() -> Self {
        ExternalSolver::new(SolverConfig::z3())
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl DecisionProcedure for ExternalSolver {
    fn run(&self, query_path: &Path, output_path: &Path) -> io::Result<()> {
        let output_file = File::create(output_path)?;
        let mut command = Command::new(&self.config.solver_path);
        command
            .args(&self.config.solver_args)
            .arg(query_path)
            .stdin(Stdio::null())
            .stdout(Stdio::from(output_file))
            .stderr(Stdio::piped());
        log::info!("command: {:?}", command);

        let mut child = command.spawn()?;
        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            pipe.read_to_string(&mut stderr)?;
        }
        let status = child.wait()?;
        if !status.success() {
            // Solvers report query errors on stdout with a failing status;
            // only an empty output means the solver could not run properly.
            let produced_output = std::fs::metadata(output_path)?.len() > 0;
            log::debug!(
                "solver exited with {}; stderr: {}",
                status,
                stderr.trim_end()
            );
            if !produced_output {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!(
                        "{} exited with {} and no output: {}",
                        self.config.solver_path.display(),
                        status,
                        stderr.trim_end()
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_toml() {
        let config: SolverConfig = toml::from_str(
            r#"
            solver_path = "/opt/bin/bitwuzla"
            solver_args = ["--lang", "smt2"]
            "#,
        )
        .unwrap();
        assert_eq!(config.solver_path, PathBuf::from("/opt/bin/bitwuzla"));
        assert_eq!(config.solver_args, vec!["--lang", "smt2"]);
        assert_eq!(config.cache_dir, None);
    }

    #[test]
    fn test_z3_is_default() {
        assert_eq!(SolverConfig::default(), SolverConfig::z3());
        assert_eq!(ExternalSolver::z3().config().solver_args, vec!["-smt2"]);
    }

    #[test]
    fn test_missing_binary_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let solver = ExternalSolver::new(SolverConfig {
            solver_path: dir.path().join("no-such-solver"),
            solver_args: vec![],
            cache_dir: None,
        });
        let query = dir.path().join("q.smt2");
        std::fs::write(&query, "(check-sat)\n").unwrap();
        assert!(solver.run(&query, &dir.path().join("q.out")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_command_into_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-solver.sh");
        std::fs::write(&script, "echo sat\necho \"$1\" >&2\n").unwrap();
        let solver = ExternalSolver::new(SolverConfig {
            solver_path: PathBuf::from("/bin/sh"),
            solver_args: vec![script.display().to_string()],
            cache_dir: None,
        });
        let query = dir.path().join("q.smt2");
        std::fs::write(&query, "(check-sat)\n").unwrap();
        let output = dir.path().join("q.out");
        solver.run(&query, &output).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "sat\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_solver_with_output_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-solver.sh");
        std::fs::write(
            &script,
            "echo '(error \"line 1 column 1: bad\")'\nexit 1\n",
        )
        .unwrap();
        let solver = ExternalSolver::new(SolverConfig {
            solver_path: PathBuf::from("/bin/sh"),
            solver_args: vec![script.display().to_string()],
            cache_dir: None,
        });
        let query = dir.path().join("q.smt2");
        std::fs::write(&query, "(check-sat)\n").unwrap();
        let output = dir.path().join("q.out");
        solver.run(&query, &output).unwrap();

        std::fs::write(&script, "exit 3\n").unwrap();
        assert!(solver.run(&query, &output).is_err());
    }
}
