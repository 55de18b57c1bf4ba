// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use bvsmt::SolverConfig;
use clap::ArgMatches;
use serde::Deserialize;

use crate::report_cli_error::report_cli_error_and_exit;

/// Name of the config file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "bvsmt.toml";

/// Top level of a `bvsmt.toml` file.
#[derive(Debug, Deserialize)]
pub struct BvsmtToml {
    /// How to run the solver and where to keep its results.
    pub solver: SolverConfig,
}

/// Loads the `--config` file, or `bvsmt.toml` in the working directory when
/// no flag is given.
pub fn load_config(matches: &ArgMatches) -> Option<SolverConfig> {
    let mut toml_path: Option<PathBuf> = matches.get_one::<String>("config").map(PathBuf::from);

    if toml_path.is_none() {
        let cwd_toml_path = Path::new(CONFIG_FILE_NAME);
        if cwd_toml_path.exists() {
            log::info!("Using {} in current directory", CONFIG_FILE_NAME);
            toml_path = Some(cwd_toml_path.to_path_buf());
        }
    }

    let path = toml_path?;
    let path_str = path.display().to_string();
    let text = std::fs::read_to_string(&path).unwrap_or_else(|e| {
        report_cli_error_and_exit(
            "could not read config file",
            None,
            vec![("path", path_str.as_str()), ("error", e.to_string().as_str())],
        )
    });
    match toml::from_str::<BvsmtToml>(&text) {
        Ok(parsed) => Some(parsed.solver),
        Err(e) => report_cli_error_and_exit(
            "could not parse config file",
            None,
            vec![("path", path_str.as_str()), ("error", e.to_string().as_str())],
        ),
    }
}

/// The `--solver` flag overrides the configured binary; without either, z3
/// is used.
pub fn get_solver_config(matches: &ArgMatches, config: &Option<SolverConfig>) -> SolverConfig {
    let mut solver = config.clone().unwrap_or_else(SolverConfig::z3);
    if let Some(solver_path) = matches.get_one::<String>("solver") {
        solver.solver_path = PathBuf::from(solver_path);
    }
    solver
}
