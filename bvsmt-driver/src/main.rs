// SPDX-License-Identifier: Apache-2.0

//! Command line driver for bvsmt.
//!
//! Commands are given like:
//!
//! ```text
//! bvsmt-driver <global-options> <command> <command-args-and-options>
//! ```
//!
//! Sample usage:
//!
//! ```shell
//! $ bvsmt-driver --config=$HOME/bvsmt.toml check query.smt2 --model
//! $ bvsmt-driver --solver=/opt/z3/bin/z3 selftest
//! $ bvsmt-driver cache-clear
//! ```

mod cache_clear;
mod check;
mod config;
mod report_cli_error;
mod selftest;

use clap::{Arg, ArgAction};
use report_cli_error::report_cli_error_and_exit;

fn main() {
    let _ = env_logger::try_init();

    log::info!(
        "bvsmt-driver starting; version: {}",
        env!("CARGO_PKG_VERSION")
    );

    let matches = clap::Command::new("bvsmt-driver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Command line driver for bvsmt solving sessions")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("CONFIG")
                .help("Path to a bvsmt.toml file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("solver")
                .long("solver")
                .value_name("SOLVER")
                .help("Solver executable; overrides the config file")
                .action(ArgAction::Set),
        )
        .subcommand(clap::Command::new("version").about("Prints the version of the driver"))
        .subcommand(
            clap::Command::new("check")
                .about("Decides an SMT-LIB query file, using the result cache")
                .arg(
                    Arg::new("QUERY")
                        .help("SMT-LIB file with declarations and assertions")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("model")
                        .long("model")
                        .help("Print a satisfying assignment when sat")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            clap::Command::new("selftest")
                .about("Runs a small session against the configured solver"),
        )
        .subcommand(
            clap::Command::new("cache-clear").about("Deletes cached solver results"),
        )
        .get_matches();

    let config = config::load_config(&matches);
    let solver = config::get_solver_config(&matches, &config);

    if let Some(matches) = matches.subcommand_matches("check") {
        check::handle_check(matches, solver);
    } else if matches.subcommand_matches("selftest").is_some() {
        selftest::handle_selftest(solver);
    } else if matches.subcommand_matches("cache-clear").is_some() {
        cache_clear::handle_cache_clear(solver);
    } else if matches.subcommand_matches("version").is_some() {
        println!("{}", env!("CARGO_PKG_VERSION"));
    } else {
        report_cli_error_and_exit("No valid subcommand provided.", None, vec![]);
    }
}
