// SPDX-License-Identifier: Apache-2.0

//! `check`: runs a hand-written SMT-LIB query through the cache and solver.

use std::sync::Arc;

use bvsmt::{Decision, ExternalSolver, Query, QueryKind, Session, SolverCache, SolverConfig};
use clap::ArgMatches;

use crate::report_cli_error::report_cli_error_and_exit;

pub fn handle_check(matches: &ArgMatches, solver: SolverConfig) {
    let input_path = matches
        .get_one::<String>("QUERY")
        .expect("QUERY is a required argument");
    let want_model = matches.get_flag("model");

    let text = std::fs::read_to_string(input_path).unwrap_or_else(|e| {
        report_cli_error_and_exit(
            "could not read query file",
            Some("check"),
            vec![("path", input_path.as_str()), ("error", e.to_string().as_str())],
        )
    });
    let kind = if want_model {
        QueryKind::Model
    } else {
        QueryKind::Check
    };
    let query = Query::from_text(kind, &text);

    let cache = Arc::new(SolverCache::for_config(&solver));
    let mut session = Session::with_cache(Arc::new(ExternalSolver::new(solver)), cache);
    log::info!("check: {} ({:?})", input_path, kind);
    match session.decide(&query) {
        Ok(Decision::Unsat) => println!("unsat"),
        Ok(Decision::Sat(model)) => {
            println!("sat");
            if let Some(model) = model {
                print!("{}", model);
            }
            log::info!("solve time: {:?}", session.solve_time());
        }
        Err(e) => report_cli_error_and_exit(
            &e.to_string(),
            Some("check"),
            vec![("query", input_path.as_str())],
        ),
    }
}
