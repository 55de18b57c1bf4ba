// SPDX-License-Identifier: Apache-2.0

//! `selftest`: checks that the configured solver answers a small session the
//! way the library expects.

use std::sync::Arc;

use bvsmt::{BitVec, BvsmtError, ExternalSolver, Session, SolverCache, SolverConfig};

use crate::report_cli_error::report_cli_error_and_exit;

/// `x + 1 == 0` over 8 bits has the single solution `x == 0xff`.
fn run_scenario(session: &mut Session) -> Result<(), String> {
    let root = session.root();
    let x = BitVec::symbol(8, "x");
    let zero = BitVec::constant(8, 0);
    session.add(root, x.add(&BitVec::constant(8, 1)).equal(&zero));

    let err = |e: BvsmtError| e.to_string();
    if !session.check(root, None).map_err(err)? {
        return Err("x + 1 == 0 reported unsat".to_string());
    }
    let model = session
        .model(root, None)
        .map_err(err)?
        .ok_or_else(|| "no model for x + 1 == 0".to_string())?;
    match model.get("x").and_then(|v| v.as_u64()) {
        Some(0xff) => {}
        other => return Err(format!("expected x = 0xff, got {:?}", other)),
    }

    let (child, _) = session.fork(root);
    session.add(child, x.ult(&BitVec::constant(8, 0xff)));
    if session.check(child, None).map_err(err)? {
        return Err("x < 0xff should contradict x + 1 == 0".to_string());
    }
    Ok(())
}

pub fn handle_selftest(solver: SolverConfig) {
    let solver_path = solver.solver_path.display().to_string();
    // Always solve for real; a stale artifact would hide a broken solver.
    let mut session = Session::with_cache(
        Arc::new(ExternalSolver::new(solver)),
        Arc::new(SolverCache::in_memory()),
    );
    match run_scenario(&mut session) {
        Ok(()) => println!("selftest: ok"),
        Err(message) => report_cli_error_and_exit(
            &message,
            Some("selftest"),
            vec![("solver", solver_path.as_str())],
        ),
    }
}
