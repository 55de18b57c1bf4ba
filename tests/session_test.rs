// SPDX-License-Identifier: Apache-2.0

//! End-to-end session behaviour against a scripted decision procedure.

use std::sync::Arc;

use bvsmt::test_utils::ScriptedProcedure;
use bvsmt::{BitVec, Bool, Session, SolverCache};
use pretty_assertions::assert_eq;

/// Answers like a solver that knows `x + 1 == 0` forces `x == 0xff`.
fn increment_wraps_solver() -> ScriptedProcedure {
    ScriptedProcedure::new(|query| {
        if query.contains("bvugt") {
            "unsat\n".to_string()
        } else if query.contains("(get-model)") {
            "sat\n(\n  (define-fun x () (_ BitVec 8)\n    #xff)\n)\n".to_string()
        } else {
            "sat\n".to_string()
        }
    })
}

#[test]
fn test_increment_wraps_to_zero() {
    let _ = env_logger::builder().is_test(true).try_init();
    let procedure = Arc::new(increment_wraps_solver());
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(SolverCache::with_artifact_dir(dir.path()));
    let mut session = Session::with_cache(procedure.clone(), cache.clone());
    let root = session.root();

    let x = BitVec::symbol(8, "x");
    let zero = BitVec::constant(8, 0);
    session.add(root, x.add(&BitVec::constant(8, 1)).equal(&zero));

    assert!(session.check(root, None).unwrap());
    assert_eq!(
        procedure.queries()[0],
        "(set-logic QF_BV)\n\
         (declare-fun x () (_ BitVec 8))\n\
         (assert (= (bvadd x #x01) #x00))\n\
         (check-sat)\n"
    );

    let model = session.model(root, None).unwrap().unwrap();
    assert_eq!(model.get("x").and_then(|v| v.as_u64()), Some(0xff));
    // The model satisfies the assertions it came from.
    for assertion in session.roots(root) {
        assert_eq!(assertion.substitute(&model).value(), Some(true));
    }

    let (child, _) = session.fork(root);
    session.add(child, x.ugt(&zero));
    assert!(!session.check(child, None).unwrap());
    assert!(session.model(child, None).unwrap().is_none());
    assert_eq!(procedure.invocations(), 4);

    // Same queries through a fresh session on the same artifact directory
    // are answered from disk.
    let mut replay = Session::with_cache(
        procedure.clone(),
        Arc::new(SolverCache::with_artifact_dir(dir.path())),
    );
    let replay_root = replay.root();
    replay.add(replay_root, x.add(&BitVec::constant(8, 1)).equal(&zero));
    assert!(replay.check(replay_root, None).unwrap());
    assert_eq!(
        replay.model(replay_root, None).unwrap().unwrap().get("x").and_then(|v| v.as_u64()),
        Some(0xff)
    );
    assert_eq!(procedure.invocations(), 4);
    assert_eq!(replay.cache().stats().artifact_hits, 2);
}

#[test]
fn test_extra_assertion_is_not_retained() {
    let procedure = Arc::new(increment_wraps_solver());
    let mut session =
        Session::with_cache(procedure.clone(), Arc::new(SolverCache::in_memory()));
    let root = session.root();
    let x = BitVec::symbol(8, "x");
    session.add(root, x.add(&BitVec::constant(8, 1)).can_be_zero());

    assert!(!session
        .check(root, Some(&x.ugt(&BitVec::constant(8, 0))))
        .unwrap());
    assert_eq!(session.roots(root).len(), 1);
    assert!(session.check(root, None).unwrap());
}

#[test]
fn test_concretise_then_branch() {
    let procedure = Arc::new(increment_wraps_solver());
    let mut session =
        Session::with_cache(procedure.clone(), Arc::new(SolverCache::in_memory()));
    let root = session.root();
    let x = BitVec::symbol(8, "x");
    session.add(root, x.add(&BitVec::constant(8, 1)).can_be_zero());
    let (child, sibling) = session.fork(root);

    assert!(session.concretise(child).unwrap());
    assert_eq!(session.roots(child), vec![x.equal(&BitVec::constant(8, 0xff))]);
    // The sibling still sees the symbolic constraint.
    assert_eq!(session.roots(sibling).len(), 1);
    assert_ne!(session.roots(sibling), session.roots(child));

    let (grandchild, _) = session.fork(child);
    session.add(grandchild, Bool::symbol("p"));
    assert_eq!(session.roots(grandchild).len(), 2);
}
