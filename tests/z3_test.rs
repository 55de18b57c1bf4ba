// SPDX-License-Identifier: Apache-2.0

//! Tests that shell out to a `z3` binary on `PATH`.

#![cfg(feature = "with-z3-binary-test")]

use std::sync::Arc;

use bvsmt::{
    BinaryOperator, BitVec, Bool, BvsmtError, ExternalSolver, Query, QueryKind, Session,
    SolverCache,
};
use test_case::test_case;

const SIZES: &[usize] = &[8, 16, 32, 64];

const VALUES: &[i128] = &[
    0,
    1,
    -1,
    0x7f,
    0xff,
    0x7fff,
    0xffff,
    0x7fff_ffff,
    0xffff_ffff,
    0x7fff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
];

fn z3_session() -> Session {
    let _ = env_logger::builder().is_test(true).try_init();
    Session::with_cache(
        Arc::new(ExternalSolver::z3()),
        Arc::new(SolverCache::in_memory()),
    )
}

/// A session whose root pins one symbol per test value, returned alongside
/// (symbol, constant) pairs.
fn pinned_operands(size: usize) -> (Session, Vec<(BitVec, BitVec)>) {
    let mut session = z3_session();
    let root = session.root();
    let operands: Vec<(BitVec, BitVec)> = VALUES
        .iter()
        .enumerate()
        .map(|(i, v)| {
            (
                BitVec::symbol(size, format!("v{}", i)),
                BitVec::constant(size, *v),
            )
        })
        .collect();
    for (symbol, constant) in &operands {
        session.add(root, symbol.equal(constant));
    }
    (session, operands)
}

#[test_case(BinaryOperator::And)]
#[test_case(BinaryOperator::Or)]
#[test_case(BinaryOperator::Xor)]
#[test_case(BinaryOperator::Nand)]
#[test_case(BinaryOperator::Nor)]
#[test_case(BinaryOperator::Xnor)]
#[test_case(BinaryOperator::Add)]
#[test_case(BinaryOperator::Subtract)]
#[test_case(BinaryOperator::Multiply)]
#[test_case(BinaryOperator::UnsignedDivide)]
#[test_case(BinaryOperator::UnsignedRemainder)]
#[test_case(BinaryOperator::SignedDivide)]
#[test_case(BinaryOperator::SignedRemainder)]
#[test_case(BinaryOperator::SignedModulo)]
#[test_case(BinaryOperator::ShiftLeft)]
#[test_case(BinaryOperator::LogicalShiftRight)]
#[test_case(BinaryOperator::ArithmeticShiftRight)]
#[test_case(BinaryOperator::RotateLeft)]
#[test_case(BinaryOperator::RotateRight)]
fn test_folding_agrees_with_z3(op: BinaryOperator) {
    for &size in SIZES {
        let (mut session, operands) = pinned_operands(size);
        let mut mismatch = Bool::constant(false);
        for (xs, xc) in &operands {
            for (ys, yc) in &operands {
                let folded = BitVec::binary(xc, op, yc).unwrap();
                assert!(folded.is_concrete());
                let symbolic = BitVec::binary(xs, op, ys).unwrap();
                mismatch = mismatch.or(&symbolic.not_equal(&folded));
            }
        }
        let root = session.root();
        assert!(
            !session.check(root, Some(&mismatch)).unwrap(),
            "{:?} folds differently from z3 at {} bits",
            op,
            size
        );
    }
}

#[test_case(BinaryOperator::Equal)]
#[test_case(BinaryOperator::UnsignedLessThan)]
#[test_case(BinaryOperator::UnsignedLessOrEqual)]
#[test_case(BinaryOperator::UnsignedGreaterThan)]
#[test_case(BinaryOperator::UnsignedGreaterOrEqual)]
#[test_case(BinaryOperator::SignedLessThan)]
#[test_case(BinaryOperator::SignedLessOrEqual)]
#[test_case(BinaryOperator::SignedGreaterThan)]
#[test_case(BinaryOperator::SignedGreaterOrEqual)]
fn test_comparison_folding_agrees_with_z3(op: BinaryOperator) {
    for &size in SIZES {
        let (mut session, operands) = pinned_operands(size);
        let mut mismatch = Bool::constant(false);
        for (xs, xc) in &operands {
            for (ys, yc) in &operands {
                let folded = BitVec::compare(xc, op, yc).unwrap();
                assert!(folded.is_concrete());
                let symbolic = BitVec::compare(xs, op, ys).unwrap();
                mismatch = mismatch.or(&symbolic.xor(&folded));
            }
        }
        let root = session.root();
        assert!(
            !session.check(root, Some(&mismatch)).unwrap(),
            "{:?} folds differently from z3 at {} bits",
            op,
            size
        );
    }
}

#[test]
fn test_structural_folding_agrees_with_z3() {
    for &size in SIZES {
        let (mut session, operands) = pinned_operands(size);
        let mut mismatch = Bool::constant(false);
        for (s, c) in &operands {
            let pairs = [
                (s.invert(), c.invert()),
                (s.negate(), c.negate()),
                (s.sign_extend(8), c.sign_extend(8)),
                (s.zero_extend(8), c.zero_extend(8)),
                (s.extract(1, size), c.extract(1, size)),
                (s.extract(size / 2, size - 1), c.extract(size / 2, size - 1)),
                (s.repeat(2), c.repeat(2)),
                (s.concat(c), c.concat(c)),
            ];
            for (symbolic, folded) in pairs {
                assert!(folded.is_concrete());
                mismatch = mismatch.or(&symbolic.not_equal(&folded));
            }
        }
        let root = session.root();
        assert!(!session.check(root, Some(&mismatch)).unwrap(), "{} bits", size);
    }
}

#[test]
fn test_increment_wraps_to_zero() {
    let mut session = z3_session();
    let root = session.root();
    let x = BitVec::symbol(8, "x");
    let zero = BitVec::constant(8, 0);
    session.add(root, x.add(&BitVec::constant(8, 1)).equal(&zero));

    assert!(session.check(root, None).unwrap());
    let model = session.model(root, None).unwrap().unwrap();
    assert_eq!(model.get("x").and_then(|v| v.as_u64()), Some(0xff));

    let (child, _) = session.fork(root);
    session.add(child, x.ugt(&zero));
    assert!(session.check(child, None).unwrap());
    session.add(child, x.ult(&BitVec::constant(8, 0xff)));
    assert!(!session.check(child, None).unwrap());
    assert!(session.check(root, None).unwrap());
}

#[test]
fn test_unconstrained_symbols_get_placeholders() {
    let mut session = z3_session();
    let root = session.root();
    let x = BitVec::symbol(32, "x");
    let p = Bool::symbol("p");
    session.add(root, p.or(&p.not()));
    session.add(root, x.equal(&x));
    let model = session.model(root, None).unwrap().unwrap();
    assert!(model.contains("x"));
    assert!(model.contains("p"));
}

#[test]
fn test_undeclared_symbol_reports_location() {
    let mut session = z3_session();
    let query = Query::from_text(QueryKind::Check, "(assert (= x #x00))\n");
    match session.decide(&query) {
        Err(BvsmtError::Solver(e)) => {
            let location = e.location().expect("z3 reports a location");
            assert_eq!(location.line, 1);
        }
        other => panic!("expected a solver error, got {:?}", other),
    }
}
