// SPDX-License-Identifier: Apache-2.0

//! Boolean expressions, including comparisons over bitvectors.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::bitvector::{self, BitVec};
use crate::bvsmt_error::BvsmtError;
use crate::memo::{ContentHash, Memo, SymbolDecl};
use crate::model::{Model, ModelValue};
use crate::ops::{self, BinaryOperator, UnaryOperator};

#[derive(Debug)]
pub enum BoolKind {
    Constant(bool),
    Symbol(String),
    UnaryOperation {
        op: UnaryOperator,
        operand: Bool,
    },
    BinaryOperation {
        lhs: Bool,
        op: BinaryOperator,
        rhs: Bool,
    },
    Comparison {
        lhs: BitVec,
        op: BinaryOperator,
        rhs: BitVec,
    },
    IfThenElse {
        predicate: Bool,
        if_case: Bool,
        else_case: Bool,
    },
}

struct BoolNode {
    kind: BoolKind,
    memo: Memo,
}

/// Shared handle to an immutable boolean node.
#[derive(Clone)]
pub struct Bool(Arc<BoolNode>);

impl Bool {
    fn from_kind(kind: BoolKind) -> Bool {
        Bool(Arc::new(BoolNode {
            kind,
            memo: Memo::default(),
        }))
    }

    pub fn constant(value: bool) -> Bool {
        Bool::from_kind(BoolKind::Constant(value))
    }

    pub fn symbol(name: impl Into<String>) -> Bool {
        Bool::from_kind(BoolKind::Symbol(name.into()))
    }

    pub fn kind(&self) -> &BoolKind {
        &self.0.kind
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self.kind(), BoolKind::Constant(_))
    }

    pub fn value(&self) -> Option<bool> {
        match self.kind() {
            BoolKind::Constant(value) => Some(*value),
            _ => None,
        }
    }

    pub fn serialize(&self) -> &str {
        self.0.memo.serialized(|| self.render())
    }

    pub fn content_hash(&self) -> ContentHash {
        self.0.memo.content_hash(self.serialize())
    }

    pub fn free_symbols(&self) -> Arc<BTreeSet<SymbolDecl>> {
        self.0.memo.symbols(|| {
            let mut symbols = BTreeSet::new();
            match self.kind() {
                BoolKind::Constant(_) => {}
                BoolKind::Symbol(name) => {
                    symbols.insert(SymbolDecl::bool(name.clone()));
                }
                BoolKind::UnaryOperation { operand, .. } => {
                    symbols.extend(operand.free_symbols().iter().cloned());
                }
                BoolKind::BinaryOperation { lhs, rhs, .. } => {
                    symbols.extend(lhs.free_symbols().iter().cloned());
                    symbols.extend(rhs.free_symbols().iter().cloned());
                }
                BoolKind::Comparison { lhs, rhs, .. } => {
                    symbols.extend(lhs.free_symbols().iter().cloned());
                    symbols.extend(rhs.free_symbols().iter().cloned());
                }
                BoolKind::IfThenElse {
                    predicate,
                    if_case,
                    else_case,
                } => {
                    symbols.extend(predicate.free_symbols().iter().cloned());
                    symbols.extend(if_case.free_symbols().iter().cloned());
                    symbols.extend(else_case.free_symbols().iter().cloned());
                }
            }
            symbols
        })
    }

    fn render(&self) -> String {
        match self.kind() {
            BoolKind::Constant(value) => value.to_string(),
            BoolKind::Symbol(name) => name.clone(),
            BoolKind::UnaryOperation { op, operand } => format!(
                "({} {})",
                ops::boolean_unary_operator(*op).expect("boolean operator checked at construction"),
                operand.serialize()
            ),
            BoolKind::BinaryOperation { lhs, op, rhs } => format!(
                "({} {} {})",
                ops::boolean_operator(*op).expect("boolean operator checked at construction"),
                lhs.serialize(),
                rhs.serialize()
            ),
            BoolKind::Comparison { lhs, op, rhs } => format!(
                "({} {} {})",
                ops::comparison_operator(*op).expect("comparison checked at construction"),
                lhs.serialize(),
                rhs.serialize()
            ),
            BoolKind::IfThenElse {
                predicate,
                if_case,
                else_case,
            } => format!(
                "(ite {} {} {})",
                predicate.serialize(),
                if_case.serialize(),
                else_case.serialize()
            ),
        }
    }

    /// Only `Not` has a boolean meaning; `Negate` is rejected.
    pub fn unary(op: UnaryOperator, operand: &Bool) -> Result<Bool, BvsmtError> {
        if ops::boolean_unary_operator(op).is_none() {
            return Err(BvsmtError::InvalidExpression(format!(
                "{:?} has no boolean meaning: ({:?} {})",
                op, op, operand
            )));
        }
        Ok(match operand.value() {
            Some(value) => Bool::constant(!value),
            None => Bool::from_kind(BoolKind::UnaryOperation {
                op,
                operand: operand.clone(),
            }),
        })
    }

    pub fn binary(lhs: &Bool, op: BinaryOperator, rhs: &Bool) -> Result<Bool, BvsmtError> {
        if ops::boolean_operator(op).is_none() {
            return Err(BvsmtError::InvalidExpression(format!(
                "{:?} is not a boolean connective: ({:?} {} {})",
                op, op, lhs, rhs
            )));
        }
        Ok(Bool::apply_binary(lhs, op, rhs))
    }

    fn apply_binary(lhs: &Bool, op: BinaryOperator, rhs: &Bool) -> Bool {
        if let (Some(a), Some(b)) = (lhs.value(), rhs.value()) {
            let folded = match op {
                BinaryOperator::And => a && b,
                BinaryOperator::Or => a || b,
                BinaryOperator::Xor => a ^ b,
                BinaryOperator::Implies => !a || b,
                BinaryOperator::Equal => a == b,
                _ => unreachable!("{:?} is not a boolean connective", op),
            };
            return Bool::constant(folded);
        }
        Bool::from_kind(BoolKind::BinaryOperation {
            lhs: lhs.clone(),
            op,
            rhs: rhs.clone(),
        })
    }

    pub(crate) fn comparison(lhs: &BitVec, op: BinaryOperator, rhs: &BitVec) -> Bool {
        assert_eq!(
            lhs.size(),
            rhs.size(),
            "Bitvector width mismatch for {:?}: {} vs {}",
            op,
            lhs.size(),
            rhs.size()
        );
        if let (Some(a), Some(b)) = (lhs.value(), rhs.value()) {
            return Bool::constant(bitvector::fold_comparison(op, a, b, lhs.size()));
        }
        Bool::from_kind(BoolKind::Comparison {
            lhs: lhs.clone(),
            op,
            rhs: rhs.clone(),
        })
    }

    pub fn not(&self) -> Bool {
        match self.value() {
            Some(value) => Bool::constant(!value),
            None => Bool::from_kind(BoolKind::UnaryOperation {
                op: UnaryOperator::Not,
                operand: self.clone(),
            }),
        }
    }

    pub fn and(&self, rhs: &Bool) -> Bool {
        Bool::apply_binary(self, BinaryOperator::And, rhs)
    }

    pub fn or(&self, rhs: &Bool) -> Bool {
        Bool::apply_binary(self, BinaryOperator::Or, rhs)
    }

    pub fn xor(&self, rhs: &Bool) -> Bool {
        Bool::apply_binary(self, BinaryOperator::Xor, rhs)
    }

    pub fn implies(&self, rhs: &Bool) -> Bool {
        Bool::apply_binary(self, BinaryOperator::Implies, rhs)
    }

    pub fn equal(&self, rhs: &Bool) -> Bool {
        Bool::apply_binary(self, BinaryOperator::Equal, rhs)
    }

    pub fn not_equal(&self, rhs: &Bool) -> Bool {
        self.equal(rhs).not()
    }

    pub fn if_then_else(predicate: &Bool, if_case: &Bool, else_case: &Bool) -> Bool {
        match predicate.value() {
            Some(true) => if_case.clone(),
            Some(false) => else_case.clone(),
            None => Bool::from_kind(BoolKind::IfThenElse {
                predicate: predicate.clone(),
                if_case: if_case.clone(),
                else_case: else_case.clone(),
            }),
        }
    }

    /// Rebuilds the expression with the symbols bound in `model` replaced by
    /// constants. A fully bound expression folds to a constant.
    pub fn substitute(&self, model: &Model) -> Bool {
        match self.kind() {
            BoolKind::Constant(_) => self.clone(),
            BoolKind::Symbol(name) => match model.get(name) {
                Some(ModelValue::Bool(value)) => Bool::constant(*value),
                _ => self.clone(),
            },
            BoolKind::UnaryOperation { operand, .. } => operand.substitute(model).not(),
            BoolKind::BinaryOperation { lhs, op, rhs } => {
                Bool::apply_binary(&lhs.substitute(model), *op, &rhs.substitute(model))
            }
            BoolKind::Comparison { lhs, op, rhs } => {
                Bool::comparison(&lhs.substitute(model), *op, &rhs.substitute(model))
            }
            BoolKind::IfThenElse {
                predicate,
                if_case,
                else_case,
            } => Bool::if_then_else(
                &predicate.substitute(model),
                &if_case.substitute(model),
                &else_case.substitute(model),
            ),
        }
    }
}

impl From<bool> for Bool {
    fn from(value: bool) -> Self {
        Bool::constant(value)
    }
}

impl PartialEq for Bool {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.content_hash() == other.content_hash()
    }
}

impl Eq for Bool {}

impl Hash for Bool {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(self.content_hash().as_bytes());
    }
}

impl fmt::Display for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.serialize())
    }
}

impl fmt::Debug for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bool({})", self.serialize())
    }
}

impl std::ops::Not for &Bool {
    type Output = Bool;

    fn not(self) -> Bool {
        Bool::not(self)
    }
}

impl std::ops::BitAnd<&Bool> for &Bool {
    type Output = Bool;

    fn bitand(self, rhs: &Bool) -> Bool {
        self.and(rhs)
    }
}

impl std::ops::BitOr<&Bool> for &Bool {
    type Output = Bool;

    fn bitor(self, rhs: &Bool) -> Bool {
        self.or(rhs)
    }
}

impl std::ops::BitXor<&Bool> for &Bool {
    type Output = Bool;

    fn bitxor(self, rhs: &Bool) -> Bool {
        self.xor(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(BinaryOperator::And, true, false => false)]
    #[test_case(BinaryOperator::Or, true, false => true)]
    #[test_case(BinaryOperator::Xor, true, true => false)]
    #[test_case(BinaryOperator::Implies, false, false => true)]
    #[test_case(BinaryOperator::Implies, true, false => false)]
    #[test_case(BinaryOperator::Equal, false, false => true)]
    fn test_connectives_fold(op: BinaryOperator, a: bool, b: bool) -> bool {
        Bool::binary(&a.into(), op, &b.into())
            .unwrap()
            .value()
            .expect("constant operands fold")
    }

    #[test]
    fn test_symbolic_serialization() {
        let p = Bool::symbol("p");
        let q = Bool::symbol("q");
        assert_eq!(p.and(&q).serialize(), "(and p q)");
        assert_eq!(p.implies(&q).serialize(), "(=> p q)");
        assert_eq!((!&p).serialize(), "(not p)");
        assert_eq!((&p ^ &q).serialize(), "(xor p q)");
        assert_eq!(
            Bool::if_then_else(&p, &q, &Bool::constant(false)).serialize(),
            "(ite p q false)"
        );
        assert_eq!(Bool::constant(true).serialize(), "true");
    }

    #[test]
    fn test_negate_is_malformed_for_booleans() {
        let p = Bool::symbol("p");
        match Bool::unary(UnaryOperator::Negate, &p) {
            Err(BvsmtError::InvalidExpression(msg)) => assert!(msg.contains("Negate"), "{}", msg),
            other => panic!("expected InvalidExpression, got {:?}", other),
        }
        assert_eq!(
            Bool::unary(UnaryOperator::Not, &p).unwrap().serialize(),
            "(not p)"
        );
        assert!(Bool::binary(&p, BinaryOperator::Add, &p).is_err());
    }

    #[test]
    fn test_constant_predicate_selects_arm() {
        let p = Bool::symbol("p");
        let q = Bool::symbol("q");
        assert_eq!(Bool::if_then_else(&true.into(), &p, &q), p);
        assert_eq!(Bool::if_then_else(&false.into(), &p, &q), q);
    }

    #[test]
    fn test_substitute_comparison() {
        let x = BitVec::symbol(8, "x");
        let p = Bool::symbol("p");
        let expr = p.and(&x.add(&BitVec::constant(8, 1)).equal(&BitVec::constant(8, 0)));
        let mut model = Model::new();
        model.insert("p", ModelValue::Bool(true));
        assert_eq!(
            expr.substitute(&model).serialize(),
            "(and true (= (bvadd x #x01) #x00))"
        );
        model.insert("x", ModelValue::bitvec(8, 0xffu32));
        assert_eq!(expr.substitute(&model).value(), Some(true));
        model.insert("x", ModelValue::bitvec(8, 0x00u32));
        assert_eq!(expr.substitute(&model).value(), Some(false));
    }
}
