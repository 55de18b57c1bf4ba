// SPDX-License-Identifier: Apache-2.0

//! Fixed-width bitvector expressions.
//!
//! Every combinator folds eagerly when all operands are constants. The
//! structural constructors (`extract`, `concatenate`, the extensions) also
//! simplify at construction time: extracting the full width returns the
//! operand, extractions over an extension look through it, and a
//! concatenation that only reassembles adjacent slices of one value becomes a
//! single extraction of that value.
//!
//! Operands of binary operators must have equal widths on both the concrete
//! and the symbolic path; a mismatch is a programming error and panics.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};

use crate::bits;
use crate::boolean::Bool;
use crate::bvsmt_error::BvsmtError;
use crate::memo::{ContentHash, Memo, SymbolDecl};
use crate::model::{Model, ModelValue};
use crate::ops::{self, BinaryOperator, ExtensionKind, UnaryOperator};

#[derive(Debug)]
pub enum BitVecKind {
    Constant(BigUint),
    Symbol(String),
    UnaryOperation {
        op: UnaryOperator,
        operand: BitVec,
    },
    BinaryOperation {
        lhs: BitVec,
        op: BinaryOperator,
        rhs: BitVec,
    },
    /// Most significant element first.
    Concatenation(Vec<BitVec>),
    Repetition {
        operand: BitVec,
        count: usize,
    },
    /// Bits `[start, end)` of the operand.
    Extraction {
        operand: BitVec,
        start: usize,
        end: usize,
    },
    Extension {
        operand: BitVec,
        kind: ExtensionKind,
        extension_size: usize,
    },
    IfThenElse {
        predicate: Bool,
        if_case: BitVec,
        else_case: BitVec,
    },
}

struct BitVecNode {
    size: usize,
    kind: BitVecKind,
    memo: Memo,
}

/// Shared handle to an immutable bitvector node.
#[derive(Clone)]
pub struct BitVec(Arc<BitVecNode>);

impl BitVec {
    fn from_kind(size: usize, kind: BitVecKind) -> BitVec {
        assert!(size > 0, "bitvector size must be positive");
        BitVec(Arc::new(BitVecNode {
            size,
            kind,
            memo: Memo::default(),
        }))
    }

    fn from_residue(size: usize, value: BigUint) -> BitVec {
        let value = bits::truncate(&value, size);
        BitVec::from_kind(size, BitVecKind::Constant(value))
    }

    /// A `size`-bit constant; negative values are taken in two's complement
    /// and out-of-range values wrap.
    pub fn constant<V: Into<BigInt>>(size: usize, value: V) -> BitVec {
        assert!(size > 0, "bitvector size must be positive");
        BitVec::from_kind(size, BitVecKind::Constant(bits::wrap(&value.into(), size)))
    }

    pub fn from_biguint(size: usize, value: &BigUint) -> BitVec {
        assert!(size > 0, "bitvector size must be positive");
        BitVec::from_residue(size, value.clone())
    }

    pub fn symbol(size: usize, name: impl Into<String>) -> BitVec {
        BitVec::from_kind(size, BitVecKind::Symbol(name.into()))
    }

    pub fn size(&self) -> usize {
        self.0.size
    }

    pub fn kind(&self) -> &BitVecKind {
        &self.0.kind
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self.kind(), BitVecKind::Constant(_))
    }

    /// Unsigned value of a constant node.
    pub fn value(&self) -> Option<&BigUint> {
        match self.kind() {
            BitVecKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Two's complement value of a constant node.
    pub fn signed_value(&self) -> Option<BigInt> {
        self.value().map(|v| bits::to_signed(v, self.size()))
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.value().and_then(ToPrimitive::to_u64)
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
                BitVecKind::Constant(_) => {}
                BitVecKind::Symbol(name) => {
                    symbols.insert(SymbolDecl::bitvec(name.clone(), self.size()));
                }
                BitVecKind::UnaryOperation { operand, .. }
                | BitVecKind::Repetition { operand, .. }
                | BitVecKind::Extraction { operand, .. }
                | BitVecKind::Extension { operand, .. } => {
                    symbols.extend(operand.free_symbols().iter().cloned());
                }
                BitVecKind::BinaryOperation { lhs, rhs, .. } => {
                    symbols.extend(lhs.free_symbols().iter().cloned());
                    symbols.extend(rhs.free_symbols().iter().cloned());
                }
                BitVecKind::Concatenation(elements) => {
                    for element in elements {
                        symbols.extend(element.free_symbols().iter().cloned());
                    }
                }
                BitVecKind::IfThenElse {
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
            BitVecKind::Constant(value) => render_constant(self.size(), value),
            BitVecKind::Symbol(name) => name.clone(),
            BitVecKind::UnaryOperation { op, operand } => format!(
                "({} {})",
                ops::bitvector_unary_operator(*op),
                operand.serialize()
            ),
            BitVecKind::BinaryOperation { lhs, op, rhs } => format!(
                "({} {} {})",
                ops::bitvector_operator(*op).expect("bitvector operator checked at construction"),
                lhs.serialize(),
                rhs.serialize()
            ),
            BitVecKind::Concatenation(elements) => {
                // SMT-LIB `concat` is binary; nest to the right.
                let mut iter = elements.iter().rev();
                let mut text = iter
                    .next()
                    .map(|e| e.serialize().to_string())
                    .unwrap_or_default();
                for element in iter {
                    text = format!("(concat {} {})", element.serialize(), text);
                }
                text
            }
            BitVecKind::Repetition { operand, count } => {
                format!("((_ repeat {}) {})", count, operand.serialize())
            }
            BitVecKind::Extraction {
                operand,
                start,
                end,
            } => format!(
                "((_ extract {} {}) {})",
                end - 1,
                start,
                operand.serialize()
            ),
            BitVecKind::Extension {
                operand,
                kind,
                extension_size,
            } => format!(
                "((_ {} {}) {})",
                ops::extension_operator(*kind),
                extension_size,
                operand.serialize()
            ),
            BitVecKind::IfThenElse {
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

    // -- Generic constructors

    pub fn unary(op: UnaryOperator, operand: &BitVec) -> BitVec {
        if let Some(value) = operand.value() {
            let size = operand.size();
            let folded = match op {
                UnaryOperator::Not => value ^ &bits::mask(size),
                UnaryOperator::Negate => bits::negate(value, size),
            };
            return BitVec::from_residue(size, folded);
        }
        BitVec::from_kind(
            operand.size(),
            BitVecKind::UnaryOperation {
                op,
                operand: operand.clone(),
            },
        )
    }

    /// Applies a bitvector-valued operator, rejecting comparison and
    /// boolean-only tags.
    pub fn binary(lhs: &BitVec, op: BinaryOperator, rhs: &BitVec) -> Result<BitVec, BvsmtError> {
        if ops::bitvector_operator(op).is_none() {
            return Err(BvsmtError::InvalidExpression(format!(
                "{:?} does not produce a bitvector: ({:?} {} {})",
                op, op, lhs, rhs
            )));
        }
        Ok(BitVec::apply_binary(lhs, op, rhs))
    }

    /// Applies a comparison operator, rejecting bitvector-valued and
    /// boolean-only tags.
    pub fn compare(lhs: &BitVec, op: BinaryOperator, rhs: &BitVec) -> Result<Bool, BvsmtError> {
        if ops::comparison_operator(op).is_none() {
            return Err(BvsmtError::InvalidExpression(format!(
                "{:?} is not a bitvector comparison: ({:?} {} {})",
                op, op, lhs, rhs
            )));
        }
        Ok(Bool::comparison(lhs, op, rhs))
    }

    fn apply_binary(lhs: &BitVec, op: BinaryOperator, rhs: &BitVec) -> BitVec {
        assert_eq!(
            lhs.size(),
            rhs.size(),
            "Bitvector width mismatch for {:?}: {} vs {}",
            op,
            lhs.size(),
            rhs.size()
        );
        match (lhs.value(), rhs.value()) {
            (Some(a), Some(b)) => {
                BitVec::from_residue(lhs.size(), fold_binary(op, a, b, lhs.size()))
            }
            _ => BitVec::from_kind(
                lhs.size(),
                BitVecKind::BinaryOperation {
                    lhs: lhs.clone(),
                    op,
                    rhs: rhs.clone(),
                },
            ),
        }
    }

    // -- Named combinators

    pub fn invert(&self) -> BitVec {
        BitVec::unary(UnaryOperator::Not, self)
    }

    pub fn negate(&self) -> BitVec {
        BitVec::unary(UnaryOperator::Negate, self)
    }

    pub fn and(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::And, rhs)
    }

    pub fn or(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::Or, rhs)
    }

    pub fn xor(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::Xor, rhs)
    }

    pub fn nand(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::Nand, rhs)
    }

    pub fn nor(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::Nor, rhs)
    }

    pub fn xnor(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::Xnor, rhs)
    }

    pub fn add(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::Add, rhs)
    }

    pub fn sub(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::Subtract, rhs)
    }

    pub fn mul(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::Multiply, rhs)
    }

    pub fn udiv(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::UnsignedDivide, rhs)
    }

    pub fn urem(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::UnsignedRemainder, rhs)
    }

    pub fn sdiv(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::SignedDivide, rhs)
    }

    pub fn srem(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::SignedRemainder, rhs)
    }

    pub fn smod(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::SignedModulo, rhs)
    }

    pub fn shl(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::ShiftLeft, rhs)
    }

    pub fn lshr(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::LogicalShiftRight, rhs)
    }

    pub fn ashr(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::ArithmeticShiftRight, rhs)
    }

    pub fn rotate_left(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::RotateLeft, rhs)
    }

    pub fn rotate_right(&self, rhs: &BitVec) -> BitVec {
        BitVec::apply_binary(self, BinaryOperator::RotateRight, rhs)
    }

    // -- Comparisons

    pub fn equal(&self, rhs: &BitVec) -> Bool {
        Bool::comparison(self, BinaryOperator::Equal, rhs)
    }

    pub fn not_equal(&self, rhs: &BitVec) -> Bool {
        self.equal(rhs).not()
    }

    pub fn ult(&self, rhs: &BitVec) -> Bool {
        Bool::comparison(self, BinaryOperator::UnsignedLessThan, rhs)
    }

    pub fn ule(&self, rhs: &BitVec) -> Bool {
        Bool::comparison(self, BinaryOperator::UnsignedLessOrEqual, rhs)
    }

    pub fn ugt(&self, rhs: &BitVec) -> Bool {
        Bool::comparison(self, BinaryOperator::UnsignedGreaterThan, rhs)
    }

    pub fn uge(&self, rhs: &BitVec) -> Bool {
        Bool::comparison(self, BinaryOperator::UnsignedGreaterOrEqual, rhs)
    }

    pub fn slt(&self, rhs: &BitVec) -> Bool {
        Bool::comparison(self, BinaryOperator::SignedLessThan, rhs)
    }

    pub fn sle(&self, rhs: &BitVec) -> Bool {
        Bool::comparison(self, BinaryOperator::SignedLessOrEqual, rhs)
    }

    pub fn sgt(&self, rhs: &BitVec) -> Bool {
        Bool::comparison(self, BinaryOperator::SignedGreaterThan, rhs)
    }

    pub fn sge(&self, rhs: &BitVec) -> Bool {
        Bool::comparison(self, BinaryOperator::SignedGreaterOrEqual, rhs)
    }

    pub fn can_be_zero(&self) -> Bool {
        self.equal(&BitVec::constant(self.size(), 0))
    }

    pub fn can_be_nonzero(&self) -> Bool {
        self.not_equal(&BitVec::constant(self.size(), 0))
    }

    pub fn if_then_else(predicate: &Bool, if_case: &BitVec, else_case: &BitVec) -> BitVec {
        assert_eq!(
            if_case.size(),
            else_case.size(),
            "if_then_else arms must have equal widths"
        );
        match predicate.value() {
            Some(true) => if_case.clone(),
            Some(false) => else_case.clone(),
            None => BitVec::from_kind(
                if_case.size(),
                BitVecKind::IfThenElse {
                    predicate: predicate.clone(),
                    if_case: if_case.clone(),
                    else_case: else_case.clone(),
                },
            ),
        }
    }

    // -- Structure

    /// Bits `[start, end)`, least significant bit at index 0.
    pub fn extract(&self, start: usize, end: usize) -> BitVec {
        assert!(
            start < end && end <= self.size(),
            "invalid extraction [{}, {}) from a {}-bit value",
            start,
            end,
            self.size()
        );
        let width = end - start;
        if let Some(value) = self.value() {
            return BitVec::from_residue(width, value >> start);
        }
        if start == 0 && end == self.size() {
            return self.clone();
        }
        if let BitVecKind::Extension { operand, kind, .. } = self.kind() {
            let inner = operand.size();
            if end <= inner {
                return operand.extract(start, end);
            }
            if start == 0 {
                // Only part of the extended bits are kept.
                return operand.extend(*kind, width - inner);
            }
        }
        BitVec::from_kind(
            width,
            BitVecKind::Extraction {
                operand: self.clone(),
                start,
                end,
            },
        )
    }

    /// The low `size` bits.
    pub fn extract_low(&self, size: usize) -> BitVec {
        self.extract(0, size)
    }

    fn extend(&self, kind: ExtensionKind, extension_size: usize) -> BitVec {
        assert!(extension_size > 0, "extension amount must be positive");
        let size = self.size() + extension_size;
        if let Some(value) = self.value() {
            let extended = match kind {
                ExtensionKind::Sign if bits::is_negative(value, self.size()) => {
                    value | &(bits::mask(size) ^ bits::mask(self.size()))
                }
                _ => value.clone(),
            };
            return BitVec::from_residue(size, extended);
        }
        BitVec::from_kind(
            size,
            BitVecKind::Extension {
                operand: self.clone(),
                kind,
                extension_size,
            },
        )
    }

    pub fn zero_extend(&self, extension_size: usize) -> BitVec {
        self.extend(ExtensionKind::Zero, extension_size)
    }

    pub fn sign_extend(&self, extension_size: usize) -> BitVec {
        self.extend(ExtensionKind::Sign, extension_size)
    }

    pub fn zero_extend_to(&self, size: usize) -> BitVec {
        assert!(
            size > self.size(),
            "zero_extend_to: target width {} must exceed {}",
            size,
            self.size()
        );
        self.zero_extend(size - self.size())
    }

    pub fn sign_extend_to(&self, size: usize) -> BitVec {
        assert!(
            size > self.size(),
            "sign_extend_to: target width {} must exceed {}",
            size,
            self.size()
        );
        self.sign_extend(size - self.size())
    }

    /// Zero-extends or truncates to exactly `size` bits.
    pub fn resize(&self, size: usize) -> BitVec {
        use std::cmp::Ordering;
        match size.cmp(&self.size()) {
            Ordering::Greater => self.zero_extend_to(size),
            Ordering::Less => self.extract_low(size),
            Ordering::Equal => self.clone(),
        }
    }

    /// `self` forms the high bits of the result.
    pub fn concat(&self, low: &BitVec) -> BitVec {
        BitVec::concatenate(&[self.clone(), low.clone()])
    }

    /// Concatenates `elements`, most significant first.
    pub fn concatenate(elements: &[BitVec]) -> BitVec {
        assert!(!elements.is_empty(), "concatenate needs at least one element");
        let mut flat: Vec<BitVec> = Vec::with_capacity(elements.len());
        for element in elements {
            match element.kind() {
                BitVecKind::Concatenation(inner) => flat.extend(inner.iter().cloned()),
                _ => flat.push(element.clone()),
            }
        }
        if let [single] = flat.as_slice() {
            return single.clone();
        }

        let values: Vec<&BigUint> = flat.iter().filter_map(BitVec::value).collect();
        let size: usize = flat.iter().map(BitVec::size).sum();
        if values.len() == flat.len() {
            let mut folded = BigUint::zero();
            for (element, value) in flat.iter().zip(values) {
                folded = (folded << element.size()) | value;
            }
            return BitVec::from_residue(size, folded);
        }

        if let Some(rebuilt) = reassemble_slices(&flat) {
            return rebuilt;
        }
        BitVec::from_kind(size, BitVecKind::Concatenation(flat))
    }

    pub fn repeat(&self, count: usize) -> BitVec {
        assert!(count > 0, "repeat count must be positive");
        if count == 1 {
            return self.clone();
        }
        let size = self.size() * count;
        if let Some(value) = self.value() {
            let mut folded = BigUint::zero();
            for _ in 0..count {
                folded = (folded << self.size()) | value;
            }
            return BitVec::from_residue(size, folded);
        }
        BitVec::from_kind(
            size,
            BitVecKind::Repetition {
                operand: self.clone(),
                count,
            },
        )
    }

    /// Rebuilds the expression with the symbols bound in `model` replaced by
    /// constants, folding wherever that makes operands concrete.
    pub fn substitute(&self, model: &Model) -> BitVec {
        match self.kind() {
            BitVecKind::Constant(_) => self.clone(),
            BitVecKind::Symbol(name) => match model.get(name) {
                Some(ModelValue::BitVec { size, value }) if *size == self.size() => {
                    BitVec::from_residue(*size, value.clone())
                }
                _ => self.clone(),
            },
            BitVecKind::UnaryOperation { op, operand } => {
                BitVec::unary(*op, &operand.substitute(model))
            }
            BitVecKind::BinaryOperation { lhs, op, rhs } => {
                BitVec::apply_binary(&lhs.substitute(model), *op, &rhs.substitute(model))
            }
            BitVecKind::Concatenation(elements) => {
                let elements: Vec<BitVec> = elements.iter().map(|e| e.substitute(model)).collect();
                BitVec::concatenate(&elements)
            }
            BitVecKind::Repetition { operand, count } => operand.substitute(model).repeat(*count),
            BitVecKind::Extraction {
                operand,
                start,
                end,
            } => operand.substitute(model).extract(*start, *end),
            BitVecKind::Extension {
                operand,
                kind,
                extension_size,
            } => operand.substitute(model).extend(*kind, *extension_size),
            BitVecKind::IfThenElse {
                predicate,
                if_case,
                else_case,
            } => BitVec::if_then_else(
                &predicate.substitute(model),
                &if_case.substitute(model),
                &else_case.substitute(model),
            ),
        }
    }
}

/// Returns `source[low, high)` when `elements` are adjacent extractions of a
/// single source, listed from the most significant slice down.
fn reassemble_slices(elements: &[BitVec]) -> Option<BitVec> {
    let mut slices = Vec::with_capacity(elements.len());
    for element in elements {
        match element.kind() {
            BitVecKind::Extraction {
                operand,
                start,
                end,
            } => slices.push((operand, *start, *end)),
            _ => return None,
        }
    }
    let (source, _, high) = *slices.first()?;
    for pair in slices.windows(2) {
        let (_, upper_start, _) = pair[0];
        let (lower_source, _, lower_end) = pair[1];
        if lower_source != source || upper_start != lower_end {
            return None;
        }
    }
    let (_, low, _) = *slices.last()?;
    Some(source.extract(low, high))
}

fn render_constant(size: usize, value: &BigUint) -> String {
    let (prefix, radix, digits) = if size % 4 == 0 {
        ("#x", 16, size / 4)
    } else {
        ("#b", 2, size)
    };
    let text = value.to_str_radix(radix);
    format!("{}{}{}", prefix, "0".repeat(digits.saturating_sub(text.len())), text)
}

fn shift_amount(amount: &BigUint, size: usize) -> Option<usize> {
    amount.to_usize().filter(|&s| s < size)
}

fn udiv(a: &BigUint, b: &BigUint, size: usize) -> BigUint {
    if b.is_zero() {
        bits::mask(size)
    } else {
        a / b
    }
}

fn urem(a: &BigUint, b: &BigUint) -> BigUint {
    if b.is_zero() {
        a.clone()
    } else {
        a % b
    }
}

fn sdiv(a: &BigUint, b: &BigUint, size: usize) -> BigUint {
    let neg = |v: &BigUint| bits::negate(v, size);
    match (bits::is_negative(a, size), bits::is_negative(b, size)) {
        (false, false) => udiv(a, b, size),
        (true, false) => neg(&udiv(&neg(a), b, size)),
        (false, true) => neg(&udiv(a, &neg(b), size)),
        (true, true) => udiv(&neg(a), &neg(b), size),
    }
}

fn srem(a: &BigUint, b: &BigUint, size: usize) -> BigUint {
    let neg = |v: &BigUint| bits::negate(v, size);
    match (bits::is_negative(a, size), bits::is_negative(b, size)) {
        (false, false) => urem(a, b),
        (true, false) => neg(&urem(&neg(a), b)),
        (false, true) => urem(a, &neg(b)),
        (true, true) => neg(&urem(&neg(a), &neg(b))),
    }
}

fn smod(a: &BigUint, b: &BigUint, size: usize) -> BigUint {
    let neg = |v: &BigUint| bits::negate(v, size);
    let (a_negative, b_negative) = (bits::is_negative(a, size), bits::is_negative(b, size));
    let abs_a = if a_negative { neg(a) } else { a.clone() };
    let abs_b = if b_negative { neg(b) } else { b.clone() };
    let u = urem(&abs_a, &abs_b);
    if u.is_zero() {
        return u;
    }
    match (a_negative, b_negative) {
        (false, false) => u,
        (true, false) => bits::truncate(&(neg(&u) + b), size),
        (false, true) => bits::truncate(&(u + b), size),
        (true, true) => neg(&u),
    }
}

fn arithmetic_shift_right(a: &BigUint, amount: &BigUint, size: usize) -> BigUint {
    let negative = bits::is_negative(a, size);
    match shift_amount(amount, size) {
        Some(s) if negative => (a >> s) | (bits::mask(size) ^ bits::mask(size - s)),
        Some(s) => a >> s,
        None if negative => bits::mask(size),
        None => BigUint::zero(),
    }
}

fn rotate_left(a: &BigUint, amount: usize, size: usize) -> BigUint {
    let r = amount % size;
    ((a << r) | (a >> (size - r))) & bits::mask(size)
}

fn rotation_amount(amount: &BigUint, size: usize) -> usize {
    (amount % size)
        .to_usize()
        .expect("value reduced modulo the width fits in usize")
}

fn fold_binary(op: BinaryOperator, a: &BigUint, b: &BigUint, size: usize) -> BigUint {
    use BinaryOperator::*;
    let mask = bits::mask(size);
    match op {
        And => a & b,
        Or => a | b,
        Xor => a ^ b,
        Nand => (a & b) ^ &mask,
        Nor => (a | b) ^ &mask,
        Xnor => (a ^ b) ^ &mask,
        Add => (a + b) & &mask,
        Subtract => bits::wrap(&(BigInt::from(a.clone()) - BigInt::from(b.clone())), size),
        Multiply => (a * b) & &mask,
        UnsignedDivide => udiv(a, b, size),
        UnsignedRemainder => urem(a, b),
        SignedDivide => sdiv(a, b, size),
        SignedRemainder => srem(a, b, size),
        SignedModulo => smod(a, b, size),
        ShiftLeft => shift_amount(b, size).map_or_else(BigUint::zero, |s| (a << s) & &mask),
        LogicalShiftRight => shift_amount(b, size).map_or_else(BigUint::zero, |s| a >> s),
        ArithmeticShiftRight => arithmetic_shift_right(a, b, size),
        RotateLeft => rotate_left(a, rotation_amount(b, size), size),
        RotateRight => rotate_left(a, size - rotation_amount(b, size), size),
        _ => unreachable!("{:?} does not produce a bitvector", op),
    }
}

pub(crate) fn fold_comparison(op: BinaryOperator, a: &BigUint, b: &BigUint, size: usize) -> bool {
    use BinaryOperator::*;
    let signed = |v: &BigUint| bits::to_signed(v, size);
    match op {
        Equal => a == b,
        UnsignedLessThan => a < b,
        UnsignedLessOrEqual => a <= b,
        UnsignedGreaterThan => a > b,
        UnsignedGreaterOrEqual => a >= b,
        SignedLessThan => signed(a) < signed(b),
        SignedLessOrEqual => signed(a) <= signed(b),
        SignedGreaterThan => signed(a) > signed(b),
        SignedGreaterOrEqual => signed(a) >= signed(b),
        _ => unreachable!("{:?} is not a comparison", op),
    }
}

impl PartialEq for BitVec {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.content_hash() == other.content_hash()
    }
}

impl Eq for BitVec {}

impl Hash for BitVec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(self.content_hash().as_bytes());
    }
}

impl fmt::Display for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.serialize())
    }
}

impl fmt::Debug for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVec<{}>({})", self.size(), self.serialize())
    }
}

macro_rules! bitvec_binary_operator_impls {
    ($($trait:ident :: $method:ident => $op:ident;)*) => {
        $(
            impl std::ops::$trait<&BitVec> for &BitVec {
                type Output = BitVec;

                fn $method(self, rhs: &BitVec) -> BitVec {
                    BitVec::apply_binary(self, BinaryOperator::$op, rhs)
                }
            }
        )*
    };
}

bitvec_binary_operator_impls! {
    Add::add => Add;
    Sub::sub => Subtract;
    Mul::mul => Multiply;
    Div::div => UnsignedDivide;
    Rem::rem => UnsignedRemainder;
    BitAnd::bitand => And;
    BitOr::bitor => Or;
    BitXor::bitxor => Xor;
    Shl::shl => ShiftLeft;
    Shr::shr => ArithmeticShiftRight;
}

impl std::ops::Not for &BitVec {
    type Output = BitVec;

    fn not(self) -> BitVec {
        self.invert()
    }
}

impl std::ops::Neg for &BitVec {
    type Output = BitVec;

    fn neg(self) -> BitVec {
        self.negate()
    }
}
