// SPDX-License-Identifier: Apache-2.0

//! Operator tags shared by both expression sorts, plus the tables that map
//! them onto SMT-LIB function names.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Bitwise
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    UnsignedDivide,
    UnsignedRemainder,
    SignedDivide,
    SignedRemainder,
    SignedModulo,
    // Shifts and rotates
    ShiftLeft,
    LogicalShiftRight,
    ArithmeticShiftRight,
    RotateLeft,
    RotateRight,
    // Comparisons
    Equal,
    UnsignedLessThan,
    UnsignedLessOrEqual,
    UnsignedGreaterThan,
    UnsignedGreaterOrEqual,
    SignedLessThan,
    SignedLessOrEqual,
    SignedGreaterThan,
    SignedGreaterOrEqual,
    // Boolean only
    Implies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    Zero,
    Sign,
}

/// Name of `op` when it maps two bitvectors to a bitvector, if it does.
pub fn bitvector_operator(op: BinaryOperator) -> Option<&'static str> {
    use BinaryOperator::*;
    let name = match op {
        And => "bvand",
        Or => "bvor",
        Xor => "bvxor",
        Nand => "bvnand",
        Nor => "bvnor",
        Xnor => "bvxnor",
        Add => "bvadd",
        Subtract => "bvsub",
        Multiply => "bvmul",
        UnsignedDivide => "bvudiv",
        UnsignedRemainder => "bvurem",
        SignedDivide => "bvsdiv",
        SignedRemainder => "bvsrem",
        SignedModulo => "bvsmod",
        ShiftLeft => "bvshl",
        LogicalShiftRight => "bvlshr",
        ArithmeticShiftRight => "bvashr",
        RotateLeft => "ext_rotate_left",
        RotateRight => "ext_rotate_right",
        _ => return None,
    };
    Some(name)
}

/// Name of `op` when it compares two bitvectors, if it does.
pub fn comparison_operator(op: BinaryOperator) -> Option<&'static str> {
    use BinaryOperator::*;
    let name = match op {
        Equal => "=",
        UnsignedLessThan => "bvult",
        UnsignedLessOrEqual => "bvule",
        UnsignedGreaterThan => "bvugt",
        UnsignedGreaterOrEqual => "bvuge",
        SignedLessThan => "bvslt",
        SignedLessOrEqual => "bvsle",
        SignedGreaterThan => "bvsgt",
        SignedGreaterOrEqual => "bvsge",
        _ => return None,
    };
    Some(name)
}

/// Name of `op` when it combines two booleans, if it does.
pub fn boolean_operator(op: BinaryOperator) -> Option<&'static str> {
    use BinaryOperator::*;
    let name = match op {
        And => "and",
        Or => "or",
        Xor => "xor",
        Implies => "=>",
        Equal => "=",
        _ => return None,
    };
    Some(name)
}

pub fn bitvector_unary_operator(op: UnaryOperator) -> &'static str {
    match op {
        UnaryOperator::Not => "bvnot",
        UnaryOperator::Negate => "bvneg",
    }
}

/// Arithmetic negation has no boolean meaning.
pub fn boolean_unary_operator(op: UnaryOperator) -> Option<&'static str> {
    match op {
        UnaryOperator::Not => Some("not"),
        UnaryOperator::Negate => None,
    }
}

pub fn extension_operator(kind: ExtensionKind) -> &'static str {
    match kind {
        ExtensionKind::Zero => "zero_extend",
        ExtensionKind::Sign => "sign_extend",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_sorts_are_disjoint_where_expected() {
        assert_eq!(bitvector_operator(BinaryOperator::Add), Some("bvadd"));
        assert_eq!(comparison_operator(BinaryOperator::Add), None);
        assert_eq!(boolean_operator(BinaryOperator::Add), None);

        assert_eq!(bitvector_operator(BinaryOperator::Implies), None);
        assert_eq!(boolean_operator(BinaryOperator::Implies), Some("=>"));

        // Equality is meaningful for both comparison and boolean operands.
        assert_eq!(comparison_operator(BinaryOperator::Equal), Some("="));
        assert_eq!(boolean_operator(BinaryOperator::Equal), Some("="));
        assert_eq!(bitvector_operator(BinaryOperator::Equal), None);
    }

    #[test]
    fn test_unary_tables() {
        assert_eq!(bitvector_unary_operator(UnaryOperator::Not), "bvnot");
        assert_eq!(bitvector_unary_operator(UnaryOperator::Negate), "bvneg");
        assert_eq!(boolean_unary_operator(UnaryOperator::Not), Some("not"));
        assert_eq!(boolean_unary_operator(UnaryOperator::Negate), None);
    }
}
