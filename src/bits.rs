// SPDX-License-Identifier: Apache-2.0

//! Width helpers for fixed-width bitvector arithmetic.
//!
//! Bitvector constants are held as non-negative residues in a `BigUint`; these
//! helpers convert between that canonical form and two's complement `BigInt`.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

/// Byte repeated across the width of a bitvector the solver left
/// unconstrained.
pub const FILLER_BYTE: u8 = 0x23;

/// `2^size`, i.e. the carry out of a computation with a `size`-bit result.
pub fn carry_bit(size: usize) -> BigUint {
    BigUint::one() << size
}

/// The sign bit of a `size`-bit value.
pub fn sign_bit(size: usize) -> BigUint {
    assert!(size > 0, "sign_bit: size must be positive");
    BigUint::one() << (size - 1)
}

/// All ones across `size` bits.
pub fn mask(size: usize) -> BigUint {
    carry_bit(size) - BigUint::one()
}

pub fn truncate(value: &BigUint, size: usize) -> BigUint {
    value & mask(size)
}

/// Maps an arbitrary integer onto its residue in `[0, 2^size)`.
pub fn wrap(value: &BigInt, size: usize) -> BigUint {
    let modulus = BigInt::from(carry_bit(size));
    let mut residue = value % &modulus;
    if residue.sign() == Sign::Minus {
        residue += &modulus;
    }
    residue
        .to_biguint()
        .expect("residue is non-negative after adjustment")
}

pub fn is_negative(value: &BigUint, size: usize) -> bool {
    !(value & sign_bit(size)).is_zero()
}

/// Reinterprets a `size`-bit residue as a two's complement integer.
pub fn to_signed(value: &BigUint, size: usize) -> BigInt {
    let unsigned = BigInt::from(value.clone());
    if is_negative(value, size) {
        unsigned - BigInt::from(carry_bit(size))
    } else {
        unsigned
    }
}

/// Two's complement negation within `size` bits.
pub fn negate(value: &BigUint, size: usize) -> BigUint {
    wrap(&-BigInt::from(value.clone()), size)
}

/// The recognizable non-zero pattern used for unconstrained bitvectors.
pub fn filler(size: usize) -> BigUint {
    let bytes = vec![FILLER_BYTE; (size + 7) / 8];
    truncate(&BigUint::from_bytes_le(&bytes), size)
}
