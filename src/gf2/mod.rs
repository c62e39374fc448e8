//! GF(2) scalar arithmetic and bit vectors.
//!
//! This module provides the two-element field GF(2): the [`Bit`] scalar,
//! with XOR as addition and AND as multiplication, and the [`Word`]
//! fixed-length bit vector built on top of it. All Reed-Muller arithmetic
//! in this crate reduces to these two types.

use std::fmt;
use std::ops::{BitAnd, BitXor, Not};

use crate::error::{Error, Result};

pub mod word;

pub use word::{natural_width, Word};

/// A single GF(2) scalar: the value 0 or 1.
///
/// The invariant that the inner value is 0 or 1 is established at
/// construction and no operation can break it. Scalars are immutable
/// `Copy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bit(u8);

impl Bit {
    /// The additive identity of GF(2).
    pub const ZERO: Bit = Bit(0);

    /// The multiplicative identity of GF(2).
    pub const ONE: Bit = Bit(1);

    /// Creates a bit from a numeric value.
    ///
    /// # Arguments
    ///
    /// * `value` - The numeric value, which must be 0 or 1
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBitValue`] for any other value.
    pub fn new(value: u8) -> Result<Self> {
        match value {
            0 | 1 => Ok(Bit(value)),
            other => Err(Error::InvalidBitValue(other.to_string())),
        }
    }

    /// Returns the numeric value of the bit (0 or 1).
    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns the GF(2) complement: `(self + 1) mod 2`.
    #[inline]
    pub fn complement(self) -> Bit {
        Bit(self.0 ^ 1)
    }
}

/// GF(2) addition: `(a + b) mod 2`, i.e. XOR.
#[inline]
pub fn add(a: Bit, b: Bit) -> Bit {
    Bit(a.0 ^ b.0)
}

/// GF(2) multiplication: `a AND b`.
#[inline]
pub fn mult(a: Bit, b: Bit) -> Bit {
    Bit(a.0 & b.0)
}

impl TryFrom<u8> for Bit {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Bit::new(value)
    }
}

impl TryFrom<char> for Bit {
    type Error = Error;

    fn try_from(value: char) -> Result<Self> {
        match value {
            '0' => Ok(Bit::ZERO),
            '1' => Ok(Bit::ONE),
            other => Err(Error::InvalidBitValue(format!("'{other}'"))),
        }
    }
}

impl BitXor for Bit {
    type Output = Bit;

    #[inline]
    fn bitxor(self, rhs: Bit) -> Bit {
        add(self, rhs)
    }
}

impl BitAnd for Bit {
    type Output = Bit;

    #[inline]
    fn bitand(self, rhs: Bit) -> Bit {
        mult(self, rhs)
    }
}

impl Not for Bit {
    type Output = Bit;

    #[inline]
    fn not(self) -> Bit {
        self.complement()
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        assert_eq!(Bit::new(0).unwrap(), Bit::ZERO);
        assert_eq!(Bit::new(1).unwrap(), Bit::ONE);
        assert!(Bit::new(2).is_err());
        assert!(Bit::new(255).is_err());
    }

    #[test]
    fn test_construction_from_char() {
        assert_eq!(Bit::try_from('0').unwrap(), Bit::ZERO);
        assert_eq!(Bit::try_from('1').unwrap(), Bit::ONE);
        assert!(Bit::try_from('2').is_err());
        assert!(Bit::try_from('x').is_err());
    }

    #[test]
    fn test_add_truth_table() {
        assert_eq!(add(Bit::ZERO, Bit::ZERO), Bit::ZERO);
        assert_eq!(add(Bit::ZERO, Bit::ONE), Bit::ONE);
        assert_eq!(add(Bit::ONE, Bit::ZERO), Bit::ONE);
        assert_eq!(add(Bit::ONE, Bit::ONE), Bit::ZERO);
    }

    #[test]
    fn test_mult_truth_table() {
        assert_eq!(mult(Bit::ZERO, Bit::ZERO), Bit::ZERO);
        assert_eq!(mult(Bit::ZERO, Bit::ONE), Bit::ZERO);
        assert_eq!(mult(Bit::ONE, Bit::ZERO), Bit::ZERO);
        assert_eq!(mult(Bit::ONE, Bit::ONE), Bit::ONE);
    }

    #[test]
    fn test_complement() {
        assert_eq!(Bit::ZERO.complement(), Bit::ONE);
        assert_eq!(Bit::ONE.complement(), Bit::ZERO);
        assert_eq!(!Bit::ZERO, Bit::ONE);
    }

    #[test]
    fn test_operators_match_field_ops() {
        for a in [Bit::ZERO, Bit::ONE] {
            for b in [Bit::ZERO, Bit::ONE] {
                assert_eq!(a ^ b, add(a, b));
                assert_eq!(a & b, mult(a, b));
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Bit::ZERO.to_string(), "0");
        assert_eq!(Bit::ONE.to_string(), "1");
    }
}
