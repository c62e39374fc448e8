//! Fixed-length GF(2) bit vectors.
//!
//! A [`Word`] is a fixed-length sequence of [`Bit`]s with index 0 holding
//! the least-significant position. Words convert to and from
//! arbitrary-precision integers, which is what lets the image collaborator
//! treat pixel values of any supported code order losslessly.

use std::fmt;
use std::ops::{Index, Not};
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};

use crate::error::{Error, Result};
use crate::gf2::{add, mult, Bit};

/// Returns the natural width of a non-negative integer in bits.
///
/// The values 0 and 1 both have natural width 1, so every value has a
/// non-empty binary rendering. This is the convention the image
/// collaborator uses to derive a code order from a maximum grey value.
pub fn natural_width(value: &BigUint) -> usize {
    (value.bits() as usize).max(1)
}

/// A fixed-length sequence of GF(2) bits, least-significant first.
///
/// Length is fixed at construction; the only mutator is [`Word::set`].
/// All arithmetic produces new words and never shares underlying storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word {
    bits: Vec<Bit>,
}

impl Word {
    /// Creates the all-zero word of the given length.
    pub fn zero(length: usize) -> Self {
        Word {
            bits: vec![Bit::ZERO; length],
        }
    }

    /// Creates a word of the given length with every position set to `bit`.
    pub fn filled(bit: Bit, length: usize) -> Self {
        Word {
            bits: vec![bit; length],
        }
    }

    /// Returns the length of the word in bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns `true` if the word has length zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns the bit at `index`, or `None` if out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Bit> {
        self.bits.get(index).copied()
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range, with slice semantics.
    #[inline]
    pub fn set(&mut self, index: usize, bit: Bit) {
        self.bits[index] = bit;
    }

    /// Returns an iterator over the bits, least-significant first.
    pub fn iter(&self) -> impl Iterator<Item = Bit> + '_ {
        self.bits.iter().copied()
    }

    /// Returns the word incremented by one.
    ///
    /// The carry starts at index 0 and wraps silently to the all-zero word
    /// if it propagates past the last bit; there is no overflow signal.
    pub fn plus_one(&self) -> Word {
        let mut out = self.clone();
        for bit in out.bits.iter_mut() {
            if *bit == Bit::ONE {
                *bit = Bit::ZERO;
            } else {
                *bit = Bit::ONE;
                break;
            }
        }
        out
    }

    /// Returns the bitwise complement of the word.
    pub fn complement(&self) -> Word {
        Word {
            bits: self.bits.iter().map(|b| b.complement()).collect(),
        }
    }

    /// Returns the componentwise GF(2) sum (XOR) of two words.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the operands differ in length.
    pub fn add(&self, other: &Word) -> Result<Word> {
        self.check_same_length(other)?;
        Ok(Word {
            bits: self
                .iter()
                .zip(other.iter())
                .map(|(a, b)| add(a, b))
                .collect(),
        })
    }

    /// Returns the componentwise GF(2) product (AND) of two words.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the operands differ in length.
    pub fn mult(&self, other: &Word) -> Result<Word> {
        self.check_same_length(other)?;
        Ok(Word {
            bits: self
                .iter()
                .zip(other.iter())
                .map(|(a, b)| mult(a, b))
                .collect(),
        })
    }

    /// Returns the number of positions at which two words differ.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the operands differ in length.
    pub fn hamming_distance(&self, other: &Word) -> Result<usize> {
        self.check_same_length(other)?;
        Ok(self
            .iter()
            .zip(other.iter())
            .filter(|(a, b)| a != b)
            .count())
    }

    /// Converts a non-negative integer to a word at the value's natural
    /// width, least-significant bit at index 0.
    pub fn from_biguint(value: &BigUint) -> Word {
        let bits = value
            .to_radix_le(2)
            .into_iter()
            .map(|digit| if digit == 1 { Bit::ONE } else { Bit::ZERO })
            .collect();
        Word { bits }
    }

    /// Converts a non-negative integer to a word of exactly `width` bits,
    /// zero-padding above the natural width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeTooSmall`] if `width` is smaller than the
    /// value's natural width.
    pub fn from_biguint_sized(value: &BigUint, width: usize) -> Result<Word> {
        Word::from_biguint(value).padded(width)
    }

    /// Converts a signed integer to a word at its natural width.
    ///
    /// Negative values convert through two's complement at the magnitude's
    /// natural bit-width (complement then increment), then re-read at the
    /// result's natural width.
    pub fn from_bigint(value: &BigInt) -> Word {
        match value.sign() {
            Sign::Minus => Word::from_biguint(&twos_complement(value.magnitude())),
            _ => Word::from_biguint(value.magnitude()),
        }
    }

    /// Converts a signed integer to a word of exactly `width` bits.
    ///
    /// Padding above the natural width is always with zeros, never sign
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SizeTooSmall`] if `width` is smaller than the
    /// value's natural width.
    pub fn from_bigint_sized(value: &BigInt, width: usize) -> Result<Word> {
        Word::from_bigint(value).padded(width)
    }

    /// Reads the word as a non-negative integer, most-significant bit
    /// first, the inverse of [`Word::from_biguint`] for in-range values.
    pub fn to_biguint(&self) -> BigUint {
        let digits: Vec<u8> = self.iter().map(|b| b.value()).collect();
        BigUint::from_radix_le(&digits, 2).unwrap_or_default()
    }

    fn padded(self, width: usize) -> Result<Word> {
        if width < self.len() {
            return Err(Error::SizeTooSmall {
                natural: self.len(),
                requested: width,
            });
        }
        let mut bits = self.bits;
        bits.resize(width, Bit::ZERO);
        Ok(Word { bits })
    }

    fn check_same_length(&self, other: &Word) -> Result<()> {
        if self.len() != other.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }
}

/// Two's complement of a magnitude at its own natural bit-width, read back
/// as an unsigned value.
fn twos_complement(magnitude: &BigUint) -> BigUint {
    Word::from_biguint(magnitude)
        .complement()
        .plus_one()
        .to_biguint()
}

impl Index<usize> for Word {
    type Output = Bit;

    #[inline]
    fn index(&self, index: usize) -> &Bit {
        &self.bits[index]
    }
}

impl Not for &Word {
    type Output = Word;

    fn not(self) -> Word {
        self.complement()
    }
}

impl fmt::Display for Word {
    /// Renders the word most-significant bit first (reading order).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits.iter().rev() {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

impl FromStr for Word {
    type Err = Error;

    /// Parses a binary string in reading order (most-significant first).
    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .chars()
            .rev()
            .map(Bit::try_from)
            .collect::<Result<Vec<Bit>>>()?;
        Ok(Word { bits })
    }
}
