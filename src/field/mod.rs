//! Finite field arithmetic
//!
//! The erasure codec is generic over [`FieldElement`]; GF(2^8) is the only
//! field shipped today. Every element maps to exactly one byte, so shares
//! convert to and from field elements without loss.

mod gf256;
pub mod tables;

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

use crate::error::Result;

pub use gf256::Gf256;
pub use tables::{Gf256Tables, TableFault};

/// Exact arithmetic over a finite field whose elements fit in one byte
///
/// Implementors must keep every operation closed over `0..limit()` and give
/// every nonzero element a multiplicative inverse.
pub trait FieldElement:
    Copy
    + Eq
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + Mul<Output = Self>
{
    /// Number of elements in the field
    fn limit() -> usize;

    /// Additive identity
    fn zero() -> Self;

    /// Multiplicative identity
    fn one() -> Self;

    /// Element for a small integer, reduced into the field's range
    fn from_int(value: usize) -> Self;

    /// Byte representation of this element
    fn to_byte(self) -> u8;

    /// Divide, failing on a zero divisor
    fn checked_div(self, rhs: Self) -> Result<Self>;

    /// Element for a raw share byte
    fn from_byte(byte: u8) -> Self {
        Self::from_int(byte as usize)
    }

    /// Multiplicative inverse
    fn inverse(self) -> Result<Self> {
        Self::one().checked_div(self)
    }

    /// Raise to a power by repeated multiplication
    ///
    /// `x^0` is one for every `x`, including zero.
    fn pow(self, exp: u32) -> Self {
        let mut acc = Self::one();
        for _ in 0..exp {
            acc = acc * self;
        }
        acc
    }
}
