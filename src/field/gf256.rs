//! GF(2^8) element backed by the shared discrete-log tables

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

use super::tables::Gf256Tables;
use super::FieldElement;
use crate::error::{Error, Result};

/// An element of GF(2^8)
///
/// Addition and subtraction are both XOR. Multiplication and division go
/// through [`Gf256Tables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Gf256(u8);

impl Gf256 {
    pub const ZERO: Gf256 = Gf256(0);
    pub const ONE: Gf256 = Gf256(1);

    pub const fn new(value: u8) -> Self {
        Gf256(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for Gf256 {
    fn from(value: u8) -> Self {
        Gf256(value)
    }
}

impl From<Gf256> for u8 {
    fn from(value: Gf256) -> Self {
        value.0
    }
}

impl Add for Gf256 {
    type Output = Gf256;

    #[inline]
    fn add(self, rhs: Gf256) -> Gf256 {
        Gf256(self.0 ^ rhs.0)
    }
}

impl AddAssign for Gf256 {
    #[inline]
    fn add_assign(&mut self, rhs: Gf256) {
        self.0 ^= rhs.0;
    }
}

impl Sub for Gf256 {
    type Output = Gf256;

    #[inline]
    fn sub(self, rhs: Gf256) -> Gf256 {
        Gf256(self.0 ^ rhs.0)
    }
}

impl Mul for Gf256 {
    type Output = Gf256;

    #[inline]
    fn mul(self, rhs: Gf256) -> Gf256 {
        Gf256(Gf256Tables::global().mul(self.0, rhs.0))
    }
}

impl FieldElement for Gf256 {
    fn limit() -> usize {
        256
    }

    fn zero() -> Self {
        Gf256::ZERO
    }

    fn one() -> Self {
        Gf256::ONE
    }

    fn from_int(value: usize) -> Self {
        Gf256((value % 256) as u8)
    }

    fn to_byte(self) -> u8 {
        self.0
    }

    fn from_byte(byte: u8) -> Self {
        Gf256(byte)
    }

    fn checked_div(self, rhs: Self) -> Result<Self> {
        if rhs.0 == 0 {
            return Err(Error::DivisionByZero);
        }
        if self.0 == 0 {
            return Ok(Gf256::ZERO);
        }
        let tables = Gf256Tables::global();
        Ok(Gf256(tables.mul(self.0, tables.inv(rhs.0))))
    }
}

impl fmt::Display for Gf256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

impl fmt::LowerHex for Gf256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
