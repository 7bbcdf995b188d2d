//! Discrete-log tables for GF(2^8)
//!
//! Multiplication and division reduce to index arithmetic on three 256-entry
//! tables built from the generator `g = 2`:
//!
//! - `forward[k] = g^k` for `k` in `0..=254`
//! - `backward[v] = log_g(v)` for `v` in `1..=255`
//! - `reverse[v] = v^-1` for `v` in `1..=255`
//!
//! The tables are built once on first use and shared by the whole process.

use lazy_static::lazy_static;
use std::fmt;
use tracing::{debug, warn};

/// Field modulus x^8 + x^4 + x^3 + x^2 + 1
pub const PRIMITIVE_POLYNOMIAL: u16 = 0x11D;

/// Order of the multiplicative group
pub const GROUP_ORDER: usize = 255;

/// Number of table entries
const TABLE_SIZE: usize = 256;

lazy_static! {
    static ref TABLES: Gf256Tables = Gf256Tables::build();
}

/// A table entry that breaks the log/antilog or inverse identities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFault {
    /// `backward[forward[index]] != index`
    ForwardBackward { index: usize },
    /// `reverse[value] * value != 1`
    Reverse { value: usize },
}

impl fmt::Display for TableFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFault::ForwardBackward { index } => {
                write!(f, "forward/backward table error at index({})", index)
            }
            TableFault::Reverse { value } => {
                write!(f, "reverse table error at index({})", value)
            }
        }
    }
}

/// Exponent, logarithm and inverse tables for GF(2^8)
pub struct Gf256Tables {
    forward: [u8; TABLE_SIZE],
    backward: [u8; TABLE_SIZE],
    reverse: [u8; TABLE_SIZE],
}

impl Gf256Tables {
    /// Process-wide tables, built on first access
    pub fn global() -> &'static Gf256Tables {
        &TABLES
    }

    fn build() -> Self {
        let mut forward = [0u8; TABLE_SIZE];
        let mut backward = [0u8; TABLE_SIZE];
        let mut reverse = [0u8; TABLE_SIZE];

        let mut x: u16 = 1;
        for entry in forward.iter_mut().take(GROUP_ORDER) {
            *entry = x as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIMITIVE_POLYNOMIAL;
            }
        }

        for (k, &v) in forward.iter().enumerate().take(GROUP_ORDER) {
            backward[v as usize] = k as u8;
        }

        // g^k * g^(255-k) = 1
        for v in 1..TABLE_SIZE {
            let k = backward[v] as usize;
            reverse[v] = forward[(GROUP_ORDER - k) % GROUP_ORDER];
        }

        debug!(
            "GF(2^8) tables initialized (modulus {:#x})",
            PRIMITIVE_POLYNOMIAL
        );

        Gf256Tables {
            forward,
            backward,
            reverse,
        }
    }

    /// `g^k`, or `None` when `k > 254`
    pub fn forward(&self, k: usize) -> Option<u8> {
        if k >= GROUP_ORDER {
            return None;
        }
        Some(self.forward[k])
    }

    /// Discrete log of `v`, or `None` when `v` is zero or not a byte
    pub fn backward(&self, v: usize) -> Option<u8> {
        if v == 0 || v >= TABLE_SIZE {
            return None;
        }
        Some(self.backward[v])
    }

    /// Multiplicative inverse of `v`, or `None` when `v` is zero or not a byte
    pub fn reverse(&self, v: usize) -> Option<u8> {
        if v == 0 || v >= TABLE_SIZE {
            return None;
        }
        Some(self.reverse[v])
    }

    #[inline]
    pub(crate) fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let log = self.backward[a as usize] as usize + self.backward[b as usize] as usize;
        self.forward[log % GROUP_ORDER]
    }

    /// Inverse of a nonzero byte; callers check for zero first
    #[inline]
    pub(crate) fn inv(&self, v: u8) -> u8 {
        self.reverse[v as usize]
    }

    /// Check the log/antilog and inverse identities over the whole table
    ///
    /// Returns every violation found; an empty list means the tables are sound.
    pub fn verify(&self) -> Vec<TableFault> {
        let mut faults = Vec::new();
        for i in 0..GROUP_ORDER {
            if self.backward[self.forward[i] as usize] as usize != i {
                faults.push(TableFault::ForwardBackward { index: i });
            }
            let value = i + 1;
            if self.mul(self.reverse[value], value as u8) != 1 {
                faults.push(TableFault::Reverse { value });
            }
        }
        for fault in &faults {
            warn!("{}", fault);
        }
        faults
    }
}

impl fmt::Display for Gf256Tables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections: [(&str, &[u8; TABLE_SIZE]); 3] = [
            ("forward table:", &self.forward),
            ("backward table:", &self.backward),
            ("reverse table:", &self.reverse),
        ];
        for (title, table) in sections {
            writeln!(f, "{}", title)?;
            for line in table.chunks(16) {
                let cells: Vec<String> = line.iter().map(|v| format!("{:02x}", v)).collect();
                writeln!(f, "{}", cells.join(" "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_sequence() {
        let tables = Gf256Tables::global();
        assert_eq!(tables.forward(0), Some(1));
        assert_eq!(tables.forward(1), Some(2));
        assert_eq!(tables.forward(7), Some(0x80));
        // 0x100 ^ 0x11d
        assert_eq!(tables.forward(8), Some(0x1d));
        assert_eq!(tables.forward(254), Some(0x8e));
    }

    #[test]
    fn test_forward_is_permutation_of_nonzero() {
        let tables = Gf256Tables::global();
        let mut seen = [false; TABLE_SIZE];
        for k in 0..GROUP_ORDER {
            let v = tables.forward(k).unwrap() as usize;
            assert_ne!(v, 0);
            assert!(!seen[v], "g^{} repeats value {}", k, v);
            seen[v] = true;
        }
    }

    #[test]
    fn test_log_antilog_duality() {
        let tables = Gf256Tables::global();
        for k in 0..GROUP_ORDER {
            let v = tables.forward(k).unwrap();
            assert_eq!(tables.backward(v as usize), Some(k as u8));
        }
        for v in 1..TABLE_SIZE {
            let k = tables.backward(v).unwrap();
            assert_eq!(tables.forward(k as usize), Some(v as u8));
        }
    }

    #[test]
    fn test_reverse_is_inverse() {
        let tables = Gf256Tables::global();
        assert_eq!(tables.reverse(1), Some(1));
        for v in 1..TABLE_SIZE {
            let inv = tables.reverse(v).unwrap();
            assert_eq!(tables.mul(inv, v as u8), 1, "inverse of {}", v);
        }
    }

    #[test]
    fn test_out_of_domain_is_invalid() {
        let tables = Gf256Tables::global();
        assert_eq!(tables.forward(255), None);
        assert_eq!(tables.forward(1000), None);
        assert_eq!(tables.backward(0), None);
        assert_eq!(tables.backward(256), None);
        assert_eq!(tables.reverse(0), None);
        assert_eq!(tables.reverse(256), None);
    }

    #[test]
    fn test_verify_clean() {
        assert!(Gf256Tables::global().verify().is_empty());
    }

    #[test]
    fn test_verify_reports_corruption() {
        let mut tables = Gf256Tables::build();
        tables.reverse[3] = 0;
        tables.backward[2] = 7;
        let faults = tables.verify();
        assert!(faults.contains(&TableFault::Reverse { value: 3 }));
        assert!(faults.contains(&TableFault::ForwardBackward { index: 1 }));
    }

    #[test]
    fn test_display_dump() {
        let dump = Gf256Tables::global().to_string();
        assert!(dump.starts_with("forward table:\n01 02 04 08"));
        assert!(dump.contains("backward table:"));
        assert!(dump.contains("reverse table:"));
        // 3 titles + 3 * 16 rows
        assert_eq!(dump.lines().count(), 51);
    }
}
