//! Dense matrices over a finite field
//!
//! Storage is a single row-major `Vec`; all indexing goes through
//! `(row, column)` so bounds checks live in one place.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};
use crate::field::FieldElement;

/// A `rows x cols` matrix of field elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: FieldElement> Matrix<T> {
    /// All-zero matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    /// `n x n` identity
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        m
    }

    /// Build from row-major elements
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::BlockLength {
                expected: rows * cols,
                got: data.len(),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Interpret a row-major byte block as field elements
    pub fn from_bytes(rows: usize, cols: usize, bytes: &[u8]) -> Result<Self> {
        Self::from_vec(rows, cols, bytes.iter().map(|&b| T::from_byte(b)).collect())
    }

    /// Row-major bytes of every element
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.iter().map(|v| v.to_byte()).collect()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Borrow one row
    ///
    /// # Panics
    /// Panics if `row >= self.rows()`.
    pub fn row(&self, row: usize) -> &[T] {
        assert!(row < self.rows, "row {} out of bounds ({})", row, self.rows);
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// New matrix made of the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &index in indices {
            if index >= self.rows {
                return Err(Error::RowIndexOutOfRange {
                    index,
                    limit: self.rows,
                });
            }
            data.extend_from_slice(self.row(index));
        }
        Ok(Matrix {
            rows: indices.len(),
            cols: self.cols,
            data,
        })
    }

    /// `self x rhs`
    pub fn multiply(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        if self.cols != rhs.rows {
            return Err(Error::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            let product = rhs.left_multiply(self.row(i))?;
            out.data[i * rhs.cols..(i + 1) * rhs.cols].copy_from_slice(&product);
        }
        Ok(out)
    }

    /// Row vector times matrix: `vector x self`
    pub fn left_multiply(&self, vector: &[T]) -> Result<Vec<T>> {
        if vector.len() != self.rows {
            return Err(Error::DimensionMismatch(format!(
                "cannot multiply 1x{} by {}x{}",
                vector.len(),
                self.rows,
                self.cols
            )));
        }
        let mut out = vec![T::zero(); self.cols];
        for (k, &coefficient) in vector.iter().enumerate() {
            if coefficient == T::zero() {
                continue;
            }
            for (acc, &v) in out.iter_mut().zip(self.row(k)) {
                *acc += coefficient * v;
            }
        }
        Ok(out)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity(self.rows)
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        &mut self.data[row * self.cols + col]
    }
}

/// One line per row, labelled `L001:` onwards
impl<T: FieldElement> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            write!(f, "L{:03}:", i + 1)?;
            for v in self.row(i) {
                write!(f, " {}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
