//! LU factorization and inversion of an encode submatrix
//!
//! Decoding inverts the `k x k` submatrix made of the Cauchy rows that
//! produced the surviving shares. The submatrix is factored without pivoting
//! into a unit lower triangular `L` and an upper triangular `U`; both factors
//! are inverted by substitution and the inverse is `U^-1 x L^-1`.
//!
//! No pivoting is needed as long as every surviving identity row sits at its
//! own index: every leading principal minor is then a Cauchy minor and so
//! nonzero. A zero pivot means the selection was singular or misaligned and
//! is reported as [`Error::SingularMatrix`].

use crate::error::{Error, Result};
use crate::field::FieldElement;
use crate::matrix::Matrix;

/// Working matrices of one decode
#[derive(Debug, Clone)]
pub struct Decomposition<T> {
    /// Encode submatrix `A`
    pub encode: Matrix<T>,
    /// Unit lower triangular factor
    pub lower: Matrix<T>,
    /// Upper triangular factor
    pub upper: Matrix<T>,
    pub lower_inverse: Matrix<T>,
    pub upper_inverse: Matrix<T>,
    /// `A^-1 = U^-1 x L^-1`
    pub inverse: Matrix<T>,
}

impl<T: FieldElement> Decomposition<T> {
    /// Factor and invert a square encode submatrix
    pub fn new(encode: Matrix<T>) -> Result<Self> {
        if !encode.is_square() {
            return Err(Error::DimensionMismatch(format!(
                "encode submatrix must be square, got {}x{}",
                encode.rows(),
                encode.cols()
            )));
        }

        let (lower, upper) = factor(&encode)?;
        let lower_inverse = invert_lower(&lower);
        let upper_inverse = invert_upper(&upper)?;
        let inverse = upper_inverse.multiply(&lower_inverse)?;

        Ok(Decomposition {
            encode,
            lower,
            upper,
            lower_inverse,
            upper_inverse,
            inverse,
        })
    }

    /// Re-multiply the factors and check every identity they should satisfy
    pub fn verify(&self) -> Result<()> {
        let identity = Matrix::identity(self.encode.rows());
        let checks = [
            ("L x U", self.lower.multiply(&self.upper)?, &self.encode),
            (
                "L x L^-1",
                self.lower.multiply(&self.lower_inverse)?,
                &identity,
            ),
            (
                "U x U^-1",
                self.upper.multiply(&self.upper_inverse)?,
                &identity,
            ),
            (
                "A x A^-1",
                self.encode.multiply(&self.inverse)?,
                &identity,
            ),
        ];
        for (name, product, expected) in checks.iter() {
            if product != *expected {
                return Err(Error::ErasureDecode(format!(
                    "{} does not match:\n{}",
                    name, product
                )));
            }
        }
        Ok(())
    }
}

/// Doolittle factorization `A = L x U`
fn factor<T: FieldElement>(a: &Matrix<T>) -> Result<(Matrix<T>, Matrix<T>)> {
    let n = a.rows();
    let mut lower = Matrix::zeros(n, n);
    let mut upper = Matrix::zeros(n, n);

    for i in 0..n {
        for j in i..n {
            let mut sum = T::zero();
            for k in 0..i {
                sum += lower[(i, k)] * upper[(k, j)];
            }
            upper[(i, j)] = a[(i, j)] - sum;
        }

        let pivot = upper[(i, i)];
        if pivot == T::zero() {
            return Err(Error::SingularMatrix(i));
        }
        lower[(i, i)] = T::one();

        for j in (i + 1)..n {
            let mut sum = T::zero();
            for k in 0..i {
                sum += lower[(j, k)] * upper[(k, i)];
            }
            lower[(j, i)] = (a[(j, i)] - sum).checked_div(pivot)?;
        }
    }

    Ok((lower, upper))
}

/// Forward substitution on a unit lower triangular matrix
fn invert_lower<T: FieldElement>(lower: &Matrix<T>) -> Matrix<T> {
    let n = lower.rows();
    let mut inv = Matrix::identity(n);
    for i in 1..n {
        for j in 0..i {
            let mut sum = T::zero();
            for k in j..i {
                sum += lower[(i, k)] * inv[(k, j)];
            }
            inv[(i, j)] = T::zero() - sum;
        }
    }
    inv
}

/// Backward substitution on an upper triangular matrix
fn invert_upper<T: FieldElement>(upper: &Matrix<T>) -> Result<Matrix<T>> {
    let n = upper.rows();
    let mut inv = Matrix::zeros(n, n);
    for i in (0..n).rev() {
        let diagonal = upper[(i, i)];
        inv[(i, i)] = T::one().checked_div(diagonal)?;
        for j in (i + 1)..n {
            let mut sum = T::zero();
            for k in (i + 1)..=j {
                sum += upper[(i, k)] * inv[(k, j)];
            }
            inv[(i, j)] = (T::zero() - sum).checked_div(diagonal)?;
        }
    }
    Ok(inv)
}
