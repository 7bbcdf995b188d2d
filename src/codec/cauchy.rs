//! Systematic Cauchy encoding matrix
//!
//! The matrix has one row per producible share and one column per data
//! share. The top `k` rows are the identity, so the first `k` encoded rows are
//! the data itself. Row `i >= k`, column `j` holds `1 / (x_i + y_j)` with
//! `x_i = i` and `y_j = j`; the row parameters `k..n` never meet the column
//! parameters `0..k`, so every denominator is nonzero and every `k x k`
//! submatrix of distinct rows is invertible.

use crate::error::{Error, Result};
use crate::field::FieldElement;
use crate::matrix::Matrix;

/// Build the `limit x data_shares` encoding matrix
pub fn build<T: FieldElement>(data_shares: usize, limit: usize) -> Result<Matrix<T>> {
    if limit > T::limit() {
        return Err(Error::FieldLimit {
            requested: limit,
            limit: T::limit(),
        });
    }
    if data_shares < 1 || data_shares > limit {
        return Err(Error::InvalidShareCount { data_shares, limit });
    }

    let mut matrix = Matrix::zeros(limit, data_shares);
    for i in 0..data_shares {
        matrix[(i, i)] = T::one();
    }
    for i in data_shares..limit {
        let x = T::from_int(i);
        for j in 0..data_shares {
            let y = T::from_int(j);
            matrix[(i, j)] = T::one().checked_div(x + y)?;
        }
    }
    Ok(matrix)
}
