//! Systematic erasure codec over a Cauchy matrix
//!
//! The codec emits encoded rows one at a time: the first `k` rows are the
//! data rows unchanged, the remaining `limit - k` rows are redundancy. Any `k`
//! emitted rows, together with the row numbers they were emitted at, recover
//! the original data.

pub mod cauchy;
mod decompose;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::field::{FieldElement, Gf256};
use crate::matrix::Matrix;

pub use decompose::Decomposition;

/// Outcome of the last codec operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CodecStatus {
    /// Usable
    Ok,
    /// Bad share count for the field; only ever reported through
    /// [`Error::status`] since no codec is built
    ConstructionError,
    /// Last encode failed; cleared by [`ErasureCodec::clear`]
    EncodingError,
    /// Last decode failed; cleared by [`ErasureCodec::clear`]
    DecodingError,
}

/// Erasure codec for `k` data shares over field `T`
///
/// Encoding advances an internal cursor, so calls on one codec must be
/// serialized; the `&mut self` receivers enforce that. Decode allocates its
/// working matrices per call.
#[derive(Debug, Clone)]
pub struct ErasureCodec<T: FieldElement = Gf256> {
    data_shares: usize,
    limit: usize,
    cursor: usize,
    matrix: Matrix<T>,
    status: CodecStatus,
}

impl<T: FieldElement> ErasureCodec<T> {
    /// Create a codec able to emit one row per field element
    ///
    /// # Errors
    /// Returns [`Error::InvalidShareCount`] unless `1 <= data_shares <= T::limit()`.
    pub fn new(data_shares: usize) -> Result<Self> {
        Self::with_limit(data_shares, T::limit())
    }

    /// Create a codec that emits at most `limit` rows
    ///
    /// `limit` may not exceed the field cardinality.
    pub fn with_limit(data_shares: usize, limit: usize) -> Result<Self> {
        let matrix = cauchy::build(data_shares, limit).map_err(|e| {
            debug!("Codec construction failed: {}", e);
            e
        })?;

        debug!(
            "Created erasure codec: {} data shares, {} rows",
            data_shares, limit
        );

        Ok(Self {
            data_shares,
            limit,
            cursor: 0,
            matrix,
            status: CodecStatus::Ok,
        })
    }

    /// Emit the encoded row at the cursor and advance it
    ///
    /// `data` is the `k x row_length` block, one row per data share.
    ///
    /// # Errors
    /// Fails with [`CodecStatus::EncodingError`] recorded when `row_length` is
    /// zero, `data` has the wrong length, or all `limit` rows were emitted.
    pub fn encode_line(&mut self, data: &[u8], row_length: usize) -> Result<Vec<u8>> {
        let result = if row_length == 0 {
            Err(Error::InvalidRowLength(row_length))
        } else if self.cursor >= self.limit {
            warn!("Encode limit ({}) reached, no more rows available", self.limit);
            Err(Error::EncodeLimit { limit: self.limit })
        } else {
            self.encode_row_at(self.cursor, data, row_length)
        };

        match result {
            Ok(row) => {
                trace!("Encoded row {}", self.cursor);
                self.cursor += 1;
                Ok(row)
            }
            Err(e) => {
                self.status = CodecStatus::EncodingError;
                Err(e)
            }
        }
    }

    /// Emit every row from the cursor up to the limit
    pub fn encode_all(&mut self, data: &[u8], row_length: usize) -> Result<Vec<Vec<u8>>> {
        let mut rows = Vec::with_capacity(self.limit.saturating_sub(self.cursor));
        loop {
            rows.push(self.encode_line(data, row_length)?);
            if self.cursor == self.limit {
                return Ok(rows);
            }
        }
    }

    /// Compute encoded row `index` without touching the cursor or status
    pub fn encode_row_at(&self, index: usize, data: &[u8], row_length: usize) -> Result<Vec<u8>> {
        if row_length == 0 {
            return Err(Error::InvalidRowLength(row_length));
        }
        if index >= self.limit {
            return Err(Error::RowIndexOutOfRange {
                index,
                limit: self.limit,
            });
        }
        let block = Matrix::from_bytes(self.data_shares, row_length, data)?;
        let encoded = block.left_multiply(self.matrix.row(index))?;
        Ok(encoded.into_iter().map(T::to_byte).collect())
    }

    /// Recover the `k x row_length` data block from any `k` encoded rows
    ///
    /// `selected` holds the rows back to back; `row_indices[i]` is the row
    /// number `selected` row `i` was emitted at. Surviving data rows must sit
    /// at their own index (see [`crate::stripe::align_rows`]). Indices that
    /// are in range but do not match the supplied rows give wrong output.
    ///
    /// # Errors
    /// Fails with [`CodecStatus::DecodingError`] recorded on a zero
    /// `row_length`, mismatched lengths, out-of-range indices, or a singular
    /// selection. The encode cursor is never touched.
    pub fn decode(
        &mut self,
        selected: &[u8],
        row_indices: &[usize],
        row_length: usize,
    ) -> Result<Vec<u8>> {
        let result = self.decode_rows(selected, row_indices, row_length);
        if let Err(e) = &result {
            debug!("Decode failed for rows {:?}: {}", row_indices, e);
            self.status = CodecStatus::DecodingError;
        }
        result
    }

    fn decode_rows(
        &self,
        selected: &[u8],
        row_indices: &[usize],
        row_length: usize,
    ) -> Result<Vec<u8>> {
        if row_length == 0 {
            return Err(Error::InvalidRowLength(row_length));
        }
        let encoded = Matrix::from_bytes(self.data_shares, row_length, selected)?;
        let decomposition = self.decompose(row_indices)?;
        let recovered = decomposition.inverse.multiply(&encoded)?;

        debug!(
            "Decoded {} rows of {} bytes from rows {:?}",
            self.data_shares, row_length, row_indices
        );
        Ok(recovered.to_bytes())
    }

    /// Factor and invert the encode submatrix for `row_indices`
    pub fn decompose(&self, row_indices: &[usize]) -> Result<Decomposition<T>> {
        if row_indices.len() != self.data_shares {
            return Err(Error::IndexCount {
                expected: self.data_shares,
                got: row_indices.len(),
            });
        }
        let encode = self.matrix.select_rows(row_indices)?;
        Decomposition::new(encode)
    }

    /// Rewind the cursor and clear a recoverable error
    pub fn clear(&mut self) {
        self.cursor = 0;
        if matches!(
            self.status,
            CodecStatus::EncodingError | CodecStatus::DecodingError
        ) {
            self.status = CodecStatus::Ok;
        }
    }

    pub fn status(&self) -> CodecStatus {
        self.status
    }

    /// Number of data shares (k)
    pub fn data_shares(&self) -> usize {
        self.data_shares
    }

    /// Maximum number of rows this codec emits
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Index of the next row `encode_line` will emit
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The `limit x k` encoding matrix
    pub fn matrix(&self) -> &Matrix<T> {
        &self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stripe::align_rows;
    use rand::seq::index::sample;
    use rand::{Rng, SeedableRng};

    fn random_block(rng: &mut impl Rng, len: usize) -> Vec<u8> {
        (0..len).map(|_| rng.gen()).collect()
    }

    /// Encode every row, then decode from `rows` after alignment
    fn roundtrip(k: usize, row_length: usize, rows: &[usize], data: &[u8]) -> Vec<u8> {
        let mut codec = ErasureCodec::<Gf256>::new(k).unwrap();
        let encoded = codec.encode_all(data, row_length).unwrap();
        assert_eq!(encoded.len(), 256);

        let aligned = align_rows(rows, k).unwrap();
        let selected: Vec<u8> = aligned
            .iter()
            .flat_map(|&i| encoded[i].iter().copied())
            .collect();
        codec.decode(&selected, &aligned, row_length).unwrap()
    }

    #[test]
    fn test_codec_creation() {
        assert!(ErasureCodec::<Gf256>::new(1).is_ok());
        assert!(ErasureCodec::<Gf256>::new(32).is_ok());
        assert!(ErasureCodec::<Gf256>::new(256).is_ok());
        assert!(ErasureCodec::<Gf256>::with_limit(4, 8).is_ok());

        let err = ErasureCodec::<Gf256>::new(0).unwrap_err();
        assert_eq!(err.status(), Some(CodecStatus::ConstructionError));
        let err = ErasureCodec::<Gf256>::new(257).unwrap_err();
        assert_eq!(err.status(), Some(CodecStatus::ConstructionError));
        assert!(ErasureCodec::<Gf256>::with_limit(4, 3).is_err());
        assert!(ErasureCodec::<Gf256>::with_limit(4, 512).is_err());
    }

    #[test]
    fn test_accessors() {
        let codec = ErasureCodec::<Gf256>::with_limit(3, 10).unwrap();
        assert_eq!(codec.data_shares(), 3);
        assert_eq!(codec.limit(), 10);
        assert_eq!(codec.cursor(), 0);
        assert_eq!(codec.status(), CodecStatus::Ok);
        assert_eq!(codec.matrix().rows(), 10);
        assert_eq!(codec.matrix().cols(), 3);
    }

    #[test]
    fn test_systematic_rows() {
        let mut codec = ErasureCodec::<Gf256>::new(3).unwrap();
        let data = b"abcdefghijkl";
        assert_eq!(codec.encode_line(data, 4).unwrap(), b"abcd");
        assert_eq!(codec.encode_line(data, 4).unwrap(), b"efgh");
        assert_eq!(codec.encode_line(data, 4).unwrap(), b"ijkl");
        assert_eq!(codec.cursor(), 3);

        let parity = codec.encode_line(data, 4).unwrap();
        assert_eq!(parity.len(), 4);
        assert_eq!(codec.cursor(), 4);
    }

    #[test]
    fn test_parity_row_matches_matrix() {
        let mut codec = ErasureCodec::<Gf256>::with_limit(2, 3).unwrap();
        let data = [0x01, 0x00];
        let rows = codec.encode_all(&data, 1).unwrap();
        // row 2 = m[2][0] * 1 + m[2][1] * 0 = 1/2
        assert_eq!(rows[2], vec![codec.matrix()[(2, 0)].value()]);
        assert_eq!(rows[2], vec![0x8e]);
    }

    #[test]
    fn test_encode_limit() {
        let mut codec = ErasureCodec::<Gf256>::with_limit(2, 4).unwrap();
        let data = [1, 2, 3, 4];
        for _ in 0..4 {
            codec.encode_line(&data, 2).unwrap();
        }
        assert!(matches!(
            codec.encode_line(&data, 2),
            Err(Error::EncodeLimit { limit: 4 })
        ));
        assert_eq!(codec.status(), CodecStatus::EncodingError);
        assert_eq!(codec.cursor(), 4);
        assert!(codec.encode_all(&data, 2).is_err());

        codec.clear();
        assert_eq!(codec.status(), CodecStatus::Ok);
        assert_eq!(codec.cursor(), 0);
        assert_eq!(codec.encode_all(&data, 2).unwrap().len(), 4);
    }

    #[test]
    fn test_encode_bad_row_length() {
        let mut codec = ErasureCodec::<Gf256>::new(2).unwrap();
        assert!(matches!(
            codec.encode_line(&[], 0),
            Err(Error::InvalidRowLength(0))
        ));
        assert_eq!(codec.status(), CodecStatus::EncodingError);
        assert_eq!(codec.cursor(), 0);

        codec.clear();
        assert!(matches!(
            codec.encode_line(&[1, 2, 3], 2),
            Err(Error::BlockLength {
                expected: 4,
                got: 3
            })
        ));
        assert_eq!(codec.status(), CodecStatus::EncodingError);
    }

    #[test]
    fn test_concrete_scenario() {
        let mut codec = ErasureCodec::<Gf256>::new(4).unwrap();
        let data = [0x11, 0x22, 0x33, 0x44];
        let encoded: Vec<u8> = (0..8)
            .map(|_| codec.encode_line(&data, 1).unwrap()[0])
            .collect();
        assert_eq!(&encoded[..4], &data);

        // rows 0 and 2 lost, backfilled with parity rows 4 and 5
        let indices = [4, 1, 5, 3];
        let selected: Vec<u8> = indices.iter().map(|&i| encoded[i]).collect();
        let recovered = codec.decode(&selected, &indices, 1).unwrap();
        assert_eq!(recovered, data);
        assert_eq!(codec.status(), CodecStatus::Ok);
        assert_eq!(codec.cursor(), 8);
    }

    #[test]
    fn test_no_missing() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let data = random_block(&mut rng, 32 * 32);
        let rows: Vec<usize> = (0..32).collect();
        assert_eq!(roundtrip(32, 32, &rows, &data), data);
    }

    #[test]
    fn test_all_missing() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(2);
        let data = random_block(&mut rng, 32 * 32);
        let rows: Vec<usize> = (32..64).collect();
        assert_eq!(roundtrip(32, 32, &rows, &data), data);
    }

    #[test]
    fn test_half_missing() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let data = random_block(&mut rng, 32 * 32);
        let rows: Vec<usize> = (0..32).map(|i| if i % 2 == 1 { i + 32 } else { i }).collect();
        assert_eq!(roundtrip(32, 32, &rows, &data), data);
    }

    #[test]
    fn test_random_rows() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(4);
        for k in [1usize, 2, 5, 16] {
            let row_length = 7;
            for _ in 0..20 {
                let data = random_block(&mut rng, k * row_length);
                let rows = sample(&mut rng, 256, k).into_vec();
                assert_eq!(
                    roundtrip(k, row_length, &rows, &data),
                    data,
                    "k={} rows={:?}",
                    k,
                    rows
                );
            }
        }
    }

    #[test]
    fn test_cauchy_submatrices_invertible() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        let codec = ErasureCodec::<Gf256>::new(12).unwrap();
        for _ in 0..50 {
            let rows = sample(&mut rng, 256, 12).into_vec();
            let aligned = align_rows(&rows, 12).unwrap();
            let d = codec.decompose(&aligned).unwrap();
            d.verify().unwrap();
        }
    }

    #[test]
    fn test_full_width_codec() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(6);
        let data = random_block(&mut rng, 256 * 2);
        let rows: Vec<usize> = (0..256).rev().collect();
        assert_eq!(roundtrip(256, 2, &rows, &data), data);
    }

    #[test]
    fn test_decode_bad_row_length() {
        let mut codec = ErasureCodec::<Gf256>::new(2).unwrap();
        assert!(matches!(
            codec.decode(&[], &[0, 1], 0),
            Err(Error::InvalidRowLength(0))
        ));
        assert_eq!(codec.status(), CodecStatus::DecodingError);
        codec.clear();
        assert_eq!(codec.status(), CodecStatus::Ok);
    }

    #[test]
    fn test_decode_rejects_malformed_indices() {
        let mut codec = ErasureCodec::<Gf256>::new(2).unwrap();
        let rows = [0u8, 0];
        assert!(matches!(
            codec.decode(&rows, &[0], 1),
            Err(Error::IndexCount {
                expected: 2,
                got: 1
            })
        ));
        assert!(matches!(
            codec.decode(&rows, &[0, 256], 1),
            Err(Error::RowIndexOutOfRange {
                index: 256,
                limit: 256
            })
        ));
        assert!(matches!(
            codec.decode(&rows, &[7, 7], 1),
            Err(Error::SingularMatrix(_))
        ));
        assert!(matches!(
            codec.decode(&rows, &[1, 0], 1),
            Err(Error::SingularMatrix(0))
        ));
        assert!(matches!(
            codec.decode(&rows[..1], &[0, 1], 1),
            Err(Error::BlockLength { .. })
        ));
        assert_eq!(codec.status(), CodecStatus::DecodingError);
    }

    #[test]
    fn test_decode_leaves_cursor() {
        let mut codec = ErasureCodec::<Gf256>::new(2).unwrap();
        let data = [9, 8];
        codec.encode_line(&data, 1).unwrap();
        codec.decode(&data, &[0, 1], 1).unwrap();
        assert_eq!(codec.cursor(), 1);
    }

    #[test]
    fn test_clear_reproduces_fresh_sequence() {
        let data = b"erasure!";
        let mut fresh = ErasureCodec::<Gf256>::with_limit(4, 12).unwrap();
        let expected = fresh.encode_all(data, 2).unwrap();

        let mut reused = ErasureCodec::<Gf256>::with_limit(4, 12).unwrap();
        reused.encode_all(b"otherdat", 2).unwrap();
        reused.clear();
        assert_eq!(reused.cursor(), 0);
        assert_eq!(reused.encode_all(data, 2).unwrap(), expected);
    }

    #[test]
    fn test_encode_row_at_matches_sequence() {
        let data = b"0123456789ab";
        let mut codec = ErasureCodec::<Gf256>::with_limit(3, 9).unwrap();
        let rows = codec.encode_all(data, 4).unwrap();
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(&codec.encode_row_at(i, data, 4).unwrap(), row);
        }
        assert!(codec.encode_row_at(9, data, 4).is_err());
        assert_eq!(codec.status(), CodecStatus::Ok);
    }
}
