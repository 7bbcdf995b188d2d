//! Stripe-level erasure coding
//!
//! Splits a byte buffer into K data shards plus N-K parity shards and puts it
//! back together from any K of them. Also provides the row alignment that
//! [`ErasureCodec::decode`] expects from its callers.

use std::collections::HashSet;

use tracing::debug;

use crate::codec::ErasureCodec;
use crate::config::ErasureConfig;
use crate::error::{Error, Result};
use crate::field::Gf256;

/// Length header prepended to every stripe (u64 big-endian)
const LENGTH_HEADER: usize = 8;

/// Reorder `k` distinct row indices so every data row `i < k` sits at slot `i`
///
/// Parity rows fill whatever slots are left. The caller gathers its surviving
/// rows in the returned order before calling [`ErasureCodec::decode`].
///
/// # Errors
/// Returns an error if `indices` does not hold exactly `k` distinct values.
pub fn align_rows(indices: &[usize], k: usize) -> Result<Vec<usize>> {
    if indices.len() != k {
        return Err(Error::IndexCount {
            expected: k,
            got: indices.len(),
        });
    }
    let mut seen = HashSet::with_capacity(k);
    for &index in indices {
        if !seen.insert(index) {
            return Err(Error::DuplicateRowIndex(index));
        }
    }

    let mut rows = indices.to_vec();
    for slot in 0..k {
        // each swap settles one data row at home, so this terminates
        while rows[slot] < k && rows[slot] != slot {
            let home = rows[slot];
            rows.swap(slot, home);
        }
    }
    Ok(rows)
}

/// Splits buffers into stripes over a codec capped at N matrix rows
pub struct StripeEncoder {
    codec: ErasureCodec<Gf256>,
    data_shards: usize,
    total_shards: usize,
}

impl StripeEncoder {
    /// Stripe of `total_shards` rows, the first `data_shards` of them data
    ///
    /// Needs `0 < data_shards < total_shards <= 256`; a stripe without parity
    /// rows is rejected.
    pub fn new(data_shards: usize, total_shards: usize) -> Result<Self> {
        if data_shards == 0 {
            return Err(Error::InvalidConfig(
                "a stripe needs at least one data shard".to_string(),
            ));
        }
        if total_shards <= data_shards {
            return Err(Error::InvalidConfig(
                format!(
                    "{} shards leave no parity over {} data shards",
                    total_shards, data_shards
                ),
            ));
        }

        let codec = ErasureCodec::with_limit(data_shards, total_shards)?;

        Ok(Self {
            codec,
            data_shards,
            total_shards,
        })
    }

    /// Encoder for the stripe shape in `config`
    pub fn from_config(config: &ErasureConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.data_shards, config.total_shards)
    }

    /// Emit every row of the stripe holding `data`
    ///
    /// The block fed to the codec is the payload length as a big-endian `u64`,
    /// then the payload, then zero fill up to K equal rows. Shard `i` is
    /// encoded row `i`, so the first K shards are that block cut into rows.
    pub fn encode(&mut self, data: &[u8]) -> Result<Vec<Vec<u8>>> {
        let original_len = data.len() as u64;
        let shard_size = self.shard_size(data.len());

        let mut block = Vec::with_capacity(shard_size * self.data_shards);
        block.extend_from_slice(&original_len.to_be_bytes());
        block.extend_from_slice(data);
        block.resize(shard_size * self.data_shards, 0);

        self.codec.clear();
        let shards = self.codec.encode_all(&block, shard_size)?;

        debug!(
            "Encoded {} bytes into {} shards of {} bytes",
            data.len(),
            shards.len(),
            shard_size
        );
        Ok(shards)
    }

    /// Recover the payload from a stripe with up to N-K holes
    ///
    /// `shards[i]` is row `i` or `None` when lost. The first K present rows
    /// are used and must share one length.
    pub fn decode(&mut self, shards: &[Option<Vec<u8>>]) -> Result<Vec<u8>> {
        let block = self.recover_block(shards)?;

        if block.len() < LENGTH_HEADER {
            return Err(Error::ErasureDecode(
                "Recovered block is shorter than its length header".to_string(),
            ));
        }

        let mut header = [0u8; LENGTH_HEADER];
        header.copy_from_slice(&block[..LENGTH_HEADER]);
        let original_len = u64::from_be_bytes(header) as usize;

        if original_len > block.len() - LENGTH_HEADER {
            return Err(Error::ErasureDecode(format!(
                "Length header says {} bytes but the block holds {}",
                original_len,
                block.len() - LENGTH_HEADER
            )));
        }

        Ok(block[LENGTH_HEADER..LENGTH_HEADER + original_len].to_vec())
    }

    /// Fill in every missing shard, data and parity alike
    pub fn reconstruct(&mut self, shards: &mut [Option<Vec<u8>>]) -> Result<()> {
        let block = self.recover_block(shards)?;
        let shard_size = block.len() / self.data_shards;

        let mut rebuilt = 0;
        for (index, slot) in shards.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(self.codec.encode_row_at(index, &block, shard_size)?);
                rebuilt += 1;
            }
        }

        debug!("Rebuilt {} missing shards", rebuilt);
        Ok(())
    }

    /// Recover the padded K x shard_size block from any K shards
    fn recover_block(&mut self, shards: &[Option<Vec<u8>>]) -> Result<Vec<u8>> {
        if shards.len() != self.total_shards {
            return Err(Error::ShardCount {
                expected: self.total_shards,
                got: shards.len(),
            });
        }

        if !self.can_reconstruct(shards) {
            return Err(Error::NotEnoughShards {
                available: shards.iter().filter(|s| s.is_some()).count(),
                required: self.data_shards,
            });
        }

        let survivors: Vec<usize> = shards
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| i))
            .take(self.data_shards)
            .collect();
        let rows = align_rows(&survivors, self.data_shards)?;

        let mut shard_size = None;
        let mut selected = Vec::new();
        for &index in &rows {
            let shard = shards[index].as_deref().unwrap_or_default();
            let expected = *shard_size.get_or_insert(shard.len());
            if shard.len() != expected {
                return Err(Error::ShardLength {
                    index,
                    expected,
                    got: shard.len(),
                });
            }
            selected.extend_from_slice(shard);
        }
        let shard_size = shard_size.unwrap_or(0);

        debug!("Decoding stripe from shards {:?}", rows);
        self.codec.clear();
        self.codec.decode(&selected, &rows, shard_size)
    }

    /// Row length of the stripe for a `data_len` byte payload
    pub fn shard_size(&self, data_len: usize) -> usize {
        let total_len = data_len + LENGTH_HEADER;
        (total_len + self.data_shards - 1) / self.data_shards
    }

    /// At least K rows present
    pub fn can_reconstruct(&self, shards: &[Option<Vec<u8>>]) -> bool {
        let available = shards.iter().filter(|s| s.is_some()).count();
        available >= self.data_shards
    }

    pub fn data_shards(&self) -> usize {
        self.data_shards
    }

    pub fn total_shards(&self) -> usize {
        self.total_shards
    }

    pub fn parity_shards(&self) -> usize {
        self.total_shards - self.data_shards
    }
}
