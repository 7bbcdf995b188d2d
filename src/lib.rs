//! cauchy-erasure - Systematic erasure coding over GF(2^8)
//!
//! Any K of the rows produced from K data shares reconstruct the data
//! exactly. Encoding uses a Cauchy matrix whose top K rows are the identity,
//! so the data shares themselves are the first K rows.

pub mod codec;
pub mod config;
pub mod error;
pub mod field;
pub mod logging;
pub mod matrix;
pub mod stripe;

pub use codec::{CodecStatus, Decomposition, ErasureCodec};
pub use config::Config;
pub use error::{Error, Result};
pub use field::{FieldElement, Gf256, Gf256Tables};
pub use matrix::Matrix;
pub use stripe::{align_rows, StripeEncoder};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::codec::{CodecStatus, ErasureCodec};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::field::{FieldElement, Gf256};
    pub use crate::stripe::{align_rows, StripeEncoder};
}
