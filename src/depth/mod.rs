//! Depth image compression
//!
//! Depth frames are quantized in inverse-depth space onto 16-bit values and
//! then stored either as a 16-bit PNG or as an RVL stream. Every payload
//! starts with a [`DepthHeader`] carrying the back end, the dimensions and the
//! quantization coefficients, so decoding needs no configuration.
//!
//! # Payload Layout
//!
//! ```text
//! +------------------+--------------------------------+
//! | DepthHeader (28) | PNG file or RVL stream         |
//! +------------------+--------------------------------+
//! ```

mod codec;
pub mod header;
pub mod quantization;
pub mod rvl;

pub use codec::{decode, decode_message, encode, encode_with_format};
pub use header::{DepthHeader, DepthTag};
pub use quantization::QuantizationParams;
