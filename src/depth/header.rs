//! Depth payload header
//!
//! A fixed 28-byte structure that precedes every compressed depth payload.

use super::quantization::QuantizationParams;
use crate::error::{DecodeError, DecodeResult};
use bytes::{Buf, BufMut, BytesMut};

/// Back end that produced the payload following the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthTag {
    /// 16-bit grayscale PNG of quantized values
    PngDepth = 0,
    /// RVL stream of quantized values
    Rvl = 1,
}

impl DepthTag {
    pub fn from_u32(value: u32) -> DecodeResult<Self> {
        match value {
            0 => Ok(DepthTag::PngDepth),
            1 => Ok(DepthTag::Rvl),
            other => Err(DecodeError::CorruptPayload(format!(
                "unknown depth tag {}",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DepthTag::PngDepth => "png",
            DepthTag::Rvl => "rvl",
        }
    }
}

/// Compressed depth header (28 bytes fixed size)
///
/// # Header Structure (all numerical values in little-endian)
/// - Tag: u32 (4 bytes) - 0 = PNG, 1 = RVL
/// - Width: u32 (4 bytes)
/// - Height: u32 (4 bytes)
/// - quant_a: f64 (8 bytes)
/// - quant_b: f64 (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthHeader {
    pub tag: DepthTag,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Quantization coefficients used by the encoder
    pub quantization: QuantizationParams,
}

impl DepthHeader {
    /// Header size in bytes
    pub const SIZE: usize = 28;

    /// Largest frame a payload may declare (8192 x 8192 pixels)
    pub const MAX_PIXELS: usize = 1 << 26;

    /// Number of pixels the payload must decode to
    ///
    /// Fails with `CorruptPayload` if `width * height` overflows or exceeds
    /// [`DepthHeader::MAX_PIXELS`].
    pub fn num_pixels(&self) -> DecodeResult<usize> {
        let pixels = (self.width as usize)
            .checked_mul(self.height as usize)
            .ok_or_else(|| {
                DecodeError::CorruptPayload(format!(
                    "depth frame {}x{} overflows the pixel count",
                    self.width, self.height
                ))
            })?;

        if pixels > Self::MAX_PIXELS {
            return Err(DecodeError::CorruptPayload(format!(
                "depth frame {}x{} exceeds the limit of {} pixels",
                self.width,
                self.height,
                Self::MAX_PIXELS
            )));
        }
        Ok(pixels)
    }

    /// Decode a header from the start of a payload
    ///
    /// # Arguments
    /// * `buf` - Byte slice containing at least 28 bytes
    ///
    /// # Returns
    /// Decoded header, or `CorruptPayload` if the buffer is too short, the tag
    /// is unknown, the frame is too large or the coefficients cannot be
    /// inverted
    pub fn decode(buf: &[u8]) -> DecodeResult<Self> {
        if buf.len() < Self::SIZE {
            return Err(DecodeError::CorruptPayload(format!(
                "depth header truncated: expected {} bytes, got {}",
                Self::SIZE,
                buf.len()
            )));
        }

        let mut cursor = std::io::Cursor::new(buf);

        let tag = DepthTag::from_u32(cursor.get_u32_le())?;
        let width = cursor.get_u32_le();
        let height = cursor.get_u32_le();
        let quantization = QuantizationParams {
            quant_a: cursor.get_f64_le(),
            quant_b: cursor.get_f64_le(),
        };

        if !quantization.is_valid() {
            return Err(DecodeError::CorruptPayload(format!(
                "invalid quantization coefficients a={} b={}",
                quantization.quant_a, quantization.quant_b
            )));
        }

        let header = DepthHeader {
            tag,
            width,
            height,
            quantization,
        };
        header.num_pixels()?;
        Ok(header)
    }

    /// Encode the header into a byte vector
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(Self::SIZE);

        buf.put_u32_le(self.tag as u32);
        buf.put_u32_le(self.width);
        buf.put_u32_le(self.height);
        buf.put_f64_le(self.quantization.quant_a);
        buf.put_f64_le(self.quantization.quant_b);

        buf.to_vec()
    }
}
