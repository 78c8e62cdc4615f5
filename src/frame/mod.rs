//! Uncompressed and compressed image frames
//!
//! [`Image`] is the raw frame handed to an encoder (and produced by a decoder);
//! [`CompressedImage`] is what travels on the wire: a text format field plus an
//! opaque payload.
//!
//! # Examples
//!
//! ```
//! use compressed_image_transport::frame::{Image, PixelEncoding};
//!
//! let depth = Image::from_depth_meters(2, 1, &[1.5, f32::NAN]);
//! assert_eq!(depth.encoding, PixelEncoding::DEPTH_METERS);
//! assert_eq!(depth.data.len(), 8);
//! ```

pub mod encoding;
pub(crate) mod raster;

pub use encoding::{BayerPattern, ChannelOrder, PixelEncoding, SampleType, UnknownEncoding};

use crate::error::{EncodeError, EncodeResult};

/// Uncompressed image
///
/// Samples are stored row-major, tightly packed (no row padding), in
/// little-endian byte order.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Pixel encoding of `data`
    pub encoding: PixelEncoding,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Raw sample bytes
    pub data: Vec<u8>,
}

impl Image {
    /// Create an image, checking that `data` matches the declared geometry
    pub fn new(encoding: PixelEncoding, width: u32, height: u32, data: Vec<u8>) -> EncodeResult<Self> {
        let expected = Self::expected_size(encoding, width, height);
        if data.len() != expected {
            return Err(EncodeError::InvalidImage {
                expected,
                actual: data.len(),
            });
        }

        Ok(Image {
            encoding,
            width,
            height,
            data,
        })
    }

    /// Build a `32FC1` depth image from meters
    ///
    /// # Panics
    ///
    /// Panics if `meters.len() != width * height`.
    pub fn from_depth_meters(width: u32, height: u32, meters: &[f32]) -> Self {
        assert_eq!(meters.len(), width as usize * height as usize);
        Image {
            encoding: PixelEncoding::DEPTH_METERS,
            width,
            height,
            data: meters.iter().flat_map(|m| m.to_le_bytes()).collect(),
        }
    }

    /// Build a `16UC1` depth image from millimeters
    ///
    /// # Panics
    ///
    /// Panics if `millimeters.len() != width * height`.
    pub fn from_depth_millimeters(width: u32, height: u32, millimeters: &[u16]) -> Self {
        assert_eq!(millimeters.len(), width as usize * height as usize);
        Image {
            encoding: PixelEncoding::DEPTH_MILLIMETERS,
            width,
            height,
            data: millimeters.iter().flat_map(|m| m.to_le_bytes()).collect(),
        }
    }

    /// Depth samples in meters, if this is a `32FC1` image
    pub fn depth_meters(&self) -> Option<Vec<f32>> {
        if self.encoding != PixelEncoding::DEPTH_METERS {
            return None;
        }
        Some(
            self.data
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )
    }

    /// Get total number of pixels
    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True when the image has no rows or no columns
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of bytes a tightly packed image of this geometry occupies
    pub fn expected_size(encoding: PixelEncoding, width: u32, height: u32) -> usize {
        width as usize * height as usize * encoding.bytes_per_pixel()
    }

    pub(crate) fn validate(&self) -> EncodeResult<()> {
        if self.is_empty() {
            return Err(EncodeError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        let expected = Self::expected_size(self.encoding, self.width, self.height);
        if self.data.len() != expected {
            return Err(EncodeError::InvalidImage {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

/// Compressed image as carried by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    /// Format field, e.g. `"bgr8; jpeg compressed bgr8"` or
    /// `"32FC1; compressedDepth rvl"`
    pub format: String,
    /// Compressed payload
    pub data: Vec<u8>,
}

impl CompressedImage {
    pub fn new(format: impl Into<String>, data: Vec<u8>) -> Self {
        CompressedImage {
            format: format.into(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_size() {
        let ok = Image::new(PixelEncoding::Rgb8, 4, 2, vec![0; 24]);
        assert!(ok.is_ok());

        let err = Image::new(PixelEncoding::Rgb8, 4, 2, vec![0; 23]).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::InvalidImage {
                expected: 24,
                actual: 23
            }
        ));
    }

    #[test]
    fn test_depth_meters_roundtrip() {
        let image = Image::from_depth_meters(3, 1, &[0.5, 0.0, 7.25]);
        assert_eq!(image.depth_meters().unwrap(), vec![0.5, 0.0, 7.25]);
        assert_eq!(image.num_pixels(), 3);
    }

    #[test]
    fn test_depth_meters_requires_float_encoding() {
        let image = Image::from_depth_millimeters(1, 1, &[1000]);
        assert!(image.depth_meters().is_none());
        assert_eq!(image.data, vec![0xE8, 0x03]);
    }

    #[test]
    fn test_validate_rejects_empty() {
        let image = Image::new(PixelEncoding::Mono8, 0, 5, vec![]).unwrap();
        assert!(matches!(
            image.validate(),
            Err(EncodeError::EmptyImage {
                width: 0,
                height: 5
            })
        ));
    }
}
