//! Depth frame encoder and decoder

use super::header::{DepthHeader, DepthTag};
use super::quantization::QuantizationParams;
use super::rvl;
use crate::compression::{self, CompressionLevel, CompressionParams, CompressionType};
use crate::config::{DepthConfig, DepthFormat};
use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::frame::raster::Raster;
use crate::frame::{CompressedImage, Image, PixelEncoding, SampleType};
use tracing::{debug, trace};

/// Compress a depth image
///
/// Accepts `32FC1` (meters) and `16UC1` (millimeters) images. The payload is
/// a [`DepthHeader`] followed by the back-end stream; the format field reads
/// `"<source encoding>; compressedDepth <png|rvl>"`.
///
/// # Errors
///
/// - [`EncodeError::InvalidConfig`] - configuration outside its ranges
/// - [`EncodeError::UnsupportedEncoding`] - not a depth encoding
/// - [`EncodeError::EmptyImage`] / [`EncodeError::InvalidImage`] - bad geometry
/// - [`EncodeError::BackendFailure`] - the PNG encoder failed
///
/// # Examples
///
/// ```
/// use compressed_image_transport::config::{DepthConfig, DepthFormat};
/// use compressed_image_transport::depth;
/// use compressed_image_transport::frame::Image;
///
/// let image = Image::from_depth_meters(4, 1, &[1.0, 2.0, 0.0, f32::NAN]);
/// let config = DepthConfig {
///     format: DepthFormat::Rvl,
///     ..DepthConfig::default()
/// };
///
/// let compressed = depth::encode(&image, &config).unwrap();
/// assert_eq!(compressed.format, "32FC1; compressedDepth rvl");
///
/// let decoded = depth::decode(&compressed.data).unwrap();
/// let meters = decoded.depth_meters().unwrap();
/// assert!((meters[0] - 1.0).abs() < 0.001);
/// assert!(meters[2].is_nan() && meters[3].is_nan());
/// ```
pub fn encode(image: &Image, config: &DepthConfig) -> EncodeResult<CompressedImage> {
    config.validate()?;
    image.validate()?;

    let quantization = QuantizationParams::new(config.depth_max, config.depth_quantization);
    let quantized = quantize_image(image, &quantization)?;

    trace!(
        width = image.width,
        height = image.height,
        format = config.format.name(),
        quant_a = quantization.quant_a,
        quant_b = quantization.quant_b,
        "Quantized depth image"
    );

    let (tag, body) = match config.format {
        DepthFormat::Rvl => (DepthTag::Rvl, rvl::encode(&quantized)),
        DepthFormat::Png => {
            let raster = Raster::from_u16(image.width, image.height, &quantized);
            let params = CompressionParams {
                png_level: CompressionLevel::from_png_level(config.png_level),
                ..CompressionParams::default()
            };
            let body = compression::compress(&raster, CompressionType::Png, &params)?;
            (DepthTag::PngDepth, body)
        }
    };

    let header = DepthHeader {
        tag,
        width: image.width,
        height: image.height,
        quantization,
    };
    let mut data = header.encode();
    data.extend_from_slice(&body);

    debug!(
        format = tag.name(),
        original_size = image.data.len(),
        compressed_size = data.len(),
        "Compressed depth image"
    );

    Ok(CompressedImage::new(
        format!("{}; compressedDepth {}", image.encoding, config.format),
        data,
    ))
}

/// Compress a depth image with the format given by name
///
/// Equivalent to [`encode`] with a [`DepthConfig`] built from the arguments.
/// An unknown `format` is [`EncodeError::UnsupportedFormat`].
pub fn encode_with_format(
    image: &Image,
    format: &str,
    depth_max: f64,
    depth_quantization: f64,
    png_level: u8,
) -> EncodeResult<CompressedImage> {
    let format: DepthFormat = format.parse()?;
    let config = DepthConfig {
        format,
        depth_max,
        depth_quantization,
        png_level,
    };
    encode(image, &config)
}

fn quantize_image(image: &Image, quantization: &QuantizationParams) -> EncodeResult<Vec<u16>> {
    match image.encoding {
        PixelEncoding::DEPTH_METERS => Ok(image
            .data
            .chunks_exact(4)
            .map(|c| quantization.quantize(f32::from_le_bytes([c[0], c[1], c[2], c[3]])))
            .collect()),
        PixelEncoding::DEPTH_MILLIMETERS => Ok(image
            .data
            .chunks_exact(2)
            .map(|c| {
                let millimeters = u16::from_le_bytes([c[0], c[1]]);
                quantization.quantize(millimeters as f32 / 1000.0)
            })
            .collect()),
        other => Err(EncodeError::UnsupportedEncoding(format!(
            "compressedDepth requires 32FC1 or 16UC1 input, got {}",
            other
        ))),
    }
}

/// Decompress a depth payload into a `32FC1` image
///
/// Needs nothing but the payload: the header carries the back end, the
/// dimensions and the quantization coefficients. Invalid pixels come back as
/// NaN.
///
/// # Errors
///
/// - [`DecodeError::CorruptPayload`] - truncated header, unknown tag, or a
///   stream that does not decode to exactly `width * height` pixels
/// - [`DecodeError::EmptyImage`] - header declares zero rows or columns
/// - [`DecodeError::BackendFailure`] - the PNG decoder failed
pub fn decode(data: &[u8]) -> DecodeResult<Image> {
    let header = DepthHeader::decode(data)?;
    if header.width == 0 || header.height == 0 {
        return Err(DecodeError::EmptyImage {
            width: header.width,
            height: header.height,
        });
    }

    let body = &data[DepthHeader::SIZE..];
    trace!(
        format = header.tag.name(),
        width = header.width,
        height = header.height,
        body_size = body.len(),
        "Decoding depth payload"
    );

    let quantized = match header.tag {
        DepthTag::Rvl => rvl::decode(body, header.num_pixels()?)?,
        DepthTag::PngDepth => {
            let raster = compression::decompress(body, CompressionType::Png)?;
            if raster.channels != 1 || raster.sample != SampleType::U16 {
                return Err(DecodeError::CorruptPayload(format!(
                    "depth png holds {} channel(s) of {}-bit samples, expected 16-bit gray",
                    raster.channels,
                    raster.sample.bits()
                )));
            }
            if (raster.width, raster.height) != (header.width, header.height) {
                return Err(DecodeError::CorruptPayload(format!(
                    "depth png is {}x{} but header declares {}x{}",
                    raster.width, raster.height, header.width, header.height
                )));
            }
            raster.samples_u16()
        }
    };

    let meters: Vec<f32> = quantized
        .iter()
        .map(|&v| header.quantization.dequantize(v))
        .collect();

    debug!(
        format = header.tag.name(),
        width = header.width,
        height = header.height,
        "Decoded depth image"
    );

    Ok(Image::from_depth_meters(header.width, header.height, &meters))
}

/// Decompress the payload of a compressed depth message
pub fn decode_message(message: &CompressedImage) -> DecodeResult<Image> {
    decode(&message.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn ramp(width: u32, height: u32) -> Image {
        let meters: Vec<f32> = (0..width * height)
            .map(|i| if i % 7 == 0 { 0.0 } else { 0.5 + (i % 50) as f32 * 0.1 })
            .collect();
        Image::from_depth_meters(width, height, &meters)
    }

    fn config(format: DepthFormat) -> DepthConfig {
        DepthConfig {
            format,
            ..DepthConfig::default()
        }
    }

    #[test]
    fn test_rvl_and_png_agree() {
        let image = ramp(20, 10);
        let rvl = decode(&encode(&image, &config(DepthFormat::Rvl)).unwrap().data).unwrap();
        let png = decode(&encode(&image, &config(DepthFormat::Png)).unwrap().data).unwrap();

        let a = rvl.depth_meters().unwrap();
        let b = png.depth_meters().unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!(x.to_bits() == y.to_bits() || (x.is_nan() && y.is_nan()));
        }
    }

    #[test]
    fn test_header_records_choice() {
        let image = ramp(4, 4);
        let compressed = encode(&image, &config(DepthFormat::Png)).unwrap();
        let header = DepthHeader::decode(&compressed.data).unwrap();
        assert_eq!(header.tag, DepthTag::PngDepth);
        assert_eq!((header.width, header.height), (4, 4));
        assert_eq!(header.quantization, QuantizationParams::new(10.0, 100.0));
        assert_eq!(compressed.format, "32FC1; compressedDepth png");
    }

    #[test]
    fn test_millimeter_input() {
        let image = Image::from_depth_millimeters(3, 1, &[0, 1500, 4000]);
        let compressed = encode(&image, &config(DepthFormat::Rvl)).unwrap();
        assert_eq!(compressed.format, "16UC1; compressedDepth rvl");

        let decoded = decode(&compressed.data).unwrap();
        assert_eq!(decoded.encoding, PixelEncoding::DEPTH_METERS);
        let meters = decoded.depth_meters().unwrap();
        assert!(meters[0].is_nan());
        assert!((meters[1] - 1.5).abs() < 0.001);
        assert!((meters[2] - 4.0).abs() < 0.002);
    }

    #[test]
    fn test_rejects_non_depth_encoding() {
        let image = Image::new(PixelEncoding::Rgb8, 2, 2, vec![0; 12]).unwrap();
        let result = encode(&image, &DepthConfig::default());
        assert!(matches!(result, Err(EncodeError::UnsupportedEncoding(_))));
    }

    #[test]
    fn test_rejects_unknown_format_name() {
        let image = ramp(2, 2);
        let result = encode_with_format(&image, "jpeg", 10.0, 100.0, 3);
        assert!(matches!(result, Err(EncodeError::UnsupportedFormat(_))));

        let ok = encode_with_format(&image, "rvl", 10.0, 100.0, 3).unwrap();
        assert!(ok.format.ends_with("rvl"));
    }

    #[test]
    fn test_rejects_out_of_range_config() {
        let image = ramp(2, 2);
        let bad = DepthConfig {
            depth_quantization: 0.0,
            ..DepthConfig::default()
        };
        let result = encode(&image, &bad);
        assert!(matches!(
            result,
            Err(EncodeError::InvalidConfig(ConfigError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_rejects_empty_image() {
        let image = Image::from_depth_meters(0, 3, &[]);
        assert!(matches!(
            encode(&image, &DepthConfig::default()),
            Err(EncodeError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_decode_dimension_mismatch() {
        let image = ramp(8, 8);
        let mut data = encode(&image, &config(DepthFormat::Rvl)).unwrap().data;
        // declare one more row than the stream holds
        data[8..12].copy_from_slice(&9u32.to_le_bytes());
        assert!(matches!(decode(&data), Err(DecodeError::CorruptPayload(_))));

        let mut data = encode(&image, &config(DepthFormat::Png)).unwrap().data;
        data[4..8].copy_from_slice(&4u32.to_le_bytes());
        assert!(matches!(decode(&data), Err(DecodeError::CorruptPayload(_))));
    }

    #[test]
    fn test_decode_zero_dimensions() {
        let header = DepthHeader {
            tag: DepthTag::Rvl,
            width: 0,
            height: 10,
            quantization: QuantizationParams::new(10.0, 100.0),
        };
        assert!(matches!(
            decode(&header.encode()),
            Err(DecodeError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_decode_truncated_png_body() {
        let image = ramp(16, 16);
        let data = encode(&image, &config(DepthFormat::Png)).unwrap().data;
        let truncated = &data[..DepthHeader::SIZE + 10];
        assert!(decode(truncated).is_err());
    }
}
