//! Wire format compatibility tests
//!
//! These tests pin the exact bytes and format strings that go on the wire, so
//! that payloads stay readable by existing subscribers.

use compressed_image_transport::color;
use compressed_image_transport::config::{ColorConfig, ColorFormat, DepthConfig, DepthFormat};
use compressed_image_transport::depth::{self, rvl, DepthHeader, DepthTag, QuantizationParams};
use compressed_image_transport::frame::{BayerPattern, Image, PixelEncoding};

/// Depth header: tag, width, height, quant_a, quant_b, all little-endian
#[test]
fn test_depth_header_bytes() {
    let image = Image::from_depth_meters(3, 2, &[1.0; 6]);
    let config = DepthConfig {
        format: DepthFormat::Rvl,
        ..DepthConfig::default()
    };
    let data = depth::encode(&image, &config).unwrap().data;

    assert_eq!(&data[0..4], &[0x01, 0x00, 0x00, 0x00]);
    assert_eq!(&data[4..8], &[0x03, 0x00, 0x00, 0x00]);
    assert_eq!(&data[8..12], &[0x02, 0x00, 0x00, 0x00]);
    assert_eq!(&data[12..20], &10100.0f64.to_le_bytes());
    assert_eq!(&data[20..28], &(-1009.0f64).to_le_bytes());

    let header = DepthHeader::decode(&data).unwrap();
    assert_eq!(header.tag, DepthTag::Rvl);
}

/// A single run of six equal values: 0 zeros, 6 values, first delta, five zero deltas
#[test]
fn test_rvl_stream_bytes() {
    let image = Image::from_depth_meters(3, 2, &[1.0; 6]);
    let config = DepthConfig {
        format: DepthFormat::Rvl,
        ..DepthConfig::default()
    };
    let data = depth::encode(&image, &config).unwrap().data;
    let body = &data[DepthHeader::SIZE..];

    // 1.0 m quantizes to 10100 - 1009 = 9091, zigzag 18182 = 0x4706
    let value = QuantizationParams::new(10.0, 100.0).quantize(1.0);
    assert_eq!(value, 9091);
    assert_eq!(body, &[0x00, 0x06, 0x86, 0x8E, 0x01, 0, 0, 0, 0, 0]);
    assert_eq!(rvl::decode(body, 6).unwrap(), vec![9091; 6]);
}

#[test]
fn test_png_depth_body_is_png_file() {
    let image = Image::from_depth_meters(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    let data = depth::encode(&image, &DepthConfig::default()).unwrap().data;
    assert_eq!(&data[0..4], &[0, 0, 0, 0]);
    assert_eq!(
        &data[DepthHeader::SIZE..DepthHeader::SIZE + 8],
        &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]
    );
}

#[test]
fn test_color_format_strings() {
    let cases = [
        (PixelEncoding::Bgr8, ColorFormat::Jpeg, false, "bgr8; jpeg compressed bgr8"),
        (PixelEncoding::Rgb16, ColorFormat::Jpeg, false, "rgb16; jpeg compressed bgr8"),
        (PixelEncoding::Mono16, ColorFormat::Jpeg, false, "mono16; jpeg compressed mono8"),
        (
            PixelEncoding::Bayer8(BayerPattern::Grbg),
            ColorFormat::Jpeg,
            false,
            "bayer_grbg8; jpeg compressed mono8",
        ),
        (
            PixelEncoding::Bayer8(BayerPattern::Grbg),
            ColorFormat::Jpeg,
            true,
            "bayer_grbg8; jpeg compressed bayer_grbg8",
        ),
        (PixelEncoding::Rgba8, ColorFormat::Png, false, "rgba8; png compressed bgra8"),
        (PixelEncoding::Mono8, ColorFormat::Png, false, "mono8; png compressed "),
        (PixelEncoding::Rgb8, ColorFormat::Tiff, false, "rgb8; tiff compressed "),
    ];

    for (encoding, format, compress_bayer, expected) in cases {
        let len = Image::expected_size(encoding, 4, 4);
        let image = Image::new(encoding, 4, 4, vec![77; len]).unwrap();
        let config = ColorConfig {
            format,
            jpeg_compress_bayer: compress_bayer,
            ..ColorConfig::default()
        };
        let compressed = color::encode(&image, &config).unwrap();
        assert_eq!(compressed.format, expected);
    }
}
