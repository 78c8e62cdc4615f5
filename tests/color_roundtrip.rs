//! Color/mono codec round-trip tests

use compressed_image_transport::color::{self, FormatTag, StoredLayout};
use compressed_image_transport::config::{
    ColorConfig, ColorFormat, DecodeConfig, DecodeMode, COLOR_TRANSPORT,
};
use compressed_image_transport::error::DecodeError;
use compressed_image_transport::frame::{CompressedImage, Image, PixelEncoding};
use compressed_image_transport::parameters::{ParameterMap, ParameterValue};

fn checkerboard(encoding: PixelEncoding, width: u32, height: u32) -> Image {
    let bpp = encoding.bytes_per_pixel();
    let mut data = Vec::with_capacity(width as usize * height as usize * bpp);
    for y in 0..height {
        for x in 0..width {
            let light = (x / 4 + y / 4) % 2 == 0;
            for b in 0..bpp {
                data.push(if light { 200 } else { 40 + b as u8 });
            }
        }
    }
    Image::new(encoding, width, height, data).unwrap()
}

/// mono8 through JPEG keeps its shape and tag
#[test]
fn test_scenario_mono8_jpeg() {
    let image = checkerboard(PixelEncoding::Mono8, 32, 24);
    let config = ColorConfig {
        format: ColorFormat::Jpeg,
        jpeg_quality: 95,
        ..ColorConfig::default()
    };

    let compressed = color::encode(&image, &config).unwrap();
    assert_eq!(compressed.format, "mono8; jpeg compressed mono8");

    let decoded = color::decode(&compressed, &DecodeConfig::default()).unwrap();
    assert_eq!(decoded.encoding, PixelEncoding::Mono8);
    assert_eq!((decoded.width, decoded.height), (32, 24));
    assert_eq!(decoded.data.len(), image.data.len());
}

/// rgba16 through PNG is stored as bgra16 and restored exactly
#[test]
fn test_scenario_rgba16_png() {
    let len = Image::expected_size(PixelEncoding::Rgba16, 5, 4);
    let data: Vec<u8> = (0..len).map(|i| (i * 37 % 256) as u8).collect();
    let image = Image::new(PixelEncoding::Rgba16, 5, 4, data).unwrap();
    let config = ColorConfig {
        format: ColorFormat::Png,
        ..ColorConfig::default()
    };

    let compressed = color::encode(&image, &config).unwrap();
    assert_eq!(compressed.format, "rgba16; png compressed bgra16");
    assert_eq!(
        compressed.format.parse::<FormatTag>().unwrap(),
        FormatTag::Tagged {
            source: PixelEncoding::Rgba16,
            codec: ColorFormat::Png,
            layout: StoredLayout::Bgr {
                alpha: true,
                bits: 16
            },
        }
    );

    let decoded = color::decode(&compressed, &DecodeConfig::default()).unwrap();
    assert_eq!(decoded, image);
}

#[test]
fn test_config_from_host_parameters() {
    let mut params = ParameterMap::new();
    params.set("camera.image_raw.compressed.format", ParameterValue::from("png"));
    params.set("camera.image_raw.compressed.png_level", ParameterValue::Integer(1));

    let scope = params.scope("/camera/image_raw", COLOR_TRANSPORT);
    let config = ColorConfig::from_parameters(&scope).unwrap();
    assert_eq!(config.format, ColorFormat::Png);

    let image = checkerboard(PixelEncoding::Bgr8, 8, 8);
    let compressed = color::encode(&image, &config).unwrap();
    assert_eq!(compressed.format, "bgr8; png compressed bgr8");
    assert_eq!(color::decode(&compressed, &DecodeConfig::default()).unwrap(), image);
}

#[test]
fn test_gray_mode_on_color_jpeg() {
    let image = checkerboard(PixelEncoding::Rgb8, 16, 16);
    let compressed = color::encode(&image, &ColorConfig::default()).unwrap();

    let decoded = color::decode(
        &compressed,
        &DecodeConfig {
            mode: DecodeMode::Gray,
        },
    )
    .unwrap();
    assert_eq!(decoded.encoding, PixelEncoding::Mono8);
    assert_eq!(decoded.data.len(), 256);
}

#[test]
fn test_color_mode_on_mono_png() {
    let image = checkerboard(PixelEncoding::Mono8, 8, 8);
    let config = ColorConfig {
        format: ColorFormat::Png,
        ..ColorConfig::default()
    };
    let compressed = color::encode(&image, &config).unwrap();

    let decoded = color::decode(
        &compressed,
        &DecodeConfig {
            mode: DecodeMode::Color,
        },
    )
    .unwrap();
    assert_eq!(decoded.encoding, PixelEncoding::Bgr8);
    let expected: Vec<u8> = image.data.iter().flat_map(|&v| [v, v, v]).collect();
    assert_eq!(decoded.data, expected);
}

#[test]
fn test_unknown_codec_in_format() {
    let message = CompressedImage::new("bgr8; webp compressed bgr8", vec![1, 2, 3]);
    assert!(matches!(
        color::decode(&message, &DecodeConfig::default()),
        Err(DecodeError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_garbage_payload_is_backend_failure() {
    let message = CompressedImage::new("mono8; png compressed ", vec![0; 64]);
    assert!(matches!(
        color::decode(&message, &DecodeConfig::default()),
        Err(DecodeError::BackendFailure { codec: "png", .. })
    ));
}
