//! Demonstration of logging while compressing frames
//!
//! Encodes and decodes a synthetic depth frame with both back ends and a
//! color frame with every color codec, with the crate's tracing output shown.
//!
//! # Running with different log levels
//!
//! ```bash
//! # Per-frame internals (quantization, RVL runs, back-end calls)
//! RUST_LOG=trace cargo run --example logging
//!
//! # Compression results only
//! RUST_LOG=compressed_image_transport=debug cargo run --example logging
//!
//! # Depth codec only
//! RUST_LOG=compressed_image_transport::depth=trace cargo run --example logging
//! ```

use compressed_image_transport::color;
use compressed_image_transport::compression::{CompressionStats, CompressionType};
use compressed_image_transport::config::{
    ColorConfig, ColorFormat, DecodeConfig, DepthConfig, DepthFormat, DEPTH_TRANSPORT,
};
use compressed_image_transport::depth;
use compressed_image_transport::frame::{Image, PixelEncoding};
use compressed_image_transport::parameters::{ParameterMap, ParameterValue};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_target(true)
        .with_line_number(true)
        .init();

    info!("=== Compressed Image Transport Logging Demo ===");

    let (width, height) = (320u32, 240u32);
    let meters: Vec<f32> = (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            if x < 16 {
                0.0
            } else {
                0.7 + y as f32 * 0.01 + x as f32 * 0.002
            }
        })
        .collect();
    let depth_image = Image::from_depth_meters(width, height, &meters);

    // settings as a host would store them, including one deprecated key
    let mut params = ParameterMap::new();
    params.set("camera.depth.compressedDepth.depth_max", ParameterValue::Double(6.0));
    params.set(".camera.depth.compressedDepth.png_level", ParameterValue::Integer(9));
    let scope = params.scope("/camera/depth", DEPTH_TRANSPORT);
    let base = DepthConfig::from_parameters(&scope)?;

    for format in [DepthFormat::Png, DepthFormat::Rvl] {
        let config = DepthConfig { format, ..base };
        let compressed = depth::encode(&depth_image, &config)?;
        info!(
            format = %compressed.format,
            size = compressed.data.len(),
            "Depth frame compressed"
        );

        let decoded = depth::decode(&compressed.data)?;
        info!(width = decoded.width, height = decoded.height, "Depth frame restored");
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            rgb.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 128]);
        }
    }
    let color_image = Image::new(PixelEncoding::Rgb8, width, height, rgb)?;

    for format in [ColorFormat::Jpeg, ColorFormat::Png, ColorFormat::Tiff] {
        let config = ColorConfig {
            format,
            ..ColorConfig::default()
        };
        let compressed = color::encode(&color_image, &config)?;
        let stats = CompressionStats::calculate(
            color_image.data.len(),
            compressed.data.len(),
            CompressionType::from(format),
        );
        info!(
            format = %compressed.format,
            ratio = format!("{:.1}%", stats.ratio_percent()),
            "Color frame compressed"
        );

        let decoded = color::decode(&compressed, &DecodeConfig::default())?;
        info!(encoding = %decoded.encoding, "Color frame restored");
    }

    let bad = DepthConfig {
        depth_max: 500.0,
        ..DepthConfig::default()
    };
    if let Err(e) = depth::encode(&depth_image, &bad) {
        warn!("Frame dropped: {}", e);
    }

    info!("=== Demo Complete ===");
    Ok(())
}
