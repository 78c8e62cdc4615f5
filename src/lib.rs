//! Compressed image transport codecs in Rust
//!
//! This library compresses depth images and color/mono images into compact
//! byte payloads for transmission, and reconstructs them on the receiving end.
//! It is the codec core of an image transport: the host framework delivers
//! frames and configuration, this crate turns them into payloads and back.
//!
//! # Features
//!
//! - **Depth compression** - Inverse-depth quantization to 16 bits, then PNG or RVL
//! - **Self-describing payloads** - Depth payloads carry their own quantization coefficients
//! - **Color/mono compression** - JPEG, PNG and TIFF with reversible channel transforms
//! - **Wire compatible** - Same format fields as the established compressed transports
//! - **Stateless** - Every call takes an explicit configuration snapshot
//!
//! # Quick Start
//!
//! ## Depth Images
//!
//! ```
//! use compressed_image_transport::config::{DepthConfig, DepthFormat};
//! use compressed_image_transport::depth;
//! use compressed_image_transport::frame::Image;
//!
//! let image = Image::from_depth_meters(4, 1, &[1.0, 2.0, 0.0, f32::NAN]);
//! let config = DepthConfig {
//!     format: DepthFormat::Rvl,
//!     ..DepthConfig::default()
//! };
//!
//! let compressed = depth::encode(&image, &config)?;
//! let decoded = depth::decode(&compressed.data)?;
//! assert_eq!(decoded.width, 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Color Images
//!
//! ```
//! use compressed_image_transport::color;
//! use compressed_image_transport::config::{ColorConfig, ColorFormat, DecodeConfig};
//! use compressed_image_transport::frame::{Image, PixelEncoding};
//!
//! let image = Image::new(PixelEncoding::Rgba16, 2, 1, vec![0u8; 16])?;
//! let config = ColorConfig {
//!     format: ColorFormat::Png,
//!     ..ColorConfig::default()
//! };
//!
//! let compressed = color::encode(&image, &config)?;
//! assert_eq!(compressed.format, "rgba16; png compressed bgra16");
//!
//! let decoded = color::decode(&compressed, &DecodeConfig::default())?;
//! assert_eq!(decoded, image);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! ## Module Structure
//!
//! - **`depth`** - Depth codec
//!   - `quantization` - Inverse-depth mapping between meters and 16-bit values
//!   - `rvl` - Run-length/varint codec for 16-bit rasters
//!   - `header` - 28-byte payload header
//!
//! - **`color`** - Color/mono codec
//!   - `format` - Parsing and writing the `"<src>; <codec> compressed <layout>"` field
//!
//! - **`compression`** - PNG, JPEG and TIFF back ends
//!
//! - **`frame`** - `Image`, `CompressedImage` and pixel encodings
//!
//! - **`config`** / **`parameters`** - Configuration values and the host
//!   parameter store adapter
//!
//! - **`error`** - `EncodeError`, `DecodeError` and `ConfigError`
//!
//! # Logging
//!
//! The crate emits [`tracing`] events: `trace` for per-frame internals,
//! `debug` for compression results and `warn` for deprecated or unknown
//! parameters. Install any subscriber to see them; the `logging` demo shows a
//! `tracing_subscriber` setup driven by `RUST_LOG`.

pub mod color;
pub mod compression;
pub mod config;
pub mod depth;
pub mod error;
pub mod frame;
pub mod parameters;

// Re-export commonly used types
pub use config::{ColorConfig, ColorFormat, DecodeConfig, DecodeMode, DepthConfig, DepthFormat};
pub use error::{ConfigError, DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use frame::{CompressedImage, Image, PixelEncoding};
