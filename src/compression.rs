//! General-purpose image compression back ends
//!
//! Wraps the PNG, JPEG and TIFF codecs that the depth and color transports
//! delegate to. Rasters handed to [`compress`] keep color in BGR(A) order;
//! the back ends swap to RGB(A) at the file boundary and [`decompress`] swaps
//! back, so a BGR raster survives a lossless round trip byte for byte.
//!
//! # Supported Back Ends
//!
//! - **PNG**: lossless, 8/16-bit, 1/3/4 channels, level 0-9
//! - **JPEG**: lossy, 8-bit, 1/3 channels, quality 1-100
//! - **TIFF**: lossless, 8/16/32-bit, 1/3/4 channels, optional resolution tags

use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::frame::raster::Raster;
use crate::frame::SampleType;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType as PngCompression, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use std::io::Cursor;
use tiff::decoder::{Decoder as TiffDecoder, DecodingResult};
use tiff::encoder::{colortype, Rational, TiffEncoder, TiffValue};
use tiff::tags::ResolutionUnit;
use tracing::{debug, trace};

/// Compression back end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    Png,
    Jpeg,
    Tiff,
}

impl CompressionType {
    /// Get the back-end name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Tiff => "tiff",
        }
    }

    /// Whether a decode reproduces the input exactly
    pub fn is_lossless(&self) -> bool {
        !matches!(self, Self::Jpeg)
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Tiff => ImageFormat::Tiff,
        }
    }

    /// Identify the back end from the payload's magic bytes
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }
}

/// PNG compression level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Fast compression, lower ratio (levels 0-2)
    Fast,
    /// Default compression (levels 3-6)
    Default,
    /// Best compression, slower (levels 7-9)
    Best,
}

impl CompressionLevel {
    /// Map a zlib-style `0..=9` level onto the encoder presets
    pub fn from_png_level(level: u8) -> Self {
        match level {
            0..=2 => Self::Fast,
            3..=6 => Self::Default,
            _ => Self::Best,
        }
    }

    fn to_png(self) -> PngCompression {
        match self {
            Self::Fast => PngCompression::Fast,
            Self::Default => PngCompression::Default,
            Self::Best => PngCompression::Best,
        }
    }

    /// Get a representative numeric level
    pub fn level(&self) -> u8 {
        match self {
            Self::Fast => 1,
            Self::Default => 6,
            Self::Best => 9,
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::Default
    }
}

/// TIFF resolution metadata
///
/// Descriptive only; decoders ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffResolution {
    pub unit: ResolutionUnit,
    pub xdpi: u32,
    pub ydpi: u32,
}

/// Back-end specific settings for [`compress`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionParams {
    pub png_level: CompressionLevel,
    pub jpeg_quality: u8,
    pub tiff_resolution: Option<TiffResolution>,
}

impl Default for CompressionParams {
    fn default() -> Self {
        CompressionParams {
            png_level: CompressionLevel::Default,
            jpeg_quality: 95,
            tiff_resolution: None,
        }
    }
}

/// Compress a raster with the given back end
pub(crate) fn compress(
    raster: &Raster,
    compression_type: CompressionType,
    params: &CompressionParams,
) -> EncodeResult<Vec<u8>> {
    trace!(
        compression_type = compression_type.name(),
        width = raster.width,
        height = raster.height,
        channels = raster.channels,
        input_size = raster.data.len(),
        "Starting compression"
    );

    let compressed = match compression_type {
        CompressionType::Png => compress_png(raster, params.png_level),
        CompressionType::Jpeg => compress_jpeg(raster, params.jpeg_quality),
        CompressionType::Tiff => compress_tiff(raster, params.tiff_resolution),
    }?;

    let stats = CompressionStats::calculate(raster.data.len(), compressed.len(), compression_type);
    debug!(
        compression_type = compression_type.name(),
        lossless = compression_type.is_lossless(),
        compressed_size = compressed.len(),
        "Compression ratio 1:{:.2} ({} bytes)",
        stats.inverse_ratio(),
        compressed.len()
    );

    Ok(compressed)
}

/// Decompress a payload produced by one of the back ends
pub(crate) fn decompress(data: &[u8], compression_type: CompressionType) -> DecodeResult<Raster> {
    trace!(
        compression_type = compression_type.name(),
        compressed_size = data.len(),
        "Starting decompression"
    );

    let raster = match compression_type {
        CompressionType::Png | CompressionType::Jpeg => decompress_image(data, compression_type),
        CompressionType::Tiff => decompress_tiff(data),
    }?;

    debug!(
        compression_type = compression_type.name(),
        width = raster.width,
        height = raster.height,
        channels = raster.channels,
        decompressed_size = raster.data.len(),
        "Decompression completed"
    );

    Ok(raster)
}

fn encode_failure(compression_type: CompressionType, e: impl std::fmt::Display) -> EncodeError {
    EncodeError::BackendFailure {
        codec: compression_type.name(),
        message: e.to_string(),
    }
}

fn decode_failure(compression_type: CompressionType, e: impl std::fmt::Display) -> DecodeError {
    DecodeError::BackendFailure {
        codec: compression_type.name(),
        message: e.to_string(),
    }
}

fn unsupported_layout(compression_type: CompressionType, raster: &Raster) -> EncodeError {
    EncodeError::UnsupportedEncoding(format!(
        "{} cannot store {} channel(s) of {}-bit samples",
        compression_type.name(),
        raster.channels,
        raster.sample.bits()
    ))
}

/// Raster bytes with color swapped into file (RGB) order
fn file_order(raster: &Raster) -> Vec<u8> {
    if raster.channels >= 3 {
        let mut swapped = raster.clone();
        swapped.swap_red_blue();
        swapped.data
    } else {
        raster.data.clone()
    }
}

/// Little-endian 16-bit bytes re-laid in native endianness
fn native_u16(bytes: &[u8]) -> Vec<u8> {
    bytes
        .chunks_exact(2)
        .flat_map(|c| u16::from_le_bytes([c[0], c[1]]).to_ne_bytes())
        .collect()
}

fn compress_png(raster: &Raster, level: CompressionLevel) -> EncodeResult<Vec<u8>> {
    let color_type = match (raster.sample, raster.channels) {
        (SampleType::U8, 1) => ExtendedColorType::L8,
        (SampleType::U8, 3) => ExtendedColorType::Rgb8,
        (SampleType::U8, 4) => ExtendedColorType::Rgba8,
        (SampleType::U16, 1) => ExtendedColorType::L16,
        (SampleType::U16, 3) => ExtendedColorType::Rgb16,
        (SampleType::U16, 4) => ExtendedColorType::Rgba16,
        _ => return Err(unsupported_layout(CompressionType::Png, raster)),
    };

    let mut samples = file_order(raster);
    if raster.sample == SampleType::U16 {
        samples = native_u16(&samples);
    }

    trace!(level = level.level(), preset = ?level, "Encoding png");
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buffer, level.to_png(), FilterType::Adaptive);
    encoder
        .write_image(&samples, raster.width, raster.height, color_type)
        .map_err(|e| encode_failure(CompressionType::Png, e))?;

    Ok(buffer)
}

fn compress_jpeg(raster: &Raster, quality: u8) -> EncodeResult<Vec<u8>> {
    let color_type = match (raster.sample, raster.channels) {
        (SampleType::U8, 1) => ExtendedColorType::L8,
        (SampleType::U8, 3) => ExtendedColorType::Rgb8,
        _ => return Err(unsupported_layout(CompressionType::Jpeg, raster)),
    };

    let samples = file_order(raster);
    let mut buffer = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        encoder
            .encode(&samples, raster.width, raster.height, color_type)
            .map_err(|e| encode_failure(CompressionType::Jpeg, e))?;
    }

    Ok(buffer)
}

fn write_tiff<C>(
    buffer: &mut Vec<u8>,
    width: u32,
    height: u32,
    samples: &[C::Inner],
    resolution: Option<TiffResolution>,
) -> tiff::TiffResult<()>
where
    C: colortype::ColorType,
    [C::Inner]: TiffValue,
{
    let mut encoder = TiffEncoder::new(Cursor::new(buffer))?;
    let mut image = encoder.new_image::<C>(width, height)?;
    if let Some(res) = resolution {
        image.resolution_unit(res.unit);
        image.x_resolution(Rational { n: res.xdpi, d: 1 });
        image.y_resolution(Rational { n: res.ydpi, d: 1 });
    }
    image.write_data(samples)
}

fn compress_tiff(raster: &Raster, resolution: Option<TiffResolution>) -> EncodeResult<Vec<u8>> {
    let bytes = file_order(raster);
    let (w, h) = (raster.width, raster.height);
    let mut buffer = Vec::new();

    // Signed samples are stored as unsigned words of the same width; the
    // source encoding recorded in the format tag restores the interpretation.
    let result = match (raster.sample.size(), raster.sample, raster.channels) {
        (1, _, 1) => write_tiff::<colortype::Gray8>(&mut buffer, w, h, &bytes, resolution),
        (1, _, 3) => write_tiff::<colortype::RGB8>(&mut buffer, w, h, &bytes, resolution),
        (1, _, 4) => write_tiff::<colortype::RGBA8>(&mut buffer, w, h, &bytes, resolution),
        (2, _, channels) => {
            let words: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect();
            match channels {
                1 => write_tiff::<colortype::Gray16>(&mut buffer, w, h, &words, resolution),
                3 => write_tiff::<colortype::RGB16>(&mut buffer, w, h, &words, resolution),
                4 => write_tiff::<colortype::RGBA16>(&mut buffer, w, h, &words, resolution),
                _ => return Err(unsupported_layout(CompressionType::Tiff, raster)),
            }
        }
        (4, SampleType::F32, channels) => {
            let floats: Vec<f32> = bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();
            match channels {
                1 => write_tiff::<colortype::Gray32Float>(&mut buffer, w, h, &floats, resolution),
                3 => write_tiff::<colortype::RGB32Float>(&mut buffer, w, h, &floats, resolution),
                4 => write_tiff::<colortype::RGBA32Float>(&mut buffer, w, h, &floats, resolution),
                _ => return Err(unsupported_layout(CompressionType::Tiff, raster)),
            }
        }
        (4, _, channels) => {
            let words: Vec<u32> = bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();
            match channels {
                1 => write_tiff::<colortype::Gray32>(&mut buffer, w, h, &words, resolution),
                3 => write_tiff::<colortype::RGB32>(&mut buffer, w, h, &words, resolution),
                4 => write_tiff::<colortype::RGBA32>(&mut buffer, w, h, &words, resolution),
                _ => return Err(unsupported_layout(CompressionType::Tiff, raster)),
            }
        }
        _ => return Err(unsupported_layout(CompressionType::Tiff, raster)),
    };
    result.map_err(|e| encode_failure(CompressionType::Tiff, e))?;

    Ok(buffer)
}

fn decompress_image(data: &[u8], compression_type: CompressionType) -> DecodeResult<Raster> {
    let decoded = image::load_from_memory_with_format(data, compression_type.image_format())
        .map_err(|e| decode_failure(compression_type, e))?;

    let (width, height) = (decoded.width(), decoded.height());
    let (channels, sample, data) = match decoded {
        DynamicImage::ImageLuma8(buf) => (1, SampleType::U8, buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => (2, SampleType::U8, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (3, SampleType::U8, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (4, SampleType::U8, buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => (1, SampleType::U16, le_bytes_u16(buf.as_raw())),
        DynamicImage::ImageLumaA16(buf) => (2, SampleType::U16, le_bytes_u16(buf.as_raw())),
        DynamicImage::ImageRgb16(buf) => (3, SampleType::U16, le_bytes_u16(buf.as_raw())),
        DynamicImage::ImageRgba16(buf) => (4, SampleType::U16, le_bytes_u16(buf.as_raw())),
        DynamicImage::ImageRgb32F(buf) => (3, SampleType::F32, le_bytes_f32(buf.as_raw())),
        DynamicImage::ImageRgba32F(buf) => (4, SampleType::F32, le_bytes_f32(buf.as_raw())),
        other => {
            return Err(DecodeError::UnsupportedEncoding(format!(
                "{} payload decoded to unsupported color type {:?}",
                compression_type.name(),
                other.color()
            )))
        }
    };

    let mut raster = Raster {
        width,
        height,
        channels,
        sample,
        data,
    };
    raster.swap_red_blue();
    Ok(raster)
}

fn decompress_tiff(data: &[u8]) -> DecodeResult<Raster> {
    let failure = |e: tiff::TiffError| decode_failure(CompressionType::Tiff, e);

    let mut decoder = TiffDecoder::new(Cursor::new(data)).map_err(failure)?;
    let (width, height) = decoder.dimensions().map_err(failure)?;
    let channels = match decoder.colortype().map_err(failure)? {
        tiff::ColorType::Gray(_) => 1,
        tiff::ColorType::GrayA(_) => 2,
        tiff::ColorType::RGB(_) => 3,
        tiff::ColorType::RGBA(_) => 4,
        other => {
            return Err(DecodeError::UnsupportedEncoding(format!(
                "tiff color type {:?}",
                other
            )))
        }
    };

    let (sample, data) = match decoder.read_image().map_err(failure)? {
        DecodingResult::U8(v) => (SampleType::U8, v),
        DecodingResult::U16(v) => (SampleType::U16, le_bytes_u16(&v)),
        DecodingResult::U32(v) => (SampleType::S32, v.iter().flat_map(|s| s.to_le_bytes()).collect()),
        DecodingResult::F32(v) => (SampleType::F32, le_bytes_f32(&v)),
        DecodingResult::F64(v) => (SampleType::F64, v.iter().flat_map(|s| s.to_le_bytes()).collect()),
        DecodingResult::I8(v) => (SampleType::S8, v.iter().map(|&s| s as u8).collect()),
        DecodingResult::I16(v) => (SampleType::S16, v.iter().flat_map(|s| s.to_le_bytes()).collect()),
        DecodingResult::I32(v) => (SampleType::S32, v.iter().flat_map(|s| s.to_le_bytes()).collect()),
        _ => {
            return Err(DecodeError::UnsupportedEncoding(
                "tiff sample format".to_string(),
            ))
        }
    };

    let mut raster = Raster {
        width,
        height,
        channels,
        sample,
        data,
    };
    raster.swap_red_blue();
    Ok(raster)
}

fn le_bytes_u16(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

fn le_bytes_f32(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Compression statistics
#[derive(Debug, Clone)]
pub struct CompressionStats {
    /// Original data size
    pub original_size: usize,
    /// Compressed data size
    pub compressed_size: usize,
    /// Compression ratio (compressed/original)
    pub ratio: f64,
    /// Space saved in bytes
    pub space_saved: usize,
    /// Back end used
    pub compression_type: CompressionType,
}

impl CompressionStats {
    /// Calculate statistics for a compression operation
    pub fn calculate(
        original_size: usize,
        compressed_size: usize,
        compression_type: CompressionType,
    ) -> Self {
        let ratio = if original_size > 0 {
            compressed_size as f64 / original_size as f64
        } else {
            0.0
        };

        let space_saved = original_size.saturating_sub(compressed_size);

        Self {
            original_size,
            compressed_size,
            ratio,
            space_saved,
            compression_type,
        }
    }

    /// Original bytes per compressed byte (the `N` in `1:N`)
    pub fn inverse_ratio(&self) -> f64 {
        if self.compressed_size > 0 {
            self.original_size as f64 / self.compressed_size as f64
        } else {
            0.0
        }
    }

    /// Get compression ratio as percentage
    pub fn ratio_percent(&self) -> f64 {
        self.ratio * 100.0
    }

    /// Get space saved as percentage
    pub fn space_saved_percent(&self) -> f64 {
        if self.original_size > 0 {
            (self.space_saved as f64 / self.original_size as f64) * 100.0
        } else {
            0.0
        }
    }
}
