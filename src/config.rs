//! Codec configuration
//!
//! Configuration is a plain value: the host snapshots it once per frame and
//! passes it to `encode`/`decode` by reference. Codecs never read live
//! parameters, so a configuration change never affects a frame already in
//! flight.
//!
//! All types deserialize with `serde`, using the same names and defaults as
//! the transport parameters:
//!
//! ```
//! use compressed_image_transport::config::{DepthConfig, DepthFormat};
//!
//! let config: DepthConfig = serde_json::from_str(r#"{"format": "rvl"}"#).unwrap();
//! assert_eq!(config.format, DepthFormat::Rvl);
//! assert_eq!(config.depth_max, 10.0);
//! ```

use crate::compression::{CompressionLevel, CompressionParams, TiffResolution};
use crate::error::{ConfigError, EncodeError};
use crate::parameters::ParameterScope;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Transport name of the depth codec, used to scope its parameters
pub const DEPTH_TRANSPORT: &str = "compressedDepth";

/// Transport name of the color codec, used to scope its parameters
pub const COLOR_TRANSPORT: &str = "compressed";

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Depth compression back end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthFormat {
    /// Inverse-depth quantization followed by 16-bit PNG
    #[default]
    Png,
    /// Inverse-depth quantization followed by RVL
    Rvl,
}

impl DepthFormat {
    pub fn name(&self) -> &'static str {
        match self {
            DepthFormat::Png => "png",
            DepthFormat::Rvl => "rvl",
        }
    }
}

impl fmt::Display for DepthFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DepthFormat {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" => Ok(DepthFormat::Png),
            "rvl" => Ok(DepthFormat::Rvl),
            other => Err(EncodeError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Color/mono compression back end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorFormat {
    #[default]
    Jpeg,
    Png,
    Tiff,
}

impl ColorFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ColorFormat::Jpeg => "jpeg",
            ColorFormat::Png => "png",
            ColorFormat::Tiff => "tiff",
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorFormat {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpeg" => Ok(ColorFormat::Jpeg),
            "png" => Ok(ColorFormat::Png),
            "tiff" => Ok(ColorFormat::Tiff),
            other => Err(EncodeError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Settings for the depth codec
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    /// Compression back end (`png` or `rvl`)
    pub format: DepthFormat,
    /// Maximum depth value in meters (1-100)
    pub depth_max: f64,
    /// Depth value at which the sensor accuracy is 1 m (1-150)
    pub depth_quantization: f64,
    /// PNG compression level (0-9)
    pub png_level: u8,
}

impl Default for DepthConfig {
    fn default() -> Self {
        DepthConfig {
            format: DepthFormat::Png,
            depth_max: 10.0,
            depth_quantization: 100.0,
            png_level: 3,
        }
    }
}

impl DepthConfig {
    /// Check every field against its declared range
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("depth_max", self.depth_max, 1.0, 100.0)?;
        check_range("depth_quantization", self.depth_quantization, 1.0, 150.0)?;
        check_range("png_level", self.png_level as f64, 0.0, 9.0)?;
        Ok(())
    }

    /// Read a snapshot from host parameters, falling back to defaults
    ///
    /// # Examples
    ///
    /// ```
    /// use compressed_image_transport::config::{DepthConfig, DepthFormat, DEPTH_TRANSPORT};
    /// use compressed_image_transport::parameters::{ParameterMap, ParameterValue};
    ///
    /// let mut params = ParameterMap::new();
    /// params.set("camera.depth.compressedDepth.format", ParameterValue::from("rvl"));
    ///
    /// let scope = params.scope("/camera/depth", DEPTH_TRANSPORT);
    /// let config = DepthConfig::from_parameters(&scope).unwrap();
    /// assert_eq!(config.format, DepthFormat::Rvl);
    /// ```
    pub fn from_parameters(scope: &ParameterScope<'_>) -> Result<Self, ConfigError> {
        let defaults = DepthConfig::default();
        let format = match scope.get_string("format")? {
            Some(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
                name: "format",
                value: s.to_string(),
            })?,
            None => defaults.format,
        };
        let png_level = scope.get_integer("png_level")?.unwrap_or(defaults.png_level as i64);
        check_range("png_level", png_level as f64, 0.0, 9.0)?;

        let config = DepthConfig {
            format,
            depth_max: scope.get_double("depth_max")?.unwrap_or(defaults.depth_max),
            depth_quantization: scope
                .get_double("depth_quantization")?
                .unwrap_or(defaults.depth_quantization),
            png_level: png_level as u8,
        };
        config.validate()?;
        Ok(config)
    }
}

/// TIFF resolution unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiffResolutionUnit {
    None,
    #[default]
    Inch,
    Centimeter,
}

impl TiffResolutionUnit {
    /// Parse a unit name, falling back to `inch` for anything unknown
    pub fn parse_or_inch(s: &str) -> Self {
        match s {
            "none" => TiffResolutionUnit::None,
            "inch" => TiffResolutionUnit::Inch,
            "centimeter" => TiffResolutionUnit::Centimeter,
            other => {
                warn!(
                    "tiff.res_unit parameter should be either 'inch', 'centimeter' or 'none'; \
                     defaulting to 'inch'. Found '{}'",
                    other
                );
                TiffResolutionUnit::Inch
            }
        }
    }

    fn to_tiff(self) -> tiff::tags::ResolutionUnit {
        match self {
            TiffResolutionUnit::None => tiff::tags::ResolutionUnit::None,
            TiffResolutionUnit::Inch => tiff::tags::ResolutionUnit::Inch,
            TiffResolutionUnit::Centimeter => tiff::tags::ResolutionUnit::Centimeter,
        }
    }
}

/// TIFF metadata settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiffConfig {
    pub res_unit: TiffResolutionUnit,
    /// Horizontal resolution; values <= 0 leave the encoder default
    pub xdpi: i64,
    /// Vertical resolution; values <= 0 leave the encoder default
    pub ydpi: i64,
}

impl Default for TiffConfig {
    fn default() -> Self {
        TiffConfig {
            res_unit: TiffResolutionUnit::Inch,
            xdpi: -1,
            ydpi: -1,
        }
    }
}

impl TiffConfig {
    pub(crate) fn resolution(&self) -> Option<TiffResolution> {
        if self.xdpi <= 0 || self.ydpi <= 0 {
            return None;
        }
        Some(TiffResolution {
            unit: self.res_unit.to_tiff(),
            xdpi: u32::try_from(self.xdpi).unwrap_or(u32::MAX),
            ydpi: u32::try_from(self.ydpi).unwrap_or(u32::MAX),
        })
    }
}

/// Settings for the color/mono codec
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Compression back end (`jpeg`, `png` or `tiff`)
    pub format: ColorFormat,
    /// PNG compression level (0-9)
    pub png_level: u8,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Store Bayer mosaics as-is instead of converting them to mono
    pub jpeg_compress_bayer: bool,
    pub tiff: TiffConfig,
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            format: ColorFormat::Jpeg,
            png_level: 3,
            jpeg_quality: 95,
            jpeg_compress_bayer: false,
            tiff: TiffConfig::default(),
        }
    }
}

impl ColorConfig {
    /// Check every field against its declared range
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("png_level", self.png_level as f64, 0.0, 9.0)?;
        check_range("jpeg_quality", self.jpeg_quality as f64, 1.0, 100.0)?;
        Ok(())
    }

    pub(crate) fn compression_params(&self) -> CompressionParams {
        CompressionParams {
            png_level: CompressionLevel::from_png_level(self.png_level),
            jpeg_quality: self.jpeg_quality,
            tiff_resolution: self.tiff.resolution(),
        }
    }

    /// Read a snapshot from host parameters, falling back to defaults
    pub fn from_parameters(scope: &ParameterScope<'_>) -> Result<Self, ConfigError> {
        let defaults = ColorConfig::default();
        let format = match scope.get_string("format")? {
            Some(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
                name: "format",
                value: s.to_string(),
            })?,
            None => defaults.format,
        };

        let png_level = scope.get_integer("png_level")?.unwrap_or(defaults.png_level as i64);
        check_range("png_level", png_level as f64, 0.0, 9.0)?;
        let jpeg_quality = scope
            .get_integer("jpeg_quality")?
            .unwrap_or(defaults.jpeg_quality as i64);
        check_range("jpeg_quality", jpeg_quality as f64, 1.0, 100.0)?;

        let res_unit = scope
            .get_string("tiff.res_unit")?
            .map(TiffResolutionUnit::parse_or_inch)
            .unwrap_or(defaults.tiff.res_unit);

        Ok(ColorConfig {
            format,
            png_level: png_level as u8,
            jpeg_quality: jpeg_quality as u8,
            jpeg_compress_bayer: scope
                .get_bool("jpeg_compress_bayer")?
                .unwrap_or(defaults.jpeg_compress_bayer),
            tiff: TiffConfig {
                res_unit,
                xdpi: scope.get_integer("tiff.xdpi")?.unwrap_or(defaults.tiff.xdpi),
                ydpi: scope.get_integer("tiff.ydpi")?.unwrap_or(defaults.tiff.ydpi),
            },
        })
    }
}

/// Channel interpretation applied when decoding color/mono payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Keep the stored channel count and bit depth
    #[default]
    Unchanged,
    /// Force 8-bit single-channel output (`mono8`)
    Gray,
    /// Force 8-bit three-channel output (`bgr8`)
    Color,
}

impl FromStr for DecodeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unchanged" => Ok(DecodeMode::Unchanged),
            "gray" => Ok(DecodeMode::Gray),
            "color" => Ok(DecodeMode::Color),
            other => Err(ConfigError::InvalidValue {
                name: "mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Settings for the color/mono decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    pub mode: DecodeMode,
}

impl DecodeConfig {
    /// Read a snapshot from host parameters
    ///
    /// An unknown mode falls back to `unchanged` with a warning.
    pub fn from_parameters(scope: &ParameterScope<'_>) -> Result<Self, ConfigError> {
        let mode = match scope.get_string("mode")? {
            Some(s) => s.parse().unwrap_or_else(|_| {
                warn!("Unknown mode: {}, defaulting to 'unchanged'", s);
                DecodeMode::Unchanged
            }),
            None => DecodeMode::Unchanged,
        };
        Ok(DecodeConfig { mode })
    }
}
