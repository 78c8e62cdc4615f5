//! Pixel encodings
//!
//! Mirrors the image encoding names used by ROS `sensor_msgs/Image`: named
//! mono/color/Bayer encodings plus the generic `<bits><U|S|F>C<n>` family
//! (`16UC1`, `32FC1`, ...).

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when an encoding string is not a known pixel encoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown pixel encoding '{0}'")]
pub struct UnknownEncoding(pub String);

/// Scalar type of a single channel sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    U8,
    S8,
    U16,
    S16,
    S32,
    F32,
    F64,
}

impl SampleType {
    /// Size of one sample in bytes
    pub fn size(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::S8 => 1,
            SampleType::U16 | SampleType::S16 => 2,
            SampleType::S32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    /// Size of one sample in bits
    pub fn bits(&self) -> u8 {
        (self.size() * 8) as u8
    }

    fn code(&self) -> &'static str {
        match self {
            SampleType::U8 => "8U",
            SampleType::S8 => "8S",
            SampleType::U16 => "16U",
            SampleType::S16 => "16S",
            SampleType::S32 => "32S",
            SampleType::F32 => "32F",
            SampleType::F64 => "64F",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "8U" => Some(SampleType::U8),
            "8S" => Some(SampleType::S8),
            "16U" => Some(SampleType::U16),
            "16S" => Some(SampleType::S16),
            "32S" => Some(SampleType::S32),
            "32F" => Some(SampleType::F32),
            "64F" => Some(SampleType::F64),
            _ => None,
        }
    }
}

/// Color filter array layout of a Bayer mosaic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BayerPattern {
    Rggb,
    Bggr,
    Gbrg,
    Grbg,
}

impl BayerPattern {
    fn name(&self) -> &'static str {
        match self {
            BayerPattern::Rggb => "rggb",
            BayerPattern::Bggr => "bggr",
            BayerPattern::Gbrg => "gbrg",
            BayerPattern::Grbg => "grbg",
        }
    }

    /// Offsets `(dx, dy)` of the red and blue sites inside a 2x2 cell
    pub(crate) fn red_blue_sites(&self) -> ((usize, usize), (usize, usize)) {
        match self {
            BayerPattern::Rggb => ((0, 0), (1, 1)),
            BayerPattern::Bggr => ((1, 1), (0, 0)),
            BayerPattern::Gbrg => ((0, 1), (1, 0)),
            BayerPattern::Grbg => ((1, 0), (0, 1)),
        }
    }
}

/// Channel order of a color encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// Pixel encoding of an uncompressed image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelEncoding {
    Mono8,
    Mono16,
    Rgb8,
    Bgr8,
    Rgba8,
    Bgra8,
    Rgb16,
    Bgr16,
    Rgba16,
    Bgra16,
    Bayer8(BayerPattern),
    Bayer16(BayerPattern),
    /// Generic `<bits><U|S|F>C<channels>` encoding
    Generic { sample: SampleType, channels: u8 },
}

impl PixelEncoding {
    /// 32-bit float depth in meters
    pub const DEPTH_METERS: PixelEncoding = PixelEncoding::Generic {
        sample: SampleType::F32,
        channels: 1,
    };

    /// 16-bit unsigned depth in millimeters
    pub const DEPTH_MILLIMETERS: PixelEncoding = PixelEncoding::Generic {
        sample: SampleType::U16,
        channels: 1,
    };

    /// Scalar type of each channel
    pub fn sample_type(&self) -> SampleType {
        match self {
            PixelEncoding::Mono8
            | PixelEncoding::Rgb8
            | PixelEncoding::Bgr8
            | PixelEncoding::Rgba8
            | PixelEncoding::Bgra8
            | PixelEncoding::Bayer8(_) => SampleType::U8,
            PixelEncoding::Mono16
            | PixelEncoding::Rgb16
            | PixelEncoding::Bgr16
            | PixelEncoding::Rgba16
            | PixelEncoding::Bgra16
            | PixelEncoding::Bayer16(_) => SampleType::U16,
            PixelEncoding::Generic { sample, .. } => *sample,
        }
    }

    /// Bits per channel sample
    pub fn bit_depth(&self) -> u8 {
        self.sample_type().bits()
    }

    /// Number of channels per pixel
    pub fn channels(&self) -> u8 {
        match self {
            PixelEncoding::Mono8
            | PixelEncoding::Mono16
            | PixelEncoding::Bayer8(_)
            | PixelEncoding::Bayer16(_) => 1,
            PixelEncoding::Rgb8
            | PixelEncoding::Bgr8
            | PixelEncoding::Rgb16
            | PixelEncoding::Bgr16 => 3,
            PixelEncoding::Rgba8
            | PixelEncoding::Bgra8
            | PixelEncoding::Rgba16
            | PixelEncoding::Bgra16 => 4,
            PixelEncoding::Generic { channels, .. } => *channels,
        }
    }

    /// Bytes occupied by one pixel
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels() as usize * self.sample_type().size()
    }

    /// True for the named RGB/BGR(A) encodings
    pub fn is_color(&self) -> bool {
        self.channel_order().is_some()
    }

    /// True for `mono8` and `mono16`
    pub fn is_mono(&self) -> bool {
        matches!(self, PixelEncoding::Mono8 | PixelEncoding::Mono16)
    }

    pub fn is_bayer(&self) -> bool {
        matches!(self, PixelEncoding::Bayer8(_) | PixelEncoding::Bayer16(_))
    }

    pub fn has_alpha(&self) -> bool {
        matches!(
            self,
            PixelEncoding::Rgba8
                | PixelEncoding::Bgra8
                | PixelEncoding::Rgba16
                | PixelEncoding::Bgra16
        )
    }

    /// Channel order for color encodings, `None` otherwise
    pub fn channel_order(&self) -> Option<ChannelOrder> {
        match self {
            PixelEncoding::Rgb8
            | PixelEncoding::Rgba8
            | PixelEncoding::Rgb16
            | PixelEncoding::Rgba16 => Some(ChannelOrder::Rgb),
            PixelEncoding::Bgr8
            | PixelEncoding::Bgra8
            | PixelEncoding::Bgr16
            | PixelEncoding::Bgra16 => Some(ChannelOrder::Bgr),
            _ => None,
        }
    }

    /// Bayer pattern for mosaic encodings, `None` otherwise
    pub fn bayer_pattern(&self) -> Option<BayerPattern> {
        match self {
            PixelEncoding::Bayer8(p) | PixelEncoding::Bayer16(p) => Some(*p),
            _ => None,
        }
    }

    /// Named color encoding for the given order, alpha and depth
    pub fn color(order: ChannelOrder, alpha: bool, bits: u8) -> Option<Self> {
        let encoding = match (order, alpha, bits) {
            (ChannelOrder::Rgb, false, 8) => PixelEncoding::Rgb8,
            (ChannelOrder::Bgr, false, 8) => PixelEncoding::Bgr8,
            (ChannelOrder::Rgb, true, 8) => PixelEncoding::Rgba8,
            (ChannelOrder::Bgr, true, 8) => PixelEncoding::Bgra8,
            (ChannelOrder::Rgb, false, 16) => PixelEncoding::Rgb16,
            (ChannelOrder::Bgr, false, 16) => PixelEncoding::Bgr16,
            (ChannelOrder::Rgb, true, 16) => PixelEncoding::Rgba16,
            (ChannelOrder::Bgr, true, 16) => PixelEncoding::Bgra16,
            _ => return None,
        };
        Some(encoding)
    }
}

impl fmt::Display for PixelEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelEncoding::Mono8 => f.write_str("mono8"),
            PixelEncoding::Mono16 => f.write_str("mono16"),
            PixelEncoding::Rgb8 => f.write_str("rgb8"),
            PixelEncoding::Bgr8 => f.write_str("bgr8"),
            PixelEncoding::Rgba8 => f.write_str("rgba8"),
            PixelEncoding::Bgra8 => f.write_str("bgra8"),
            PixelEncoding::Rgb16 => f.write_str("rgb16"),
            PixelEncoding::Bgr16 => f.write_str("bgr16"),
            PixelEncoding::Rgba16 => f.write_str("rgba16"),
            PixelEncoding::Bgra16 => f.write_str("bgra16"),
            PixelEncoding::Bayer8(p) => write!(f, "bayer_{}8", p.name()),
            PixelEncoding::Bayer16(p) => write!(f, "bayer_{}16", p.name()),
            PixelEncoding::Generic { sample, channels } => {
                write!(f, "{}C{}", sample.code(), channels)
            }
        }
    }
}

impl FromStr for PixelEncoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoding = match s {
            "mono8" => PixelEncoding::Mono8,
            "mono16" => PixelEncoding::Mono16,
            "rgb8" => PixelEncoding::Rgb8,
            "bgr8" => PixelEncoding::Bgr8,
            "rgba8" => PixelEncoding::Rgba8,
            "bgra8" => PixelEncoding::Bgra8,
            "rgb16" => PixelEncoding::Rgb16,
            "bgr16" => PixelEncoding::Bgr16,
            "rgba16" => PixelEncoding::Rgba16,
            "bgra16" => PixelEncoding::Bgra16,
            _ => {
                if let Some(rest) = s.strip_prefix("bayer_") {
                    return parse_bayer(rest).ok_or_else(|| UnknownEncoding(s.to_string()));
                }
                return parse_generic(s).ok_or_else(|| UnknownEncoding(s.to_string()));
            }
        };
        Ok(encoding)
    }
}

fn parse_bayer(rest: &str) -> Option<PixelEncoding> {
    if rest.len() < 5 {
        return None;
    }
    let (pattern, bits) = rest.split_at(4);
    let pattern = match pattern {
        "rggb" => BayerPattern::Rggb,
        "bggr" => BayerPattern::Bggr,
        "gbrg" => BayerPattern::Gbrg,
        "grbg" => BayerPattern::Grbg,
        _ => return None,
    };
    match bits {
        "8" => Some(PixelEncoding::Bayer8(pattern)),
        "16" => Some(PixelEncoding::Bayer16(pattern)),
        _ => None,
    }
}

fn parse_generic(s: &str) -> Option<PixelEncoding> {
    let (code, channels) = s.split_once('C')?;
    let sample = SampleType::from_code(code)?;
    let channels: u8 = channels.parse().ok()?;
    if !(1..=4).contains(&channels) {
        return None;
    }
    Some(PixelEncoding::Generic { sample, channels })
}
