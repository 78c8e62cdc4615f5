//! Color format field
//!
//! The format field of a compressed color message reads
//!
//! ```text
//! <source encoding>; <codec> compressed <stored layout>
//! ```
//!
//! e.g. `"rgba16; png compressed bgra16"` or `"32FC1; tiff compressed "`. The
//! stored layout is empty when the samples went to the codec untouched.
//! Messages from older publishers carry only the codec name (`"jpeg"`), with
//! no source encoding at all.

use crate::config::ColorFormat;
use crate::error::{DecodeError, DecodeResult};
use crate::frame::{ChannelOrder, PixelEncoding};
use std::fmt;
use std::str::FromStr;

/// Sample layout handed to the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredLayout {
    /// Color reordered to BGR(A), at the given bit depth
    Bgr { alpha: bool, bits: u8 },
    /// 8-bit single channel
    Mono8,
    /// Bayer mosaic kept as a single 8-bit plane
    Bayer(PixelEncoding),
    /// Source samples stored verbatim
    Unchanged,
}

impl StoredLayout {
    /// Channel order of the samples inside the container
    ///
    /// `None` means "same as the source".
    pub fn container_order(&self) -> Option<ChannelOrder> {
        match self {
            StoredLayout::Bgr { .. } => Some(ChannelOrder::Bgr),
            _ => None,
        }
    }

    fn parse(s: &str) -> DecodeResult<Self> {
        if s.is_empty() {
            return Ok(StoredLayout::Unchanged);
        }
        let encoding: PixelEncoding = s.parse()?;
        match encoding {
            PixelEncoding::Mono8 => Ok(StoredLayout::Mono8),
            e if e.is_bayer() => Ok(StoredLayout::Bayer(e)),
            e if e.channel_order() == Some(ChannelOrder::Bgr) => Ok(StoredLayout::Bgr {
                alpha: e.has_alpha(),
                bits: e.bit_depth(),
            }),
            other => Err(DecodeError::UnsupportedEncoding(format!(
                "stored layout {}",
                other
            ))),
        }
    }
}

impl fmt::Display for StoredLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredLayout::Bgr { alpha, bits } => {
                write!(f, "bgr{}{}", if *alpha { "a" } else { "" }, bits)
            }
            StoredLayout::Mono8 => f.write_str("mono8"),
            StoredLayout::Bayer(encoding) => write!(f, "{}", encoding),
            StoredLayout::Unchanged => Ok(()),
        }
    }
}

/// Parsed color format field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    /// Field without a `;`, written by older publishers
    Legacy,
    /// Field naming the source encoding, codec and stored layout
    Tagged {
        source: PixelEncoding,
        codec: ColorFormat,
        layout: StoredLayout,
    },
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatTag::Legacy => Ok(()),
            FormatTag::Tagged {
                source,
                codec,
                layout,
            } => write!(f, "{}; {} compressed {}", source, codec, layout),
        }
    }
}

impl FromStr for FormatTag {
    type Err = DecodeError;

    /// Parse a format field
    ///
    /// # Examples
    ///
    /// ```
    /// use compressed_image_transport::color::{FormatTag, StoredLayout};
    /// use compressed_image_transport::config::ColorFormat;
    /// use compressed_image_transport::frame::PixelEncoding;
    ///
    /// let tag: FormatTag = "mono8; jpeg compressed mono8".parse().unwrap();
    /// assert_eq!(
    ///     tag,
    ///     FormatTag::Tagged {
    ///         source: PixelEncoding::Mono8,
    ///         codec: ColorFormat::Jpeg,
    ///         layout: StoredLayout::Mono8,
    ///     }
    /// );
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((source, rest)) = s.split_once(';') else {
            return Ok(FormatTag::Legacy);
        };

        let source: PixelEncoding = source.trim().parse()?;
        let rest = rest.trim_start();
        let (codec, rest) = rest.split_once(' ').unwrap_or((rest, ""));
        let codec: ColorFormat = codec
            .parse()
            .map_err(|_| DecodeError::UnsupportedFormat(codec.to_string()))?;

        let rest = rest.trim_start();
        let layout = match rest.strip_prefix("compressed") {
            Some(layout) => StoredLayout::parse(layout.trim())?,
            None => {
                return Err(DecodeError::UnsupportedFormat(format!(
                    "expected '{} compressed', found '{} {}'",
                    codec, codec, rest
                )))
            }
        };

        Ok(FormatTag::Tagged {
            source,
            codec,
            layout,
        })
    }
}
