//! Color/mono frame encoder and decoder

use super::format::{FormatTag, StoredLayout};
use crate::compression::{self, CompressionType};
use crate::config::{ColorConfig, ColorFormat, DecodeConfig, DecodeMode};
use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::frame::raster::Raster;
use crate::frame::{ChannelOrder, CompressedImage, Image, PixelEncoding, SampleType};
use tracing::{debug, trace};

impl From<ColorFormat> for CompressionType {
    fn from(format: ColorFormat) -> Self {
        match format {
            ColorFormat::Jpeg => CompressionType::Jpeg,
            ColorFormat::Png => CompressionType::Png,
            ColorFormat::Tiff => CompressionType::Tiff,
        }
    }
}

/// Compress a color, mono or Bayer image
///
/// - **JPEG** accepts 8/16-bit input. Color becomes `bgr8`, Bayer becomes
///   `mono8` (or stays a mosaic with `jpeg_compress_bayer`), everything else
///   becomes `mono8`.
/// - **PNG** accepts 8/16-bit unsigned input. Color becomes `bgr[a]<bits>`;
///   everything else is stored unchanged.
/// - **TIFF** accepts 8/16/32-bit input and stores it unchanged.
///
/// # Examples
///
/// ```
/// use compressed_image_transport::color;
/// use compressed_image_transport::config::{ColorConfig, DecodeConfig};
/// use compressed_image_transport::frame::{Image, PixelEncoding};
///
/// let image = Image::new(PixelEncoding::Mono8, 8, 8, vec![90; 64]).unwrap();
/// let compressed = color::encode(&image, &ColorConfig::default()).unwrap();
/// assert_eq!(compressed.format, "mono8; jpeg compressed mono8");
///
/// let decoded = color::decode(&compressed, &DecodeConfig::default()).unwrap();
/// assert_eq!(decoded.encoding, PixelEncoding::Mono8);
/// assert_eq!((decoded.width, decoded.height), (8, 8));
/// ```
pub fn encode(image: &Image, config: &ColorConfig) -> EncodeResult<CompressedImage> {
    config.validate()?;
    image.validate()?;

    let source = image.encoding;
    let (raster, layout) = match config.format {
        ColorFormat::Jpeg => prepare_jpeg(image, config.jpeg_compress_bayer)?,
        ColorFormat::Png => prepare_png(image)?,
        ColorFormat::Tiff => prepare_tiff(image)?,
    };

    trace!(
        source = %source,
        codec = config.format.name(),
        layout = %layout,
        "Prepared color raster"
    );

    let data = compression::compress(&raster, config.format.into(), &config.compression_params())?;

    let tag = FormatTag::Tagged {
        source,
        codec: config.format,
        layout,
    };
    Ok(CompressedImage::new(tag.to_string(), data))
}

fn require_bits(image: &Image, codec: ColorFormat, allowed: &[u8]) -> EncodeResult<()> {
    let bits = image.encoding.bit_depth();
    if allowed.contains(&bits) {
        return Ok(());
    }
    let allowed: Vec<String> = allowed.iter().map(|b| b.to_string()).collect();
    Err(EncodeError::UnsupportedEncoding(format!(
        "{} compression requires {}-bit input (input format is: {})",
        codec,
        allowed.join("/"),
        image.encoding
    )))
}

/// Raster of a color image reordered to BGR(A)
fn bgr_raster(image: &Image) -> Raster {
    let mut raster = Raster::from_image(image);
    if image.encoding.channel_order() == Some(ChannelOrder::Rgb) {
        raster.swap_red_blue();
    }
    raster
}

fn prepare_jpeg(image: &Image, compress_bayer: bool) -> EncodeResult<(Raster, StoredLayout)> {
    require_bits(image, ColorFormat::Jpeg, &[8, 16])?;
    let encoding = image.encoding;

    if encoding.is_color() {
        let mut raster = bgr_raster(image);
        raster.drop_alpha();
        raster.to_8bit();
        return Ok((
            raster,
            StoredLayout::Bgr {
                alpha: false,
                bits: 8,
            },
        ));
    }

    if let Some(pattern) = encoding.bayer_pattern() {
        let mut raster = Raster::from_image(image);
        if compress_bayer {
            raster.to_8bit();
            return Ok((raster, StoredLayout::Bayer(encoding)));
        }
        raster.bayer_to_gray8(pattern);
        return Ok((raster, StoredLayout::Mono8));
    }

    if encoding.channels() != 1 {
        return Err(EncodeError::UnsupportedEncoding(format!(
            "cannot convert {} to mono8 for jpeg compression",
            encoding
        )));
    }
    let mut raster = Raster::from_image(image);
    raster.to_8bit();
    Ok((raster, StoredLayout::Mono8))
}

fn prepare_png(image: &Image) -> EncodeResult<(Raster, StoredLayout)> {
    require_bits(image, ColorFormat::Png, &[8, 16])?;
    let encoding = image.encoding;

    if encoding.is_color() {
        let layout = StoredLayout::Bgr {
            alpha: encoding.has_alpha(),
            bits: encoding.bit_depth(),
        };
        return Ok((bgr_raster(image), layout));
    }
    Ok((Raster::from_image(image), StoredLayout::Unchanged))
}

fn prepare_tiff(image: &Image) -> EncodeResult<(Raster, StoredLayout)> {
    require_bits(image, ColorFormat::Tiff, &[8, 16, 32])?;
    Ok((Raster::from_image(image), StoredLayout::Unchanged))
}

/// Decompress a color message
///
/// The format field decides which transform to reverse; see
/// [`FormatTag`]. In [`DecodeMode::Unchanged`] the result carries the
/// source encoding recorded by the publisher, except that a Bayer source
/// stored as luminance comes back as `mono8`. [`DecodeMode::Gray`] always
/// yields `mono8` and [`DecodeMode::Color`] always yields `bgr8`.
///
/// # Errors
///
/// - [`DecodeError::UnsupportedFormat`] - unknown codec in the format field
/// - [`DecodeError::UnsupportedEncoding`] - unknown encoding in the format
///   field, or a legacy payload that is neither 1 nor 3 channels
/// - [`DecodeError::CorruptPayload`] - decoded layout does not fit the source
///   encoding
/// - [`DecodeError::EmptyImage`] - payload decoded to zero rows or columns
/// - [`DecodeError::BackendFailure`] - the codec failed
pub fn decode(message: &CompressedImage, config: &DecodeConfig) -> DecodeResult<Image> {
    let tag: FormatTag = message.format.parse()?;

    let compression_type = match tag {
        FormatTag::Tagged { codec, .. } => codec.into(),
        FormatTag::Legacy => CompressionType::sniff(&message.data).ok_or_else(|| {
            DecodeError::UnsupportedFormat(format!(
                "unrecognized payload for format '{}'",
                message.format
            ))
        })?,
    };

    let raster = compression::decompress(&message.data, compression_type)?;
    if raster.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: raster.width,
            height: raster.height,
        });
    }

    trace!(
        format = %message.format,
        channels = raster.channels,
        bits = raster.sample.bits(),
        mode = ?config.mode,
        "Reversing color transform"
    );

    let (encoding, raster) = match config.mode {
        DecodeMode::Gray => (PixelEncoding::Mono8, to_gray(raster, &tag)),
        DecodeMode::Color => (PixelEncoding::Bgr8, to_color(raster, &tag)),
        DecodeMode::Unchanged => match tag {
            FormatTag::Legacy => legacy(raster)?,
            FormatTag::Tagged {
                source,
                codec,
                layout,
            } => restore(raster, source, codec, layout)?,
        },
    };

    debug!(
        encoding = %encoding,
        width = raster.width,
        height = raster.height,
        "Decoded color image"
    );

    Ok(Image {
        encoding,
        width: raster.width,
        height: raster.height,
        data: raster.data,
    })
}

/// Channel order of a decoded raster, as written by the publisher
fn container_order(tag: &FormatTag) -> ChannelOrder {
    match tag {
        FormatTag::Legacy => ChannelOrder::Bgr,
        FormatTag::Tagged { source, layout, .. } => layout
            .container_order()
            .or_else(|| source.channel_order())
            .unwrap_or(ChannelOrder::Bgr),
    }
}

fn to_bgr_order(raster: &mut Raster, tag: &FormatTag) {
    if container_order(tag) == ChannelOrder::Rgb {
        raster.swap_red_blue();
    }
}

fn to_gray(mut raster: Raster, tag: &FormatTag) -> Raster {
    to_bgr_order(&mut raster, tag);
    raster.to_gray8();
    raster
}

fn to_color(mut raster: Raster, tag: &FormatTag) -> Raster {
    to_bgr_order(&mut raster, tag);
    raster.to_bgr8();
    raster
}

/// Older publishers did not record the source encoding
fn legacy(mut raster: Raster) -> DecodeResult<(PixelEncoding, Raster)> {
    let encoding = match raster.channels {
        1 => PixelEncoding::Mono8,
        3 => PixelEncoding::Bgr8,
        n => {
            return Err(DecodeError::UnsupportedEncoding(format!(
                "unsupported number of channels: {}",
                n
            )))
        }
    };
    raster.to_8bit();
    Ok((encoding, raster))
}

fn restore(
    mut raster: Raster,
    source: PixelEncoding,
    codec: ColorFormat,
    layout: StoredLayout,
) -> DecodeResult<(PixelEncoding, Raster)> {
    // a mosaic converted to luminance cannot be restored
    if source.is_bayer() && layout == StoredLayout::Mono8 {
        raster.to_8bit();
        return Ok((PixelEncoding::Mono8, raster));
    }

    if let (Some(stored), Some(wanted)) = (layout.container_order(), source.channel_order()) {
        if stored != wanted {
            raster.swap_red_blue();
        }
    }

    if codec == ColorFormat::Jpeg && source.bit_depth() == 16 {
        raster.to_16bit_scaled();
    }

    if source.is_color() {
        if source.has_alpha() {
            raster.add_alpha();
        } else {
            raster.drop_alpha();
        }
    }

    if raster.channels != source.channels() || raster.sample.size() != source.sample_type().size() {
        return Err(DecodeError::CorruptPayload(format!(
            "decoded {} channel(s) of {}-bit samples do not fit {}",
            raster.channels,
            raster.sample.bits(),
            source
        )));
    }
    // signed and float sources share their storage with unsigned words
    raster.sample = source.sample_type();

    Ok((source, raster))
}
