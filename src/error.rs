//! Error types for image compression and decompression
//!
//! Every codec operation is per-call and recoverable: an error means "drop this
//! frame", never "stop the process". Encoders never emit a partial payload and
//! decoders never hand back a malformed image.

use crate::frame::UnknownEncoding;
use thiserror::Error;

/// Errors produced while compressing an image
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Unrecognized compression format requested
    ///
    /// This error occurs when:
    /// - The depth codec is configured with anything other than `png` or `rvl`
    /// - The color codec is configured with anything other than `jpeg`, `png` or `tiff`
    ///
    /// # Example
    /// ```no_run
    /// # use compressed_image_transport::error::EncodeError;
    /// let err = EncodeError::UnsupportedFormat("webp".to_string());
    /// ```
    #[error("Unsupported compression format: {0}")]
    UnsupportedFormat(String),

    /// Input pixel encoding cannot be handled by the selected codec
    ///
    /// This error occurs when:
    /// - The depth codec receives anything other than `32FC1` or `16UC1`
    /// - JPEG or PNG receive samples that are not 8 or 16 bits wide
    /// - TIFF receives samples that are not 8, 16 or 32 bits wide
    /// - The encoding string itself is not a known pixel encoding
    #[error("Unsupported pixel encoding: {0}")]
    UnsupportedEncoding(String),

    /// Image buffer size does not match its declared geometry
    #[error("Invalid image data size: expected {expected}, got {actual}")]
    InvalidImage {
        /// Bytes implied by width, height and encoding
        expected: usize,
        /// Bytes actually present
        actual: usize,
    },

    /// Image has zero rows or columns
    #[error("Empty image: {width}x{height}")]
    EmptyImage {
        /// Image width in pixels
        width: u32,
        /// Image height in pixels
        height: u32,
    },

    /// Codec configuration outside its declared ranges
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The general-purpose compressor reported a failure
    ///
    /// # Example
    /// ```no_run
    /// # use compressed_image_transport::error::EncodeError;
    /// let err = EncodeError::BackendFailure {
    ///     codec: "png",
    ///     message: "writer closed".to_string(),
    /// };
    /// ```
    #[error("{codec} compression failed: {message}")]
    BackendFailure {
        /// Back-end name (`png`, `jpeg`, `tiff`)
        codec: &'static str,
        /// Message reported by the back end
        message: String,
    },
}

/// Errors produced while decompressing a payload
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Unrecognized codec named in a color format tag
    #[error("Unsupported compression format: {0}")]
    UnsupportedFormat(String),

    /// Pixel encoding in the format tag is unknown, or the decoded layout
    /// cannot be mapped onto it
    #[error("Unsupported pixel encoding: {0}")]
    UnsupportedEncoding(String),

    /// Header or payload is inconsistent
    ///
    /// This error occurs when:
    /// - The depth wire header is truncated or carries an unknown tag
    /// - The decoded pixel count differs from the header-declared dimensions
    /// - The RVL stream ends early or carries trailing bytes
    ///
    /// # Example
    /// ```no_run
    /// # use compressed_image_transport::error::DecodeError;
    /// let err = DecodeError::CorruptPayload("unknown depth tag 7".to_string());
    /// ```
    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    /// Decoded image has zero rows or columns
    #[error("Decoded image is empty: {width}x{height}")]
    EmptyImage {
        /// Decoded width in pixels
        width: u32,
        /// Decoded height in pixels
        height: u32,
    },

    /// The general-purpose decompressor reported a failure
    #[error("{codec} decompression failed: {message}")]
    BackendFailure {
        /// Back-end name (`png`, `jpeg`, `tiff`)
        codec: &'static str,
        /// Message reported by the back end
        message: String,
    },
}

/// Errors produced while reading configuration from the host
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Numeric value outside its declared range
    #[error("Parameter {name} out of range: {value} (allowed: {min}..={max})")]
    OutOfRange {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },

    /// String value not among the allowed choices
    #[error("Parameter {name} has invalid value '{value}'")]
    InvalidValue {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: String,
    },

    /// Host stored a value of the wrong type
    #[error("Parameter {name} must be of type {expected}")]
    TypeMismatch {
        /// Fully scoped parameter key
        name: String,
        /// Expected type name
        expected: &'static str,
    },
}

impl From<UnknownEncoding> for EncodeError {
    fn from(e: UnknownEncoding) -> Self {
        EncodeError::UnsupportedEncoding(e.0)
    }
}

impl From<UnknownEncoding> for DecodeError {
    fn from(e: UnknownEncoding) -> Self {
        DecodeError::UnsupportedEncoding(e.0)
    }
}

/// Result type alias for encode operations
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

/// Result type alias for decode operations
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
