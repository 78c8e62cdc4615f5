//! Color and mono image compression
//!
//! Frames go through JPEG, PNG or TIFF. Before compression the samples may be
//! reordered to BGR(A), reduced to 8 bits or collapsed to luminance; the
//! [`FormatTag`] written into the message records which of these happened,
//! so the decoder can reverse it.

mod codec;
pub mod format;

pub use codec::{decode, encode};
pub use format::{FormatTag, StoredLayout};
