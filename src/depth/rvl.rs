//! RVL run-length codec for 16-bit rasters
//!
//! The raster is walked once, row-major, emitting alternating runs:
//!
//! ```text
//! zeros: varint | nonzeros: varint | delta_0: varint | ... | delta_{nonzeros-1}: varint
//! ```
//!
//! Each delta is the zigzag-encoded difference between a non-zero pixel and
//! the previous non-zero pixel (starting from 0). Varints are little-endian
//! base-128: seven payload bits per byte, high bit set on every byte except
//! the last. The encoding is lossless for every input.

use crate::error::{DecodeError, DecodeResult};
use bytes::{Buf, BufMut};
use tracing::trace;

/// Largest varint accepted by the decoder, in bytes
const MAX_VARINT_LEN: usize = 5;

fn put_varint(buf: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

fn get_varint(buf: &mut &[u8]) -> DecodeResult<u32> {
    let mut value: u64 = 0;
    for i in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return Err(DecodeError::CorruptPayload(
                "rvl stream ended inside a varint".to_string(),
            ));
        }
        let byte = buf.get_u8();
        value |= ((byte & 0x7F) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            return u32::try_from(value).map_err(|_| {
                DecodeError::CorruptPayload(format!("rvl varint {} overflows", value))
            });
        }
    }
    Err(DecodeError::CorruptPayload(
        "rvl varint longer than 5 bytes".to_string(),
    ))
}

fn zigzag(delta: i32) -> u32 {
    ((delta << 1) ^ (delta >> 31)) as u32
}

fn unzigzag(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Compress a row-major raster
///
/// # Examples
///
/// ```
/// use compressed_image_transport::depth::rvl;
///
/// let raster = [0, 0, 0, 1000, 1001, 1001, 0];
/// let encoded = rvl::encode(&raster);
/// assert_eq!(rvl::decode(&encoded, raster.len()).unwrap(), raster);
/// ```
pub fn encode(pixels: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() / 2 + 16);
    let mut previous: i32 = 0;
    let mut i = 0;

    while i < pixels.len() {
        let zeros = pixels[i..].iter().take_while(|&&p| p == 0).count();
        i += zeros;
        let nonzeros = pixels[i..].iter().take_while(|&&p| p != 0).count();

        trace!(zeros, nonzeros, "rvl run");
        put_varint(&mut out, zeros as u32);
        put_varint(&mut out, nonzeros as u32);

        for &pixel in &pixels[i..i + nonzeros] {
            let current = pixel as i32;
            put_varint(&mut out, zigzag(current - previous));
            previous = current;
        }
        i += nonzeros;
    }

    out
}

/// Decompress a stream that must hold exactly `num_pixels` pixels
///
/// Fails with `CorruptPayload` if a run overruns the raster, the stream ends
/// early, bytes remain after the last pixel, or a delta leaves `1..=65535`.
pub fn decode(data: &[u8], num_pixels: usize) -> DecodeResult<Vec<u16>> {
    let mut buf = data;
    // grows past this only while the stream keeps supplying runs
    let mut out = Vec::with_capacity(num_pixels.min(data.len().saturating_mul(4)));
    let mut previous: i32 = 0;

    while out.len() < num_pixels {
        let zeros = get_varint(&mut buf)? as usize;
        if zeros > num_pixels - out.len() {
            return Err(DecodeError::CorruptPayload(format!(
                "rvl zero run of {} overruns {} remaining pixels",
                zeros,
                num_pixels - out.len()
            )));
        }
        out.resize(out.len() + zeros, 0);

        let nonzeros = get_varint(&mut buf)? as usize;
        if nonzeros > num_pixels - out.len() {
            return Err(DecodeError::CorruptPayload(format!(
                "rvl value run of {} overruns {} remaining pixels",
                nonzeros,
                num_pixels - out.len()
            )));
        }
        trace!(zeros, nonzeros, "rvl run");

        for _ in 0..nonzeros {
            let current = previous as i64 + unzigzag(get_varint(&mut buf)?) as i64;
            if !(1..=u16::MAX as i64).contains(&current) {
                return Err(DecodeError::CorruptPayload(format!(
                    "rvl delta produced out-of-range value {}",
                    current
                )));
            }
            out.push(current as u16);
            previous = current as i32;
        }
    }

    if buf.has_remaining() {
        return Err(DecodeError::CorruptPayload(format!(
            "{} trailing bytes after rvl stream",
            buf.remaining()
        )));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(pixels: &[u16]) {
        let encoded = encode(pixels);
        let decoded = decode(&encoded, pixels.len()).unwrap();
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn test_varint_boundaries() {
        for value in [0u32, 1, 127, 128, 16383, 16384, u32::MAX] {
            let mut buf = Vec::new();
            put_varint(&mut buf, value);
            let mut slice = buf.as_slice();
            assert_eq!(get_varint(&mut slice).unwrap(), value);
            assert!(slice.is_empty());
        }

        let mut buf = Vec::new();
        put_varint(&mut buf, 127);
        assert_eq!(buf, vec![0x7F]);
        buf.clear();
        put_varint(&mut buf, 300);
        assert_eq!(buf, vec![0xAC, 0x02]);
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag(0), 0);
        assert_eq!(zigzag(-1), 1);
        assert_eq!(zigzag(1), 2);
        assert_eq!(zigzag(-65535), 131069);
        for delta in [-65535, -300, -1, 0, 1, 300, 65535] {
            assert_eq!(unzigzag(zigzag(delta)), delta);
        }
    }

    #[test]
    fn test_all_zero_raster() {
        let pixels = vec![0u16; 1000];
        let encoded = encode(&pixels);
        // one zero run of 1000 (2 bytes) and an empty value run (1 byte)
        assert_eq!(encoded, vec![0xE8, 0x07, 0x00]);
        roundtrip(&pixels);
    }

    #[test]
    fn test_all_distinct_adjacent() {
        let pixels: Vec<u16> = (0..512).map(|i| if i % 2 == 0 { 1 } else { 65535 }).collect();
        roundtrip(&pixels);
    }

    #[test]
    fn test_pseudo_random_raster() {
        let mut state: u32 = 0x1234_5678;
        let pixels: Vec<u16> = (0..4096)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                if state >> 30 == 0 {
                    0
                } else {
                    (state >> 16) as u16
                }
            })
            .collect();
        roundtrip(&pixels);
    }

    #[test]
    fn test_empty_raster() {
        assert!(encode(&[]).is_empty());
        assert_eq!(decode(&[], 0).unwrap(), Vec::<u16>::new());
    }

    #[test]
    fn test_smooth_depth_compresses() {
        let pixels: Vec<u16> = (0..10_000).map(|i| 3000 + (i / 100) as u16).collect();
        let encoded = encode(&pixels);
        // roughly one byte per pixel against two raw
        assert!(encoded.len() < pixels.len() * 2 * 6 / 10);
        roundtrip(&pixels);
    }

    #[test]
    fn test_decode_underrun() {
        let encoded = encode(&[5, 6, 7]);
        let result = decode(&encoded, 4);
        assert!(matches!(result, Err(DecodeError::CorruptPayload(_))));
    }

    #[test]
    fn test_decode_overrun() {
        let encoded = encode(&[5, 6, 7]);
        let result = decode(&encoded, 2);
        assert!(matches!(result, Err(DecodeError::CorruptPayload(_))));
    }

    #[test]
    fn test_decode_huge_raster_with_short_stream() {
        let encoded = encode(&[5, 6, 7]);
        let result = decode(&encoded, 1 << 26);
        assert!(matches!(result, Err(DecodeError::CorruptPayload(_))));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut encoded = encode(&[0, 9]);
        encoded.push(0);
        let result = decode(&encoded, 2);
        assert!(matches!(result, Err(DecodeError::CorruptPayload(_))));
    }

    #[test]
    fn test_decode_out_of_range_delta() {
        // no zeros, one value, delta -1 from 0
        let result = decode(&[0x00, 0x01, 0x01], 1);
        assert!(matches!(result, Err(DecodeError::CorruptPayload(_))));
    }
}
