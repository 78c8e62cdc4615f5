//! Interleaved sample buffer shared by the codecs
//!
//! A [`Raster`] is what the compression back ends read and write. Color
//! rasters are kept in BGR(A) order; the back ends swap to RGB(A) at the file
//! boundary, so that BGR data lands in the file as true color.

use super::encoding::{BayerPattern, SampleType};
use super::Image;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Raster {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub sample: SampleType,
    pub data: Vec<u8>,
}

impl Raster {
    pub fn from_image(image: &Image) -> Self {
        Raster {
            width: image.width,
            height: image.height,
            channels: image.encoding.channels(),
            sample: image.encoding.sample_type(),
            data: image.data.clone(),
        }
    }

    pub fn from_u16(width: u32, height: u32, samples: &[u16]) -> Self {
        Raster {
            width,
            height,
            channels: 1,
            sample: SampleType::U16,
            data: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
        }
    }

    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.channels as usize * self.sample.size()
    }

    /// Samples of a 16-bit raster, decoded from little-endian bytes
    pub fn samples_u16(&self) -> Vec<u16> {
        self.data
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect()
    }

    /// Exchange the first and third channel of every pixel
    pub fn swap_red_blue(&mut self) {
        if self.channels < 3 {
            return;
        }
        let size = self.sample.size();
        let stride = self.bytes_per_pixel();
        for pixel in self.data.chunks_exact_mut(stride) {
            for i in 0..size {
                pixel.swap(i, 2 * size + i);
            }
        }
    }

    pub fn drop_alpha(&mut self) {
        if self.channels != 4 {
            return;
        }
        let size = self.sample.size();
        let stride = self.bytes_per_pixel();
        let mut out = Vec::with_capacity(self.num_pixels() * 3 * size);
        for pixel in self.data.chunks_exact(stride) {
            out.extend_from_slice(&pixel[..3 * size]);
        }
        self.data = out;
        self.channels = 3;
    }

    /// Append a fully opaque alpha channel
    pub fn add_alpha(&mut self) {
        if self.channels != 3 {
            return;
        }
        let opaque: Vec<u8> = match self.sample {
            SampleType::U8 => vec![u8::MAX],
            SampleType::S8 => vec![i8::MAX as u8],
            SampleType::U16 => u16::MAX.to_le_bytes().to_vec(),
            SampleType::S16 => i16::MAX.to_le_bytes().to_vec(),
            SampleType::S32 => i32::MAX.to_le_bytes().to_vec(),
            SampleType::F32 => 1.0f32.to_le_bytes().to_vec(),
            SampleType::F64 => 1.0f64.to_le_bytes().to_vec(),
        };
        let stride = self.bytes_per_pixel();
        let mut out = Vec::with_capacity(self.num_pixels() * (stride + opaque.len()));
        for pixel in self.data.chunks_exact(stride) {
            out.extend_from_slice(pixel);
            out.extend_from_slice(&opaque);
        }
        self.data = out;
        self.channels = 4;
    }

    /// Convert samples to 8-bit unsigned
    ///
    /// 16-bit samples keep their high byte; wider types saturate.
    pub fn to_8bit(&mut self) {
        let data = match self.sample {
            SampleType::U8 => return,
            SampleType::S8 => self.data.iter().map(|&b| (b as i8).max(0) as u8).collect(),
            SampleType::U16 => self.data.chunks_exact(2).map(|c| c[1]).collect(),
            SampleType::S16 => self
                .data
                .chunks_exact(2)
                .map(|c| (i16::from_le_bytes([c[0], c[1]]).max(0) >> 7) as u8)
                .collect(),
            SampleType::S32 => self
                .data
                .chunks_exact(4)
                .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]).clamp(0, 255) as u8)
                .collect(),
            SampleType::F32 => self
                .data
                .chunks_exact(4)
                .map(|c| saturate_u8(f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64))
                .collect(),
            SampleType::F64 => self
                .data
                .chunks_exact(8)
                .map(|c| {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(c);
                    saturate_u8(f64::from_le_bytes(bytes))
                })
                .collect(),
        };
        self.data = data;
        self.sample = SampleType::U8;
    }

    /// Linear 8-to-16-bit rescale (`v * 256`)
    pub fn to_16bit_scaled(&mut self) {
        if self.sample != SampleType::U8 {
            return;
        }
        self.data = self
            .data
            .iter()
            .flat_map(|&b| ((b as u16) << 8).to_le_bytes())
            .collect();
        self.sample = SampleType::U16;
    }

    /// Collapse to single-channel 8-bit luminance; color input is BGR(A)
    pub fn to_gray8(&mut self) {
        self.to_8bit();
        match self.channels {
            1 => {}
            3 | 4 => {
                let stride = self.channels as usize;
                self.data = self
                    .data
                    .chunks_exact(stride)
                    .map(|p| luma(p[2], p[1], p[0]))
                    .collect();
                self.channels = 1;
            }
            // two-channel gray+alpha
            _ => {
                let stride = self.channels as usize;
                self.data = self.data.chunks_exact(stride).map(|p| p[0]).collect();
                self.channels = 1;
            }
        }
    }

    /// Expand to three-channel 8-bit BGR
    pub fn to_bgr8(&mut self) {
        self.to_8bit();
        match self.channels {
            3 => {}
            4 => self.drop_alpha(),
            _ => {
                let stride = self.channels as usize;
                self.data = self
                    .data
                    .chunks_exact(stride)
                    .flat_map(|p| [p[0], p[0], p[0]])
                    .collect();
                self.channels = 3;
            }
        }
    }

    /// Replace an 8-bit Bayer mosaic with its luminance
    ///
    /// Every 2x2 cell gets one value computed from its red site, the mean of
    /// its two green sites and its blue site. Cells cut by an odd edge reuse
    /// the nearest in-bounds site.
    pub fn bayer_to_gray8(&mut self, pattern: BayerPattern) {
        self.to_8bit();
        let w = self.width as usize;
        let h = self.height as usize;
        if w == 0 || h == 0 {
            return;
        }
        let ((rx, ry), (bx, by)) = pattern.red_blue_sites();
        let (gx0, gy0) = (1 - rx, ry);
        let (gx1, gy1) = (rx, 1 - ry);
        let at = |x: usize, y: usize| -> u8 { self.data[y.min(h - 1) * w + x.min(w - 1)] };

        let mut out = vec![0u8; w * h];
        for cy in (0..h).step_by(2) {
            for cx in (0..w).step_by(2) {
                let r = at(cx + rx, cy + ry);
                let b = at(cx + bx, cy + by);
                let g0 = at(cx + gx0, cy + gy0) as u16;
                let g1 = at(cx + gx1, cy + gy1) as u16;
                let g = ((g0 + g1 + 1) / 2) as u8;
                let y = luma(r, g, b);
                for dy in 0..2 {
                    for dx in 0..2 {
                        if cx + dx < w && cy + dy < h {
                            out[(cy + dy) * w + cx + dx] = y;
                        }
                    }
                }
            }
        }
        self.data = out;
    }
}

/// ITU-R BT.601 luma in 14-bit fixed point
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << 13)) >> 14;
    y.min(255) as u8
}

fn saturate_u8(v: f64) -> u8 {
    if v.is_nan() {
        0
    } else {
        v.round().clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(channels: u8, sample: SampleType, data: Vec<u8>, width: u32) -> Raster {
        let height = (data.len() / (channels as usize * sample.size() * width as usize)) as u32;
        Raster {
            width,
            height,
            channels,
            sample,
            data,
        }
    }

    #[test]
    fn test_swap_red_blue_8bit() {
        let mut r = raster(3, SampleType::U8, vec![1, 2, 3, 4, 5, 6], 2);
        r.swap_red_blue();
        assert_eq!(r.data, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_swap_red_blue_16bit_keeps_alpha() {
        let mut r = raster(
            4,
            SampleType::U16,
            vec![0x01, 0x10, 0x02, 0x20, 0x03, 0x30, 0x04, 0x40],
            1,
        );
        r.swap_red_blue();
        assert_eq!(r.data, vec![0x03, 0x30, 0x02, 0x20, 0x01, 0x10, 0x04, 0x40]);
    }

    #[test]
    fn test_alpha_add_and_drop() {
        let mut r = raster(3, SampleType::U16, vec![1, 0, 2, 0, 3, 0], 1);
        r.add_alpha();
        assert_eq!(r.channels, 4);
        assert_eq!(r.data, vec![1, 0, 2, 0, 3, 0, 0xFF, 0xFF]);
        r.drop_alpha();
        assert_eq!(r.channels, 3);
        assert_eq!(r.data, vec![1, 0, 2, 0, 3, 0]);
    }

    #[test]
    fn test_bit_depth_conversions() {
        let mut r = raster(1, SampleType::U16, vec![0x34, 0x12, 0xFF, 0xFF], 2);
        r.to_8bit();
        assert_eq!(r.data, vec![0x12, 0xFF]);
        r.to_16bit_scaled();
        assert_eq!(r.samples_u16(), vec![0x1200, 0xFF00]);
    }

    #[test]
    fn test_to_gray8_from_bgr() {
        // pure white, pure blue (BGR order)
        let mut r = raster(3, SampleType::U8, vec![255, 255, 255, 255, 0, 0], 2);
        r.to_gray8();
        assert_eq!(r.channels, 1);
        assert_eq!(r.data[0], 255);
        assert_eq!(r.data[1], 29);
    }

    #[test]
    fn test_to_bgr8_from_gray() {
        let mut r = raster(1, SampleType::U8, vec![7, 9], 2);
        r.to_bgr8();
        assert_eq!(r.data, vec![7, 7, 7, 9, 9, 9]);
    }

    #[test]
    fn test_bayer_uniform_gray_stays_uniform() {
        let mut r = raster(1, SampleType::U8, vec![100; 9], 3);
        r.bayer_to_gray8(BayerPattern::Rggb);
        assert_eq!(r.data, vec![100; 9]);
    }

    #[test]
    fn test_bayer_red_only_cell() {
        // RGGB cell with only the red site lit
        let mut r = raster(1, SampleType::U8, vec![255, 0, 0, 0], 2);
        r.bayer_to_gray8(BayerPattern::Rggb);
        assert_eq!(r.data, vec![76; 4]);
    }
}
