//! Inverse-depth quantization
//!
//! Depth in meters is mapped onto 16-bit values with
//!
//! ```text
//! p = quant_a / d + quant_b
//! quant_a = q * (q + 1)
//! quant_b = 1 - quant_a / depth_max
//! ```
//!
//! where `q` is the configured depth quantization. Sensor error grows with the
//! square of distance, and quantizing `1/d` keeps the relative error roughly
//! constant across the range. `depth_max` maps to `1`; `0` is reserved for
//! "no measurement".

/// Coefficients of the quantization formula
///
/// Travels in every depth payload header, so decoding never depends on the
/// configuration that produced the payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizationParams {
    pub quant_a: f64,
    pub quant_b: f64,
}

impl QuantizationParams {
    /// Derive coefficients from the configured range and quantization
    ///
    /// # Examples
    ///
    /// ```
    /// use compressed_image_transport::depth::QuantizationParams;
    ///
    /// let params = QuantizationParams::new(10.0, 100.0);
    /// assert_eq!(params.quant_a, 10100.0);
    /// assert_eq!(params.quantize(10.0), 1);
    /// assert_eq!(params.quantize(f32::NAN), 0);
    /// ```
    pub fn new(depth_max: f64, depth_quantization: f64) -> Self {
        let quant_a = depth_quantization * (depth_quantization + 1.0);
        let quant_b = 1.0 - quant_a / depth_max;
        QuantizationParams { quant_a, quant_b }
    }

    /// Whether the coefficients describe a usable mapping
    ///
    /// Every stored value `p >= 1` must lie strictly above `quant_b` so that
    /// the inverse stays finite and positive.
    pub fn is_valid(&self) -> bool {
        self.quant_a.is_finite() && self.quant_a > 0.0 && self.quant_b.is_finite() && self.quant_b < 1.0
    }

    /// Map a depth in meters onto a stored value
    ///
    /// Non-finite, zero and negative depths yield `0`. Everything else is
    /// rounded to the nearest integer and saturates to `1..=65535`.
    pub fn quantize(&self, meters: f32) -> u16 {
        if !meters.is_finite() || meters <= 0.0 {
            return 0;
        }
        let raw = self.quant_a / meters as f64 + self.quant_b;
        raw.round().clamp(1.0, u16::MAX as f64) as u16
    }

    /// Map a stored value back to meters; `0` yields NaN
    pub fn dequantize(&self, value: u16) -> f32 {
        if value == 0 {
            return f32::NAN;
        }
        (self.quant_a / (value as f64 - self.quant_b)) as f32
    }

    /// Distance between the depths of two adjacent stored values around `meters`
    pub fn step_at(&self, meters: f64) -> f64 {
        meters * meters / self.quant_a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_params() -> QuantizationParams {
        QuantizationParams::new(10.0, 100.0)
    }

    #[test]
    fn test_coefficients() {
        let params = default_params();
        assert_eq!(params.quant_a, 10100.0);
        assert_eq!(params.quant_b, -1009.0);
        assert!(params.is_valid());
    }

    #[test]
    fn test_invalid_inputs_map_to_zero() {
        let params = default_params();
        assert_eq!(params.quantize(0.0), 0);
        assert_eq!(params.quantize(-1.0), 0);
        assert_eq!(params.quantize(f32::NAN), 0);
        assert_eq!(params.quantize(f32::INFINITY), 0);
        assert_eq!(params.quantize(f32::NEG_INFINITY), 0);
        assert!(params.dequantize(0).is_nan());
    }

    #[test]
    fn test_saturation() {
        let params = default_params();
        // beyond depth_max saturates to 1
        assert_eq!(params.quantize(10.0), 1);
        assert_eq!(params.quantize(50.0), 1);
        // closer than the representable minimum saturates to the top
        assert_eq!(params.quantize(0.01), u16::MAX);
    }

    #[test]
    fn test_roundtrip_within_one_step() {
        let params = default_params();
        let mut d = 0.2f64;
        while d <= 10.0 {
            let restored = params.dequantize(params.quantize(d as f32)) as f64;
            assert!(
                (restored - d).abs() <= params.step_at(d),
                "depth {} restored as {}",
                d,
                restored
            );
            d += 0.037;
        }
    }

    #[test]
    fn test_monotonic_decreasing() {
        let params = QuantizationParams::new(5.0, 50.0);
        let near = params.quantize(0.5);
        let mid = params.quantize(1.0);
        let far = params.quantize(4.0);
        assert!(near > mid && mid > far);
    }

    #[test]
    fn test_validity() {
        assert!(!QuantizationParams {
            quant_a: 0.0,
            quant_b: 0.0
        }
        .is_valid());
        assert!(!QuantizationParams {
            quant_a: 10.0,
            quant_b: 1.0
        }
        .is_valid());
        assert!(!QuantizationParams {
            quant_a: f64::NAN,
            quant_b: 0.0
        }
        .is_valid());
    }
}
