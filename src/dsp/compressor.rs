//! Compressor effect: instantaneous soft-knee limiter.
//!
//! Magnitudes above the threshold are scaled down by the ratio; anything
//! below passes untouched. There is no envelope follower, so the result is
//! a pure function of the current sample.

/// Threshold at compression amount 0.
const BASE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compressor {
    /// Linear magnitude above which compression begins.
    pub threshold: f64,
    /// Compression ratio (e.g., 4.0 = 4:1).
    pub ratio: f64,
}

impl Compressor {
    /// Create a compressor with specific parameters.
    pub fn with_params(threshold: f64, ratio: f64) -> Self {
        let threshold = if threshold.is_finite() { threshold.clamp(0.0, 1.0) } else { BASE_THRESHOLD };
        let ratio = if ratio.is_finite() { ratio.clamp(1.0, 100.0) } else { 1.0 };
        Self { threshold, ratio }
    }

    /// `(threshold, ratio)` for a 0..1 compression amount: the threshold
    /// falls from 0.5 to 0.2 while the ratio rises to 10:1.
    pub fn params_for_amount(amount: f64) -> (f64, f64) {
        let amount = if amount.is_finite() { amount.clamp(0.0, 1.0) } else { 0.0 };
        (BASE_THRESHOLD - amount * 0.3, 1.0 + amount * 9.0)
    }

    #[inline]
    pub fn process(&self, input: f64) -> f64 {
        let magnitude = input.abs();
        if magnitude > self.threshold {
            let compressed = self.threshold + (magnitude - self.threshold) / self.ratio;
            compressed.copysign(input)
        } else {
            input
        }
    }
}
