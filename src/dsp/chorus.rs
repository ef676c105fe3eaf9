//! Chorus effect: short LFO-modulated lookback into the dry signal.
//!
//! Unlike a delay line, the chorus reads from the *unprocessed* input of
//! the channel, so the caller hands it the original samples alongside the
//! current (already processed) value.

use std::f64::consts::PI;

/// Fixed wet weight of the modulated tap.
const WET: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct Chorus {
    sample_rate: f64,

    /// Overall strength, 0.0 to 1.0. Scales both depth and the wet tap.
    pub amount: f64,
    /// LFO rate in Hz.
    pub rate: f64,
    /// Modulation depth in seconds.
    pub depth: f64,
}

impl Chorus {
    /// Create a chorus whose depth is `amount * 10 ms` at a 1 Hz sweep.
    pub fn with_amount(sample_rate: f64, amount: f64) -> Self {
        let amount = if amount.is_finite() { amount.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            sample_rate: if sample_rate.is_finite() && sample_rate > 0.0 {
                sample_rate
            } else {
                44100.0
            },
            amount,
            rate: 1.0,
            depth: amount * 0.01,
        }
    }

    /// Signed lookback (in samples) at absolute sample index `n`.
    #[inline]
    pub fn offset_at(&self, n: usize) -> i64 {
        let t = n as f64 / self.sample_rate;
        (self.depth * self.sample_rate * (2.0 * PI * self.rate * t).sin()).floor() as i64
    }

    /// Blend `input` (the chain's value at index `n`) with the original
    /// signal read at the modulated position. Taps outside `original`
    /// contribute nothing.
    #[inline]
    pub fn process(&self, input: f64, original: &[f64], n: usize) -> f64 {
        let idx = n as i64 - self.offset_at(n);
        let tap = if idx >= 0 && (idx as usize) < original.len() {
            original[idx as usize]
        } else {
            0.0
        };
        input * (1.0 - WET) + tap * WET * self.amount
    }
}
