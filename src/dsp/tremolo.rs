//! Tremolo: sinusoidal amplitude modulation.

use std::f64::consts::PI;

/// `y = x * (1 - d + d * sin(2π * rate * t))` with `d = amount * 0.5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tremolo {
    /// Modulation depth, 0.0 to 0.5.
    pub depth: f64,
    /// LFO rate in Hz.
    pub rate: f64,
}

impl Tremolo {
    pub fn with_params(amount: f64, rate: f64) -> Self {
        let amount = if amount.is_finite() { amount.clamp(0.0, 1.0) } else { 0.0 };
        let rate = if rate.is_finite() { rate.clamp(0.0, 100.0) } else { 0.0 };
        Self {
            depth: amount * 0.5,
            rate,
        }
    }

    /// Gain applied at absolute time `t` seconds.
    #[inline]
    pub fn gain_at(&self, t: f64) -> f64 {
        1.0 - self.depth + self.depth * (2.0 * PI * self.rate * t).sin()
    }

    #[inline]
    pub fn process(&self, input: f64, t: f64) -> f64 {
        input * self.gain_at(t)
    }
}
