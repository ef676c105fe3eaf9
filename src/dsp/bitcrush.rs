//! Bit crusher: amplitude quantizer.

/// Reduces resolution to `bits = 16 - floor(amount * 12)` (at least 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitCrusher {
    pub bits: u32,
    steps: f64,
}

impl BitCrusher {
    pub fn with_amount(amount: f64) -> Self {
        let amount = if amount.is_finite() { amount.clamp(0.0, 1.0) } else { 0.0 };
        let bits = (16 - (amount * 12.0).floor() as i32).max(1) as u32;
        Self {
            bits,
            steps: 2.0_f64.powi(bits as i32),
        }
    }

    #[inline]
    pub fn process(&self, input: f64) -> f64 {
        (input * self.steps).round() / self.steps
    }
}
