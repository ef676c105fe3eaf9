//! Distortion: normalized tanh waveshaper.

/// Soft-clip distortion: `tanh(x * k) / tanh(k)` with `k = 1 + amount * 9`.
///
/// Dividing by `tanh(k)` keeps a full-scale input at full scale, so the
/// stage adds harmonics without a level jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distortion {
    pub amount: f64,
    drive: f64,
    norm: f64,
}

impl Distortion {
    pub fn with_amount(amount: f64) -> Self {
        let amount = if amount.is_finite() { amount.clamp(0.0, 1.0) } else { 0.0 };
        let drive = 1.0 + amount * 9.0;
        Self {
            amount,
            drive,
            norm: drive.tanh(),
        }
    }

    #[inline]
    pub fn process(&self, input: f64) -> f64 {
        (input * self.drive).tanh() / self.norm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_maps_to_full_scale() {
        for amount in [0.0, 0.3, 1.0] {
            let d = Distortion::with_amount(amount);
            assert!((d.process(1.0) - 1.0).abs() < 1e-12, "amount {amount}");
            assert!((d.process(-1.0) + 1.0).abs() < 1e-12, "amount {amount}");
        }
    }

    #[test]
    fn more_drive_lifts_quiet_signals() {
        let gentle = Distortion::with_amount(0.1).process(0.2);
        let heavy = Distortion::with_amount(0.9).process(0.2);
        assert!(heavy > gentle, "heavy {heavy} should exceed gentle {gentle}");
    }

    #[test]
    fn zero_stays_zero() {
        assert_eq!(Distortion::with_amount(0.6).process(0.0), 0.0);
    }

    #[test]
    fn nan_amount_is_clamped() {
        let d = Distortion::with_amount(f64::NAN);
        assert_eq!(d.amount, 0.0);
        assert!(d.process(0.5).is_finite());
    }
}
