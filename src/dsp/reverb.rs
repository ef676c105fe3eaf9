//! Reverb effect: stochastic decaying tail.
//!
//! An approximation, not a convolution: every sample gets a burst of
//! uniform noise whose level decays exponentially from the start of the
//! buffer. The randomness is drawn from a caller-supplied `Rng` so renders
//! can be made reproducible by seeding it.

use rand::Rng;

/// Peak level of the injected noise before wet mix and decay.
const NOISE_LEVEL: f64 = 0.1;
const MIN_DECAY: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reverb {
    /// Time constant of the exponential decay, in seconds.
    pub decay_time: f64,
    /// Wet level of the tail (0.0 to 1.0).
    pub wet_mix: f64,
}

impl Reverb {
    pub fn with_params(decay_time: f64, wet_mix: f64) -> Self {
        let decay_time = if decay_time.is_finite() { decay_time.max(MIN_DECAY) } else { MIN_DECAY };
        let wet_mix = if wet_mix.is_finite() { wet_mix.clamp(0.0, 1.0) } else { 0.0 };
        Self { decay_time, wet_mix }
    }

    /// Tail envelope at time `t` seconds.
    #[inline]
    pub fn envelope(&self, t: f64) -> f64 {
        (-t / self.decay_time).exp() * self.wet_mix
    }

    /// Add one noise sample to `input` at absolute time `t`.
    #[inline]
    pub fn process<R: Rng + ?Sized>(&self, input: f64, t: f64, rng: &mut R) -> f64 {
        let noise: f64 = rng.gen_range(-1.0..=1.0);
        input + self.envelope(t) * noise * NOISE_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn tail_is_bounded_by_envelope() {
        let reverb = Reverb::with_params(1.5, 0.3);
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..10000 {
            let t = i as f64 / 44100.0;
            let y = reverb.process(0.0, t, &mut rng);
            let bound = reverb.envelope(t) * NOISE_LEVEL;
            assert!(y.abs() <= bound + 1e-12, "tail {y} exceeds bound {bound} at {t}s");
        }
    }

    #[test]
    fn tail_decays_over_time() {
        let reverb = Reverb::with_params(0.5, 1.0);
        assert!(reverb.envelope(0.0) > reverb.envelope(0.5));
        assert!(reverb.envelope(10.0) < 1e-6, "tail should vanish after 20 time constants");
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let reverb = Reverb::with_params(2.0, 0.4);
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..64).map(|i| reverb.process(0.25, i as f64 / 8000.0, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn pathological_params_are_clamped() {
        let reverb = Reverb::with_params(f64::NAN, 7.0);
        assert_eq!(reverb.decay_time, MIN_DECAY);
        assert_eq!(reverb.wet_mix, 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(reverb.process(0.0, 0.0, &mut rng).is_finite());

        let zero = Reverb::with_params(0.0, 0.5);
        assert!(zero.process(0.1, 5.0, &mut rng).is_finite());
    }
}
