//! Anti-aliased oscillators using PolyBLEP.

use std::f64::consts::PI;

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

/// A band-limited oscillator with anti-aliasing (PolyBLEP).
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub waveform: Waveform,
    pub frequency: f64,
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    pub fn with_frequency(waveform: Waveform, sample_rate: f64, frequency: f64) -> Self {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            44100.0
        };
        let frequency = if frequency.is_finite() {
            frequency.clamp(0.0, sample_rate * 0.5)
        } else {
            0.0
        };
        Oscillator {
            waveform,
            frequency,
            phase: 0.0,
            sample_rate,
        }
    }

    /// Phase increment per sample.
    fn phase_inc(&self) -> f64 {
        self.frequency / self.sample_rate
    }

    /// Generate the next sample.
    pub fn next_sample(&mut self) -> f64 {
        let inc = self.phase_inc();
        let sample = match self.waveform {
            Waveform::Sine => (2.0 * PI * self.phase).sin(),
            Waveform::Sawtooth => 2.0 * self.phase - 1.0 - poly_blep(self.phase, inc),
            Waveform::Square => self.square(inc),
        };

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    fn square(&self, inc: f64) -> f64 {
        let mut value = if self.phase < 0.5 { 1.0 } else { -1.0 };
        value += poly_blep(self.phase, inc);
        value -= poly_blep((self.phase + 0.5) % 1.0, inc);
        value
    }
}

/// PolyBLEP (Polynomial Band-Limited Step) anti-aliasing correction.
///
/// `t` is the phase [0, 1), `dt` is the phase increment per sample.
fn poly_blep(t: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        0.0
    } else if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_zero_at_start() {
        let mut osc = Oscillator::with_frequency(Waveform::Sine, 44100.0, 440.0);
        let sample = osc.next_sample();
        assert!(sample.abs() < 1e-10, "Sine should start near 0, got {sample}");
    }

    #[test]
    fn waveform_ranges() {
        for (waveform, limit) in [
            (Waveform::Sine, 1.0),
            (Waveform::Square, 1.5),
            (Waveform::Sawtooth, 1.5),
        ] {
            let mut osc = Oscillator::with_frequency(waveform, 44100.0, 440.0);
            for _ in 0..44100 {
                let s = osc.next_sample();
                assert!(s.abs() <= limit, "{waveform:?} out of range: {s}");
            }
        }
    }

    #[test]
    fn sine_completes_cycles_at_frequency() {
        let mut osc = Oscillator::with_frequency(Waveform::Sine, 8000.0, 100.0);
        let mut crossings = 0;
        let mut prev = osc.next_sample();
        for _ in 1..8000 {
            let s = osc.next_sample();
            if prev < 0.0 && s >= 0.0 {
                crossings += 1;
            }
            prev = s;
        }
        assert!((99..=100).contains(&crossings), "expected ~100 rising crossings, got {crossings}");
    }

    #[test]
    fn zero_frequency_is_silent_sine() {
        let mut osc = Oscillator::with_frequency(Waveform::Sine, 44100.0, f64::NAN);
        for _ in 0..100 {
            assert_eq!(osc.next_sample(), 0.0);
        }
    }
}
