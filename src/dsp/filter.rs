//! Filters: one-pole smoothing filters and Audio-EQ-Cookbook biquads.

use std::f64::consts::PI;

/// Smallest one-pole coefficient accepted. Zero would freeze the filter.
const MIN_COEFFICIENT: f64 = 1e-4;

// ── One-pole ────────────────────────────────────────────────

/// One-pole low-pass: `y[n] = y[n-1]*(1-c) + x[n]*c`.
///
/// `c = 1` is a passthrough; smaller values darken the signal.
#[derive(Debug, Clone)]
pub struct OnePoleLowPass {
    pub coefficient: f64,
    state: f64,
}

impl OnePoleLowPass {
    pub fn new(coefficient: f64) -> Self {
        let coefficient = if coefficient.is_finite() {
            coefficient.clamp(MIN_COEFFICIENT, 1.0)
        } else {
            1.0
        };
        OnePoleLowPass {
            coefficient,
            state: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let c = self.coefficient;
        self.state = self.state * (1.0 - c) + input * c;
        self.state
    }
}

/// One-pole high-pass built as the input minus its own low-passed copy.
///
/// The internal low-pass runs at `0.05 * amount`, so larger amounts strip
/// more of the low end. Non-positive or non-finite amounts bypass.
#[derive(Debug, Clone)]
pub struct OnePoleHighPass {
    lowpass: Option<OnePoleLowPass>,
}

impl OnePoleHighPass {
    pub fn new(amount: f64) -> Self {
        let lowpass = (amount.is_finite() && amount > 0.0)
            .then(|| OnePoleLowPass::new(0.05 * amount.min(1.0)));
        OnePoleHighPass { lowpass }
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        match self.lowpass.as_mut() {
            Some(lp) => input - lp.process(input),
            None => input,
        }
    }
}

// ── Biquad ──────────────────────────────────────────────────

/// Biquad response shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    LowShelf,
    Peaking,
    HighShelf,
}

/// A biquad IIR filter (2nd order).
///
/// Implements the standard Direct Form II Transposed structure.
/// Coefficient formulas from the Audio EQ Cookbook (Robert Bristow-Johnson).
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    pub filter_type: FilterType,
    pub frequency: f64,
    pub q: f64,
    pub gain_db: f64,

    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,

    z1: f64,
    z2: f64,

    sample_rate: f64,
}

impl BiquadFilter {
    pub fn new(filter_type: FilterType, sample_rate: f64) -> Self {
        let mut f = BiquadFilter {
            filter_type,
            frequency: 1000.0,
            q: 0.707,
            gain_db: 0.0,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
            sample_rate: sanitize(sample_rate, 44100.0).max(1.0),
        };
        f.update_coefficients();
        f
    }

    /// Create a filter with clamped frequency, Q and gain.
    pub fn with_params(
        filter_type: FilterType,
        sample_rate: f64,
        frequency: f64,
        q: f64,
        gain_db: f64,
    ) -> Self {
        let mut f = Self::new(filter_type, sample_rate);
        let nyquist_guard = f.sample_rate * 0.49;
        f.frequency = sanitize(frequency, 1000.0).clamp(10.0, nyquist_guard.max(10.0));
        f.q = sanitize(q, 0.707).clamp(0.1, 20.0);
        f.gain_db = sanitize(gain_db, 0.0).clamp(-48.0, 48.0);
        f.update_coefficients();
        f
    }

    /// Recompute filter coefficients from current parameters.
    fn update_coefficients(&mut self) {
        let w0 = 2.0 * PI * self.frequency / self.sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let alpha = sin_w0 / (2.0 * self.q);
        let a_lin = 10.0_f64.powf(self.gain_db / 40.0);

        let (b0, b1, b2, a0, a1, a2) = match self.filter_type {
            FilterType::Peaking => {
                let b0 = 1.0 + alpha * a_lin;
                let b1 = -2.0 * cos_w0;
                let b2 = 1.0 - alpha * a_lin;
                let a0 = 1.0 + alpha / a_lin;
                let a1 = -2.0 * cos_w0;
                let a2 = 1.0 - alpha / a_lin;
                (b0, b1, b2, a0, a1, a2)
            }
            FilterType::LowShelf => {
                let shelf = 2.0 * a_lin.sqrt() * alpha;
                let b0 = a_lin * ((a_lin + 1.0) - (a_lin - 1.0) * cos_w0 + shelf);
                let b1 = 2.0 * a_lin * ((a_lin - 1.0) - (a_lin + 1.0) * cos_w0);
                let b2 = a_lin * ((a_lin + 1.0) - (a_lin - 1.0) * cos_w0 - shelf);
                let a0 = (a_lin + 1.0) + (a_lin - 1.0) * cos_w0 + shelf;
                let a1 = -2.0 * ((a_lin - 1.0) + (a_lin + 1.0) * cos_w0);
                let a2 = (a_lin + 1.0) + (a_lin - 1.0) * cos_w0 - shelf;
                (b0, b1, b2, a0, a1, a2)
            }
            FilterType::HighShelf => {
                let shelf = 2.0 * a_lin.sqrt() * alpha;
                let b0 = a_lin * ((a_lin + 1.0) + (a_lin - 1.0) * cos_w0 + shelf);
                let b1 = -2.0 * a_lin * ((a_lin - 1.0) + (a_lin + 1.0) * cos_w0);
                let b2 = a_lin * ((a_lin + 1.0) + (a_lin - 1.0) * cos_w0 - shelf);
                let a0 = (a_lin + 1.0) - (a_lin - 1.0) * cos_w0 + shelf;
                let a1 = 2.0 * ((a_lin - 1.0) - (a_lin + 1.0) * cos_w0);
                let a2 = (a_lin + 1.0) - (a_lin - 1.0) * cos_w0 - shelf;
                (b0, b1, b2, a0, a1, a2)
            }
        };

        // Normalize by a0
        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
    }

    /// Process a single sample through the filter.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }
}

fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
