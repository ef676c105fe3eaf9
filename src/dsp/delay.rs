//! Delay effect: mono feedback delay line.

/// Longest delay time honoured, in seconds.
pub const MAX_DELAY_SECONDS: f64 = 10.0;
/// Hard cap on the ring length whatever the sample rate.
const MAX_DELAY_SAMPLES: usize = 1 << 23;

/// A feedback delay with a ring buffer exactly one delay period long.
///
/// Each sample reads the slot about to be overwritten, so the echo arrives
/// `round(delay_time * sample_rate)` samples after the input.
#[derive(Debug, Clone)]
pub struct Delay {
    buffer: Vec<f64>,
    index: usize,

    /// Feedback amount (0.0 = single echo, approaching 1.0 = endless repeats).
    pub feedback: f64,
    /// Dry/wet mix (0.0 = fully dry, 1.0 = fully wet).
    pub mix: f64,
}

impl Delay {
    /// Create a delay with specific parameters.
    ///
    /// The delay time is clamped to `0..=MAX_DELAY_SECONDS` and the ring
    /// buffer holds at least one sample, so a zero or pathological delay
    /// time degrades to a one-sample echo rather than failing.
    pub fn with_params(sample_rate: f64, delay_time: f64, feedback: f64, mix: f64) -> Self {
        let delay_time = finite_or(delay_time, 0.0).clamp(0.0, MAX_DELAY_SECONDS);
        let samples = (delay_time * sample_rate).round();
        let len = if samples.is_finite() && samples >= 1.0 {
            (samples as usize).min(MAX_DELAY_SAMPLES)
        } else {
            1
        };
        Self {
            buffer: vec![0.0; len],
            index: 0,
            feedback: finite_or(feedback, 0.0).clamp(0.0, 0.99),
            mix: finite_or(mix, 0.0).clamp(0.0, 1.0),
        }
    }

    /// Number of samples between an input and its first echo.
    pub fn delay_samples(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let delayed = self.buffer[self.index];
        self.buffer[self.index] = input + delayed * self.feedback;
        self.index = (self.index + 1) % self.buffer.len();
        input * (1.0 - self.mix) + delayed * self.mix
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
