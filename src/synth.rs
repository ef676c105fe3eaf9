//! Tone synthesizer: renders text-derived tone patterns to a buffer.
//!
//! A prompt is turned into a handful of repeating tone patterns (a base
//! melody, optional fifth and bass lines, and an intensity line an octave
//! up). Each pattern blends sine, square and sawtooth oscillators by the
//! voice's harmonic content and is shaped by its own repeating ADSR.

use crate::buffer::SampleBuffer;
use crate::config::SynthConfig;
use crate::dsp::envelope::Envelope;
use crate::dsp::oscillator::{Oscillator, Waveform};
use crate::profile::{resolve_genre_params, resolve_mood, resolve_voice, VoiceProfile};

/// Detune of the square partial relative to the pattern pitch.
const SQUARE_DETUNE: f64 = 1.01;
/// Detune of the sawtooth partial.
const SAW_DETUNE: f64 = 1.02;
/// Headroom applied to the summed patterns.
const OUTPUT_SCALE: f64 = 0.5;

/// One repeating tone line.
#[derive(Debug, Clone, PartialEq)]
pub struct TonePattern {
    /// Pitch relative to the tone's base frequency.
    pub frequency_ratio: f64,
    pub amplitude: f64,
    pub envelope: Envelope,
    /// First onset, in seconds.
    pub start_time: f64,
    /// Length of each note, in seconds.
    pub duration: f64,
    /// Seconds between consecutive onsets.
    pub repeat_interval: f64,
}

impl TonePattern {
    /// Envelope level at `time`, or 0 outside every repetition.
    ///
    /// Repetitions start every `repeat_interval` from `start_time`; there
    /// are `floor((total - start) / interval)` of them. Where repetitions
    /// overlap, the earliest one wins.
    pub fn level_at(&self, time: f64, total_duration: f64) -> f64 {
        if self.repeat_interval <= 0.0 || !self.repeat_interval.is_finite() {
            return 0.0;
        }
        let repetitions = ((total_duration - self.start_time) / self.repeat_interval).floor();
        if !(repetitions >= 1.0) {
            return 0.0;
        }
        let since_start = time - self.start_time;
        if !(since_start >= 0.0) {
            return 0.0;
        }
        // Earlier repetitions ended before `time`; step back one for rounding.
        let first = ((since_start - self.duration) / self.repeat_interval)
            .floor()
            .max(0.0) as usize;
        for rep in first.saturating_sub(1)..repetitions as usize {
            let rep_start = self.start_time + rep as f64 * self.repeat_interval;
            if rep_start > time {
                break;
            }
            if time < rep_start + self.duration {
                return self.envelope.level_at(time - rep_start, self.duration);
            }
        }
        0.0
    }
}

/// Everything needed to render a tone.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSpec {
    pub base_frequency: f64,
    /// Blend from pure sine (0.0) to square/saw (1.0).
    pub harmonic_content: f64,
    pub patterns: Vec<TonePattern>,
    /// Rendered length in seconds.
    pub duration: f64,
    pub sample_rate: u32,
    pub channels: usize,
    /// Master fade-in time in seconds.
    pub fade_in: f64,
    /// Master fade-out time in seconds.
    pub fade_out: f64,
}

impl ToneSpec {
    /// Derive a tone from a prompt and the labels an external classifier
    /// produced for it. All labels fall back to defaults.
    ///
    /// The base pitch is the genre's synth pitch scaled by the mood and the
    /// voice gender; fades follow the voice's attack and release.
    pub fn from_text(
        text: &str,
        intensity: f64,
        genre: &str,
        mood: &str,
        voice: Option<&str>,
        config: &SynthConfig,
    ) -> ToneSpec {
        let voice = voice.map_or_else(VoiceProfile::default_voice, resolve_voice);
        let base_frequency = resolve_genre_params(genre).synth_base_hz
            * resolve_mood(mood).frequency_multiplier()
            * voice.gender.frequency_multiplier();

        ToneSpec {
            base_frequency,
            harmonic_content: voice.harmonic_content,
            patterns: patterns_for_text(text, intensity),
            duration: config.duration,
            sample_rate: config.sample_rate,
            channels: config.channels,
            fade_in: voice.attack,
            fade_out: voice.release,
        }
    }
}

/// Patterns for a prompt: the base melody and intensity line always, a
/// fifth above for more than three words, a bass line for more than five.
pub fn patterns_for_text(text: &str, intensity: f64) -> Vec<TonePattern> {
    let words = text.split_whitespace().count();
    let intensity = if intensity.is_finite() { intensity.clamp(0.0, 1.0) } else { 0.5 };

    let pattern = |frequency_ratio, amplitude, (a, d, s, r), start_time, duration, repeat_interval| {
        TonePattern {
            frequency_ratio,
            amplitude,
            envelope: Envelope::new(a, d, s, r),
            start_time,
            duration,
            repeat_interval,
        }
    };

    let mut patterns = vec![pattern(1.0, 0.7, (0.05, 0.1, 0.6, 0.2), 0.0, 4.0, 0.5)];
    if words > 3 {
        patterns.push(pattern(1.5, 0.4, (0.1, 0.2, 0.3, 0.3), 0.25, 3.5, 1.0));
    }
    if words > 5 {
        patterns.push(pattern(0.5, 0.5, (0.15, 0.3, 0.4, 0.4), 0.5, 3.0, 1.5));
    }
    patterns.push(pattern(2.0, intensity * 0.5, (0.02, 0.1, 0.2, 0.1), 0.125, 3.75, 0.25));
    patterns
}

/// Oscillator bank for one pattern.
struct Voice {
    sine: Oscillator,
    square: Oscillator,
    saw: Oscillator,
}

impl Voice {
    fn new(frequency: f64, sample_rate: f64) -> Self {
        Voice {
            sine: Oscillator::with_frequency(Waveform::Sine, sample_rate, frequency),
            square: Oscillator::with_frequency(Waveform::Square, sample_rate, frequency * SQUARE_DETUNE),
            saw: Oscillator::with_frequency(Waveform::Sawtooth, sample_rate, frequency * SAW_DETUNE),
        }
    }

    #[inline]
    fn next_sample(&mut self, harmonic: f64) -> f64 {
        self.sine.next_sample() * (1.0 - harmonic)
            + self.square.next_sample() * harmonic * 0.5
            + self.saw.next_sample() * harmonic * 0.5
    }
}

/// Render a tone spec. Every channel carries the same signal.
pub fn synthesize(spec: &ToneSpec) -> SampleBuffer {
    let sample_rate = spec.sample_rate.max(1) as f64;
    let duration = if spec.duration.is_finite() { spec.duration.max(0.0) } else { 0.0 };
    let len = (duration * sample_rate).floor() as usize;
    let harmonic = spec.harmonic_content.clamp(0.0, 1.0);

    let mut voices: Vec<Voice> = spec
        .patterns
        .iter()
        .map(|p| Voice::new(spec.base_frequency * p.frequency_ratio, sample_rate))
        .collect();

    let mut mono = Vec::with_capacity(len);
    for i in 0..len {
        let t = i as f64 / sample_rate;
        let mut sample = 0.0;
        for (pattern, voice) in spec.patterns.iter().zip(voices.iter_mut()) {
            let wave = voice.next_sample(harmonic);
            sample += wave * pattern.level_at(t, duration) * pattern.amplitude;
        }
        let master = fade(t, spec.fade_in) * fade(duration - t, spec.fade_out);
        mono.push((sample * master * OUTPUT_SCALE).clamp(-1.0, 1.0) as f32);
    }

    log::debug!(
        "synthesized {len} frames from {} pattern(s) at {:.1} Hz",
        spec.patterns.len(),
        spec.base_frequency
    );
    SampleBuffer::new(vec![mono; spec.channels], spec.sample_rate)
}

/// Linear ramp reaching 1.0 after `length` seconds.
fn fade(elapsed: f64, length: f64) -> f64 {
    if length > 0.0 {
        (elapsed / length).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn config() -> SynthConfig {
        SynthConfig {
            sample_rate: 22050,
            duration: 4.0,
            channels: 2,
        }
    }

    fn goertzel(samples: &[f32], freq: f64, sample_rate: f64) -> f64 {
        let coeff = 2.0 * (2.0 * PI * freq / sample_rate).cos();
        let (mut s1, mut s2) = (0.0, 0.0);
        for &x in samples {
            let s = x as f64 + coeff * s1 - s2;
            s2 = s1;
            s1 = s;
        }
        s1 * s1 + s2 * s2 - coeff * s1 * s2
    }

    #[test]
    fn pattern_count_follows_word_count() {
        assert_eq!(patterns_for_text("", 0.5).len(), 2);
        assert_eq!(patterns_for_text("three little words", 0.5).len(), 2);
        assert_eq!(patterns_for_text("now four little words", 0.5).len(), 3);
        assert_eq!(patterns_for_text("one two three four five six", 0.5).len(), 4);
    }

    #[test]
    fn three_words_render_two_distinct_patterns() {
        let spec = ToneSpec::from_text("dance all night", 0.8, "Default", "", None, &config());
        let ratios: Vec<f64> = spec.patterns.iter().map(|p| p.frequency_ratio).collect();
        assert_eq!(ratios, vec![1.0, 2.0], "base melody plus intensity line");

        let out = synthesize(&spec);
        let left = out.channel(0).unwrap();
        let sr = out.sample_rate() as f64;
        let base = goertzel(left, spec.base_frequency, sr);
        let octave = goertzel(left, spec.base_frequency * 2.0, sr);
        let off = goertzel(left, spec.base_frequency * 1.37, sr);
        assert!(base > off * 10.0, "base tone missing: {base} vs {off}");
        assert!(octave > off * 10.0, "intensity tone missing: {octave} vs {off}");
    }

    #[test]
    fn shape_follows_config() {
        let spec = ToneSpec::from_text("hello there", 0.5, "Lo-Fi", "calm", Some("Robotic"), &config());
        let out = synthesize(&spec);
        assert_eq!(out.num_channels(), 2);
        assert_eq!(out.len(), 4 * 22050);
        assert_eq!(out.channel(0), out.channel(1));
    }

    #[test]
    fn base_frequency_combines_genre_mood_and_gender() {
        let spec = ToneSpec::from_text("x", 0.5, "R&B", "happy", Some("Male Pop"), &config());
        assert!((spec.base_frequency - 220.0 * 1.2 * 0.7).abs() < 1e-9, "got {}", spec.base_frequency);
        assert_eq!(spec.fade_in, 0.02);
        assert_eq!(spec.fade_out, 0.3);
    }

    #[test]
    fn output_in_range_and_faded() {
        let spec = ToneSpec::from_text(
            "a very long prompt with many words in it",
            1.0,
            "Trap",
            "aggressive",
            Some("Robotic"),
            &config(),
        );
        let out = synthesize(&spec);
        let left = out.channel(0).unwrap();
        assert_eq!(left[0], 0.0, "fade-in starts from silence");
        assert!(left.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(out.peak() > 0.05, "tone should be audible, peak {}", out.peak());
    }

    #[test]
    fn repetitions_gate_the_envelope() {
        let p = &patterns_for_text("", 1.0)[1];
        // Intensity line: onsets every 0.25 s from 0.125 s.
        assert_eq!(p.level_at(0.1, 4.0), 0.0, "before the first onset");
        assert!(p.level_at(0.135, 4.0) > 0.0);
        // Notes last 3.75 s, so the first one ends at 3.875 and the second
        // onset carries the tail.
        assert!(p.level_at(3.9, 4.0) > 0.0);
        assert_eq!(p.level_at(0.1, 0.2), 0.0, "no whole repetition fits");
    }

    /// Linear scan over every repetition, earliest window first.
    fn scanned_level(p: &TonePattern, time: f64, total: f64) -> f64 {
        let reps = ((total - p.start_time) / p.repeat_interval).floor();
        if !(reps >= 1.0) {
            return 0.0;
        }
        (0..reps as usize)
            .map(|rep| p.start_time + rep as f64 * p.repeat_interval)
            .find(|&start| time >= start && time < start + p.duration)
            .map_or(0.0, |start| p.envelope.level_at(time - start, p.duration))
    }

    #[test]
    fn level_matches_a_full_scan() {
        for p in patterns_for_text("one two three four five six", 0.9) {
            for total in [0.2, 1.0, 4.0, 12.5] {
                for step in 0..2000 {
                    let t = step as f64 * 0.007 - 0.1;
                    let fast = p.level_at(t, total);
                    let slow = scanned_level(&p, t, total);
                    assert_eq!(fast, slow, "ratio {} at t={t} of {total}s", p.frequency_ratio);
                }
            }
        }
    }

    #[test]
    fn long_renders_find_late_repetitions() {
        let p = &patterns_for_text("", 1.0)[1];
        let total = 3600.0;
        let onset = p.start_time + 10_000.0 * p.repeat_interval;
        assert!(p.level_at(onset + 0.01, total) > 0.0);
        assert_eq!(p.level_at(onset + 0.01, total), scanned_level(p, onset + 0.01, total));
    }

    #[test]
    fn zero_duration_is_empty() {
        let spec = ToneSpec {
            duration: 0.0,
            ..ToneSpec::from_text("hi", 0.5, "", "", None, &config())
        };
        let out = synthesize(&spec);
        assert!(out.is_empty());
        assert_eq!(out.num_channels(), 2);
    }
}
