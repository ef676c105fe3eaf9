//! Per-sample processor: runs every channel of a buffer through an
//! effect chain.
//!
//! Each channel gets fresh primitive state (filter memory, delay lines,
//! random source) and is walked sample by sample in order. Stereo width is
//! the one stage that needs both channels of a frame at once, so the chain
//! is split at width stages into per-channel segments with frame-level
//! steps in between.
//!
//! Work happens in blocks of `block_size` frames; a [`CancelToken`] is
//! checked before each block so an interactive caller can abandon a long
//! render without waiting for it to finish.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::buffer::SampleBuffer;
use crate::chain::{EffectChain, EqBand, Stage};
use crate::config::RenderConfig;
use crate::dsp::bitcrush::BitCrusher;
use crate::dsp::chorus::Chorus;
use crate::dsp::compressor::Compressor;
use crate::dsp::delay::Delay;
use crate::dsp::distortion::Distortion;
use crate::dsp::filter::{BiquadFilter, FilterType, OnePoleHighPass, OnePoleLowPass};
use crate::dsp::reverb::Reverb;
use crate::dsp::stereo::StereoWidth;
use crate::dsp::tremolo::Tremolo;
use crate::error::ProcessError;

/// Shared flag a caller raises to stop an in-flight render.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ── Stage state ─────────────────────────────────────────────

/// A chain stage instantiated with its per-channel state.
#[derive(Debug, Clone)]
enum ActiveStage {
    HighPass(OnePoleHighPass),
    LowPass(OnePoleLowPass),
    Equalizer(BiquadFilter),
    Compressor(Compressor),
    Distortion(Distortion),
    BitCrush(BitCrusher),
    Tremolo(Tremolo),
    Reverb(Reverb, StdRng),
    Delay(Delay),
    Chorus(Chorus),
    Gain(f64),
}

impl ActiveStage {
    fn new(stage: &Stage, sample_rate: f64, rng: impl FnOnce() -> StdRng) -> Option<Self> {
        let active = match *stage {
            Stage::HighPass { amount } => ActiveStage::HighPass(OnePoleHighPass::new(amount)),
            Stage::LowPass { coefficient } => ActiveStage::LowPass(OnePoleLowPass::new(coefficient)),
            Stage::Equalizer {
                band,
                frequency,
                q,
                gain_db,
            } => {
                let filter_type = match band {
                    EqBand::LowShelf => FilterType::LowShelf,
                    EqBand::Peaking => FilterType::Peaking,
                    EqBand::HighShelf => FilterType::HighShelf,
                };
                ActiveStage::Equalizer(BiquadFilter::with_params(
                    filter_type,
                    sample_rate,
                    frequency,
                    q,
                    gain_db,
                ))
            }
            Stage::Compressor { threshold, ratio } => {
                ActiveStage::Compressor(Compressor::with_params(threshold, ratio))
            }
            Stage::Distortion { amount } => ActiveStage::Distortion(Distortion::with_amount(amount)),
            Stage::BitCrush { amount } => ActiveStage::BitCrush(BitCrusher::with_amount(amount)),
            Stage::Tremolo { amount, rate } => ActiveStage::Tremolo(Tremolo::with_params(amount, rate)),
            Stage::Reverb {
                decay_time,
                wet_mix,
            } => ActiveStage::Reverb(Reverb::with_params(decay_time, wet_mix), rng()),
            Stage::Delay {
                time,
                feedback,
                mix,
            } => ActiveStage::Delay(Delay::with_params(sample_rate, time, feedback, mix)),
            Stage::Chorus { amount } => ActiveStage::Chorus(Chorus::with_amount(sample_rate, amount)),
            Stage::OutputGain { gain } => {
                ActiveStage::Gain(if gain.is_finite() { gain } else { 1.0 })
            }
            // Frame-level; handled between segments.
            Stage::StereoWidth { .. } => return None,
        };
        Some(active)
    }

    #[inline]
    fn process(&mut self, x: f64, n: usize, t: f64, original: &[f64]) -> f64 {
        match self {
            ActiveStage::HighPass(f) => f.process(x),
            ActiveStage::LowPass(f) => f.process(x),
            ActiveStage::Equalizer(f) => f.process(x),
            ActiveStage::Compressor(c) => c.process(x),
            ActiveStage::Distortion(d) => d.process(x),
            ActiveStage::BitCrush(b) => b.process(x),
            ActiveStage::Tremolo(tr) => tr.process(x, t),
            ActiveStage::Reverb(r, rng) => r.process(x, t, rng),
            ActiveStage::Delay(d) => d.process(x),
            ActiveStage::Chorus(c) => c.process(x, original, n),
            ActiveStage::Gain(g) => x * *g,
        }
    }
}

/// A run of the chain between stereo width stages.
#[derive(Debug, Clone)]
enum Segment {
    /// Per-channel stages, one state list per channel.
    Channels(Vec<Vec<ActiveStage>>),
    Width(StereoWidth),
}

// ── Processor ───────────────────────────────────────────────

/// Applies effect chains to sample buffers.
#[derive(Debug, Clone)]
pub struct Processor {
    block_size: usize,
    reverb_seed: Option<u64>,
}

impl Default for Processor {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

impl Processor {
    pub fn new(block_size: usize, reverb_seed: Option<u64>) -> Self {
        Processor {
            block_size: block_size.max(1),
            reverb_seed,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.block_size, config.reverb_seed)
    }

    /// Process without a cancel token. Cannot fail.
    pub fn process(&self, buffer: &SampleBuffer, chain: &EffectChain) -> SampleBuffer {
        let never = CancelToken::new();
        match self.process_with_cancel(buffer, chain, &never) {
            Ok(out) => out,
            // Unreachable: nothing else holds the token.
            Err(ProcessError::Cancelled { .. }) => SampleBuffer::silent(
                buffer.num_channels(),
                buffer.len(),
                buffer.sample_rate(),
            ),
        }
    }

    /// Process `buffer` into a new buffer of the same shape, checking
    /// `cancel` before each block.
    pub fn process_with_cancel(
        &self,
        buffer: &SampleBuffer,
        chain: &EffectChain,
        cancel: &CancelToken,
    ) -> Result<SampleBuffer, ProcessError> {
        let num_channels = buffer.num_channels();
        let len = buffer.len();
        if num_channels == 0 || len == 0 {
            return Ok(SampleBuffer::silent(num_channels, 0, buffer.sample_rate()));
        }

        let sample_rate = buffer.sample_rate().max(1) as f64;
        let original = sanitize(buffer);
        let mut work = original.clone();
        let mut segments = self.instantiate(chain, num_channels, sample_rate);

        let mut start = 0;
        while start < len {
            if cancel.is_cancelled() {
                log::debug!("render cancelled at frame {start} of {len}");
                return Err(ProcessError::Cancelled {
                    samples_done: start,
                });
            }
            let end = (start + self.block_size).min(len);
            for segment in segments.iter_mut() {
                match segment {
                    Segment::Channels(per_channel) => {
                        for (ch, stages) in per_channel.iter_mut().enumerate() {
                            let samples = &mut work[ch];
                            let dry = &original[ch];
                            for n in start..end {
                                let t = n as f64 / sample_rate;
                                let mut x = samples[n];
                                for stage in stages.iter_mut() {
                                    x = stage.process(x, n, t, dry);
                                }
                                samples[n] = x;
                            }
                        }
                    }
                    Segment::Width(width) => {
                        if let [left, right] = work.as_mut_slice() {
                            for n in start..end {
                                let (l, r) = width.process(left[n], right[n]);
                                left[n] = l;
                                right[n] = r;
                            }
                        }
                    }
                }
            }
            start = end;
        }

        let channels = work
            .into_iter()
            .map(|ch| ch.into_iter().map(finalize).collect())
            .collect();
        Ok(SampleBuffer::new(channels, buffer.sample_rate()))
    }

    fn instantiate(&self, chain: &EffectChain, num_channels: usize, sample_rate: f64) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut pending: Vec<Stage> = Vec::new();

        for stage in chain.stages() {
            if let Stage::StereoWidth { width } = *stage {
                if !pending.is_empty() {
                    segments.push(self.channel_segment(&pending, num_channels, sample_rate));
                    pending.clear();
                }
                segments.push(Segment::Width(StereoWidth::new(width)));
            } else {
                pending.push(*stage);
            }
        }
        if !pending.is_empty() {
            segments.push(self.channel_segment(&pending, num_channels, sample_rate));
        }
        segments
    }

    fn channel_segment(&self, stages: &[Stage], num_channels: usize, sample_rate: f64) -> Segment {
        let per_channel = (0..num_channels)
            .map(|ch| {
                stages
                    .iter()
                    .filter_map(|stage| ActiveStage::new(stage, sample_rate, || self.reverb_rng(ch)))
                    .collect()
            })
            .collect();
        Segment::Channels(per_channel)
    }

    fn reverb_rng(&self, channel: usize) -> StdRng {
        match self.reverb_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(channel as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

/// Process with the default configuration.
pub fn process(buffer: &SampleBuffer, chain: &EffectChain) -> SampleBuffer {
    Processor::default().process(buffer, chain)
}

/// Widen to f64, replacing non-finite samples with silence.
fn sanitize(buffer: &SampleBuffer) -> Vec<Vec<f64>> {
    let mut replaced = 0usize;
    let channels = buffer
        .channels()
        .iter()
        .map(|ch| {
            ch.iter()
                .map(|&s| {
                    if s.is_finite() {
                        s as f64
                    } else {
                        replaced += 1;
                        0.0
                    }
                })
                .collect()
        })
        .collect();
    if replaced > 0 {
        log::warn!("replaced {replaced} non-finite input sample(s) with silence");
    }
    channels
}

#[inline]
fn finalize(x: f64) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(-1.0, 1.0) as f32 }
}
