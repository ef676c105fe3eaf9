//! Effect chain builder: turns a (genre, role, voice) selection into an
//! ordered list of processing stages.
//!
//! The stage order is fixed and is what gives each genre its sound:
//!
//! 1. EQ: high-pass, low-pass, low shelf, mid peak, high shelf
//! 2. compressor (always)
//! 3. distortion (distortion allowlist only)
//! 4. bit crusher, tremolo
//! 5. reverb (reverb allowlist only)
//! 6. delay, chorus
//! 7. stereo width (width allowlist only)
//! 8. output gain (always)
//!
//! A stage whose resolved amount is zero is left out entirely.

use serde::Serialize;

use crate::dsp::compressor::Compressor;
use crate::profile::{
    resolve_genre_params, resolve_role_bias, resolve_voice, EffectPreferences, GenreProfile,
    RoleAdjustment, TrackRole, VoiceProfile,
};

/// Center frequency of the bass shelf.
pub const LOW_SHELF_HZ: f64 = 200.0;
/// Center frequency of the mid peak.
pub const MID_PEAK_HZ: f64 = 1000.0;
/// Center frequency of the treble shelf.
pub const HIGH_SHELF_HZ: f64 = 3000.0;
const SHELF_Q: f64 = 0.707;
const PEAK_Q: f64 = 1.0;

/// Feedback used by delay stages unless overridden.
pub const DEFAULT_DELAY_FEEDBACK: f64 = 0.5;
/// Delay wet level is never pushed beyond this, whatever the role asks.
const MAX_DELAY_MIX: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EqBand {
    LowShelf,
    Peaking,
    HighShelf,
}

/// Which primitive a stage runs, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    HighPass,
    LowPass,
    Equalizer,
    Compressor,
    Distortion,
    BitCrush,
    Tremolo,
    Reverb,
    Delay,
    Chorus,
    StereoWidth,
    OutputGain,
}

/// One step of an effect chain with fully resolved parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Stage {
    HighPass { amount: f64 },
    LowPass { coefficient: f64 },
    #[serde(rename_all = "camelCase")]
    Equalizer { band: EqBand, frequency: f64, q: f64, gain_db: f64 },
    Compressor { threshold: f64, ratio: f64 },
    Distortion { amount: f64 },
    BitCrush { amount: f64 },
    Tremolo { amount: f64, rate: f64 },
    #[serde(rename_all = "camelCase")]
    Reverb { decay_time: f64, wet_mix: f64 },
    Delay { time: f64, feedback: f64, mix: f64 },
    Chorus { amount: f64 },
    StereoWidth { width: f64 },
    OutputGain { gain: f64 },
}

impl Stage {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Stage::HighPass { .. } => PrimitiveKind::HighPass,
            Stage::LowPass { .. } => PrimitiveKind::LowPass,
            Stage::Equalizer { .. } => PrimitiveKind::Equalizer,
            Stage::Compressor { .. } => PrimitiveKind::Compressor,
            Stage::Distortion { .. } => PrimitiveKind::Distortion,
            Stage::BitCrush { .. } => PrimitiveKind::BitCrush,
            Stage::Tremolo { .. } => PrimitiveKind::Tremolo,
            Stage::Reverb { .. } => PrimitiveKind::Reverb,
            Stage::Delay { .. } => PrimitiveKind::Delay,
            Stage::Chorus { .. } => PrimitiveKind::Chorus,
            Stage::StereoWidth { .. } => PrimitiveKind::StereoWidth,
            Stage::OutputGain { .. } => PrimitiveKind::OutputGain,
        }
    }
}

/// An ordered list of stages. Built fresh for every processing call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffectChain {
    stages: Vec<Stage>,
}

impl EffectChain {
    /// Wrap an explicit stage list. No reordering or gating is applied.
    pub fn new(stages: Vec<Stage>) -> Self {
        EffectChain { stages }
    }

    /// Build the chain for resolved parameters.
    pub fn build(
        profile: &GenreProfile,
        role: &RoleAdjustment,
        voice: Option<&VoiceProfile>,
    ) -> EffectChain {
        let prefs = voice.map(|v| v.preferences);
        let pref_scale = |pick: fn(&EffectPreferences) -> f64| {
            prefs.as_ref().map_or(1.0, |p| EffectPreferences::scale(pick(p)))
        };
        let mut stages = Vec::new();

        // EQ / filters
        if profile.highpass > 0.0 {
            let amount = unit(profile.highpass * role.highpass_scale + role.highpass_boost);
            if amount > 0.0 && role.highpass_scale > 0.0 {
                stages.push(Stage::HighPass { amount });
            }
        }
        let lowpass = role
            .forced_lowpass
            .map_or(profile.lowpass, |forced| profile.lowpass.min(forced));
        if lowpass < 1.0 {
            stages.push(Stage::LowPass {
                coefficient: lowpass.max(0.0),
            });
        }
        for (band, frequency, q, gain_db) in [
            (EqBand::LowShelf, LOW_SHELF_HZ, SHELF_Q, profile.bass_db),
            (EqBand::Peaking, MID_PEAK_HZ, PEAK_Q, profile.mid_db),
            (EqBand::HighShelf, HIGH_SHELF_HZ, SHELF_Q, profile.treble_db),
        ] {
            if gain_db != 0.0 {
                stages.push(Stage::Equalizer {
                    band,
                    frequency,
                    q,
                    gain_db,
                });
            }
        }

        // Dynamics
        let voice_shift = prefs.map_or(0.0, |p| (p.compression - 0.5) * 0.4);
        let compression = unit(profile.compression + role.compression_boost + voice_shift);
        let (threshold, ratio) = Compressor::params_for_amount(compression);
        stages.push(Stage::Compressor { threshold, ratio });

        if let Some(drive) = profile.distortion {
            let amount = unit(drive * role.distortion_scale * pref_scale(|p| p.distortion));
            if amount > 0.0 {
                stages.push(Stage::Distortion { amount });
            }
        }

        // Character
        if let Some(crush) = profile.bitcrush {
            let amount = unit(crush * role.bitcrush_scale);
            if amount > 0.0 {
                stages.push(Stage::BitCrush { amount });
            }
        }
        if let Some(trem) = profile.tremolo {
            let amount = unit(trem.amount * role.tremolo_scale);
            if amount > 0.0 {
                stages.push(Stage::Tremolo {
                    amount,
                    rate: trem.rate,
                });
            }
        }

        // Space
        if let Some(reverb) = profile.reverb {
            let wet_mix = unit(reverb.wet_mix * role.reverb_scale * pref_scale(|p| p.reverb));
            if wet_mix > 0.0 {
                stages.push(Stage::Reverb {
                    decay_time: reverb.decay_time,
                    wet_mix,
                });
            }
        }
        if let Some(delay) = profile.delay {
            let mix = (delay.mix * role.delay_scale * pref_scale(|p| p.delay)).clamp(0.0, MAX_DELAY_MIX);
            if mix > 0.0 {
                stages.push(Stage::Delay {
                    time: delay.time,
                    feedback: DEFAULT_DELAY_FEEDBACK,
                    mix,
                });
            }
        }
        if let Some(chorus) = profile.chorus {
            let amount = unit(chorus * role.chorus_scale * pref_scale(|p| p.chorus));
            if amount > 0.0 {
                stages.push(Stage::Chorus { amount });
            }
        }

        if let Some(width) = profile.stereo_width {
            let width = 1.0 + (width - 1.0) * role.width_scale;
            if width != 1.0 {
                stages.push(Stage::StereoWidth { width });
            }
        }

        stages.push(Stage::OutputGain {
            gain: profile.output_gain,
        });

        log::debug!(
            "built {} chain for role {}: {:?}",
            profile.name(),
            role.role.name(),
            stages.iter().map(Stage::kind).collect::<Vec<_>>()
        );
        EffectChain { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn kinds(&self) -> Vec<PrimitiveKind> {
        self.stages.iter().map(Stage::kind).collect()
    }

    pub fn contains(&self, kind: PrimitiveKind) -> bool {
        self.stages.iter().any(|s| s.kind() == kind)
    }

    /// Whether processing with this chain draws random numbers.
    pub fn is_stochastic(&self) -> bool {
        self.contains(PrimitiveKind::Reverb)
    }

    /// Replace the feedback of every delay stage.
    pub fn with_delay_feedback(mut self, feedback: f64) -> Self {
        for stage in self.stages.iter_mut() {
            if let Stage::Delay { feedback: fb, .. } = stage {
                *fb = feedback;
            }
        }
        self
    }

    /// The first `n` stages, as their own chain.
    pub fn prefix(&self, n: usize) -> EffectChain {
        EffectChain {
            stages: self.stages[..n.min(self.stages.len())].to_vec(),
        }
    }
}

/// Build a chain from open-string labels. Unknown labels fall back to the
/// default genre, the generic role and the default voice.
pub fn build_chain(genre: &str, role: &str, voice: Option<&str>) -> EffectChain {
    let profile = resolve_genre_params(genre);
    let adjustment = resolve_role_bias(TrackRole::parse(role));
    let voice = voice.map(resolve_voice);
    EffectChain::build(&profile, &adjustment, voice.as_ref())
}

fn unit(value: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}
