//! Parameter tables: genres, track roles, voices and moods.
//!
//! Every lookup here is total: an unknown label resolves to a documented
//! default instead of failing. All values are constants resolved eagerly
//! into closed records, so nothing downstream has to guess at a missing
//! field.

use serde::{Deserialize, Serialize};

use crate::dsp::compressor::Compressor;

// ── Genre ───────────────────────────────────────────────────

/// Known musical styles. Anything else resolves to [`Genre::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Genre {
    Edm,
    DeepHouse,
    TechHouse,
    DiscoHouse,
    MinimalHouse,
    HardTechno,
    FutureGarage,
    Trap,
    Drill,
    HipHop,
    #[serde(rename = "rnb")]
    RnB,
    Rock,
    LoFi,
    DrumAndBass,
    Default,
}

impl Genre {
    pub const ALL: [Genre; 15] = [
        Genre::Edm,
        Genre::DeepHouse,
        Genre::TechHouse,
        Genre::DiscoHouse,
        Genre::MinimalHouse,
        Genre::HardTechno,
        Genre::FutureGarage,
        Genre::Trap,
        Genre::Drill,
        Genre::HipHop,
        Genre::RnB,
        Genre::Rock,
        Genre::LoFi,
        Genre::DrumAndBass,
        Genre::Default,
    ];

    /// Display name, as shown in genre pickers.
    pub fn name(self) -> &'static str {
        match self {
            Genre::Edm => "EDM",
            Genre::DeepHouse => "Deep House",
            Genre::TechHouse => "Tech House",
            Genre::DiscoHouse => "Disco House",
            Genre::MinimalHouse => "Minimal House",
            Genre::HardTechno => "Hard Techno",
            Genre::FutureGarage => "Future Garage",
            Genre::Trap => "Trap",
            Genre::Drill => "Drill",
            Genre::HipHop => "Hip Hop",
            Genre::RnB => "R&B",
            Genre::Rock => "Rock",
            Genre::LoFi => "Lo-Fi",
            Genre::DrumAndBass => "Drum and Bass",
            Genre::Default => "Default",
        }
    }

    /// Parse a label, ignoring case, spacing and `-`/`_` separators.
    /// Returns `None` for anything unrecognised.
    pub fn parse(label: &str) -> Option<Genre> {
        let key = normalize_label(label);
        let genre = match key.as_str() {
            "edm" | "electronic dance music" => Genre::Edm,
            "deep house" | "house" => Genre::DeepHouse,
            "tech house" => Genre::TechHouse,
            "disco house" => Genre::DiscoHouse,
            "minimal house" | "minimal" => Genre::MinimalHouse,
            "hard techno" | "techno" => Genre::HardTechno,
            "future garage" | "garage" => Genre::FutureGarage,
            "trap" => Genre::Trap,
            "drill" => Genre::Drill,
            "hip hop" | "hiphop" | "rap" => Genre::HipHop,
            "r&b" | "rnb" | "r and b" | "r n b" => Genre::RnB,
            "rock" => Genre::Rock,
            "lo fi" | "lofi" => Genre::LoFi,
            "drum and bass" | "drum & bass" | "drum n bass" | "dnb" | "d&b" => Genre::DrumAndBass,
            "default" => Genre::Default,
            _ => return None,
        };
        Some(genre)
    }

    /// Total variant of [`Genre::parse`].
    pub fn resolve(label: &str) -> Genre {
        Genre::parse(label).unwrap_or_else(|| {
            log::debug!("unknown genre {label:?}, using default profile");
            Genre::Default
        })
    }

    pub fn profile(self) -> GenreProfile {
        GenreProfile::for_genre(self)
    }
}

/// Reverb settings carried by a genre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverbParams {
    /// Decay time constant in seconds.
    pub decay_time: f64,
    pub wet_mix: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayParams {
    pub mix: f64,
    /// Delay time in seconds.
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TremoloParams {
    pub amount: f64,
    /// LFO rate in Hz.
    pub rate: f64,
}

/// Fully resolved DSP parameters for one genre.
///
/// Optional fields are `None` for genres outside the matching allowlist;
/// a `None` stage is never built, whatever the role or voice says.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreProfile {
    pub genre: Genre,
    pub bass_db: f64,
    pub mid_db: f64,
    pub treble_db: f64,
    /// Compression amount, 0.0 to 1.0.
    pub compression: f64,
    pub compressor_threshold: f64,
    pub compressor_ratio: f64,
    pub distortion: Option<f64>,
    pub reverb: Option<ReverbParams>,
    pub stereo_width: Option<f64>,
    pub output_gain: f64,
    /// One-pole low-pass coefficient; 1.0 leaves the signal open.
    pub lowpass: f64,
    /// High-pass amount; 0.0 disables the stage.
    pub highpass: f64,
    pub delay: Option<DelayParams>,
    pub chorus: Option<f64>,
    pub bitcrush: Option<f64>,
    pub tremolo: Option<TremoloParams>,
    /// Base pitch the synthesizer uses for this genre.
    pub synth_base_hz: f64,
}

impl GenreProfile {
    /// The fallback profile: light compression, everything else neutral.
    pub const DEFAULT: GenreProfile = GenreProfile {
        genre: Genre::Default,
        bass_db: 0.0,
        mid_db: 0.0,
        treble_db: 0.0,
        compression: 0.4,
        compressor_threshold: 0.38,
        compressor_ratio: 4.6,
        distortion: None,
        reverb: None,
        stereo_width: None,
        output_gain: 1.0,
        lowpass: 1.0,
        highpass: 0.0,
        delay: None,
        chorus: None,
        bitcrush: None,
        tremolo: None,
        synth_base_hz: 440.0,
    };

    pub fn for_genre(genre: Genre) -> GenreProfile {
        let base = GenreProfile::DEFAULT;
        let house = GenreProfile {
            compression: 0.6,
            stereo_width: Some(1.3),
            lowpass: 0.7,
            highpass: 0.2,
            delay: Some(DelayParams { mix: 0.3, time: 0.25 }),
            chorus: Some(0.15),
            tremolo: Some(TremoloParams { amount: 0.4, rate: 4.0 }),
            synth_base_hz: 110.0,
            ..base
        };

        let profile = match genre {
            Genre::Edm => GenreProfile {
                bass_db: 8.0,
                mid_db: -3.0,
                treble_db: 6.0,
                compression: 0.8,
                distortion: Some(0.2),
                stereo_width: Some(1.5),
                output_gain: 1.3,
                highpass: 0.3,
                delay: Some(DelayParams { mix: 0.3, time: 0.125 }),
                tremolo: Some(TremoloParams { amount: 0.7, rate: 8.0 }),
                ..base
            },
            Genre::DeepHouse => GenreProfile {
                bass_db: 6.0,
                reverb: Some(ReverbParams { decay_time: 1.8, wet_mix: 0.35 }),
                ..house
            },
            Genre::TechHouse => GenreProfile {
                bass_db: 6.0,
                ..house
            },
            Genre::DiscoHouse => GenreProfile {
                treble_db: 6.0,
                reverb: Some(ReverbParams { decay_time: 1.2, wet_mix: 0.35 }),
                ..house
            },
            Genre::MinimalHouse => GenreProfile {
                stereo_width: None,
                ..house
            },
            Genre::HardTechno => GenreProfile {
                bass_db: 8.0,
                mid_db: -3.0,
                treble_db: 6.0,
                compression: 0.8,
                distortion: Some(0.4),
                output_gain: 1.3,
                highpass: 0.4,
                delay: Some(DelayParams { mix: 0.4, time: 0.125 }),
                bitcrush: Some(0.3),
                tremolo: Some(TremoloParams { amount: 0.5, rate: 16.0 }),
                ..base
            },
            Genre::FutureGarage => GenreProfile {
                compression: 0.5,
                stereo_width: Some(1.4),
                lowpass: 0.6,
                delay: Some(DelayParams { mix: 0.5, time: 0.25 }),
                chorus: Some(0.3),
                ..base
            },
            Genre::Trap => GenreProfile {
                bass_db: 12.0,
                mid_db: -4.0,
                treble_db: 3.0,
                compression: 0.7,
                distortion: Some(0.3),
                output_gain: 1.2,
                lowpass: 0.7,
                delay: Some(DelayParams { mix: 0.2, time: 0.125 }),
                tremolo: Some(TremoloParams { amount: 0.6, rate: 8.0 }),
                synth_base_hz: 55.0,
                ..base
            },
            Genre::Drill => GenreProfile {
                bass_db: 12.0,
                mid_db: -4.0,
                treble_db: 3.0,
                compression: 0.9,
                distortion: Some(0.3),
                output_gain: 1.2,
                lowpass: 0.6,
                delay: Some(DelayParams { mix: 0.3, time: 0.1667 }),
                tremolo: Some(TremoloParams { amount: 0.8, rate: 16.0 }),
                ..base
            },
            Genre::HipHop => GenreProfile {
                bass_db: 12.0,
                compression: 0.7,
                output_gain: 1.2,
                lowpass: 0.7,
                delay: Some(DelayParams { mix: 0.2, time: 0.25 }),
                synth_base_hz: 165.0,
                ..base
            },
            Genre::RnB => GenreProfile {
                bass_db: 5.0,
                mid_db: 2.0,
                treble_db: 2.0,
                compression: 0.6,
                reverb: Some(ReverbParams { decay_time: 1.5, wet_mix: 0.3 }),
                lowpass: 0.8,
                delay: Some(DelayParams { mix: 0.2, time: 0.333 }),
                chorus: Some(0.2),
                synth_base_hz: 220.0,
                ..base
            },
            Genre::Rock => GenreProfile {
                bass_db: 4.0,
                mid_db: 6.0,
                treble_db: 4.0,
                compression: 0.8,
                distortion: Some(0.6),
                output_gain: 1.1,
                ..base
            },
            Genre::LoFi => GenreProfile {
                bass_db: 3.0,
                mid_db: -2.0,
                treble_db: -6.0,
                compression: 0.4,
                reverb: Some(ReverbParams { decay_time: 2.0, wet_mix: 0.4 }),
                output_gain: 0.9,
                lowpass: 0.4,
                chorus: Some(0.3),
                bitcrush: Some(0.7),
                synth_base_hz: 330.0,
                ..base
            },
            Genre::DrumAndBass => GenreProfile {
                compression: 0.8,
                output_gain: 1.1,
                lowpass: 0.8,
                delay: Some(DelayParams { mix: 0.2, time: 0.0833 }),
                ..base
            },
            Genre::Default => base,
        };

        let (compressor_threshold, compressor_ratio) =
            Compressor::params_for_amount(profile.compression);
        GenreProfile {
            genre,
            compressor_threshold,
            compressor_ratio,
            ..profile
        }
    }

    pub fn name(&self) -> &'static str {
        self.genre.name()
    }
}

/// Resolve a free-form genre label to its profile. Never fails.
pub fn resolve_genre_params(label: &str) -> GenreProfile {
    Genre::resolve(label).profile()
}

// ── Track role ──────────────────────────────────────────────

/// What a track carries in the mix; biases the genre parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackRole {
    Vocal,
    Drums,
    Bass,
    Melody,
    Fx,
    Synth,
    Generic,
}

impl TrackRole {
    /// Role assignment for stems that arrive without labels, by position.
    const BY_INDEX: [TrackRole; 6] = [
        TrackRole::Vocal,
        TrackRole::Drums,
        TrackRole::Bass,
        TrackRole::Melody,
        TrackRole::Fx,
        TrackRole::Synth,
    ];

    /// Parse a role label. Plural and common alias forms are accepted;
    /// anything else is [`TrackRole::Generic`].
    pub fn parse(label: &str) -> TrackRole {
        match normalize_label(label).as_str() {
            "vocal" | "vocals" | "voice" | "vox" => TrackRole::Vocal,
            "drum" | "drums" | "percussion" | "beat" | "beats" => TrackRole::Drums,
            "bass" | "bassline" | "sub" => TrackRole::Bass,
            "melody" | "melodies" | "lead" | "keys" => TrackRole::Melody,
            "fx" | "sfx" | "effect" | "effects" => TrackRole::Fx,
            "synth" | "synths" | "pad" | "pads" => TrackRole::Synth,
            "" | "generic" | "other" => TrackRole::Generic,
            other => {
                log::debug!("unknown track role {other:?}, treating as generic");
                TrackRole::Generic
            }
        }
    }

    /// Role for the `index`-th unlabelled stem (vocals, drums, bass,
    /// melody, fx, synth, then around again).
    pub fn for_track_index(index: usize) -> TrackRole {
        Self::BY_INDEX[index % Self::BY_INDEX.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            TrackRole::Vocal => "vocal",
            TrackRole::Drums => "drums",
            TrackRole::Bass => "bass",
            TrackRole::Melody => "melody",
            TrackRole::Fx => "fx",
            TrackRole::Synth => "synth",
            TrackRole::Generic => "generic",
        }
    }
}

/// Role-specific scales and offsets applied on top of a genre profile.
///
/// Scales multiply the genre value, boosts add to it. A scale of 0 can
/// remove a stage for a role, but nothing here can add a stage the genre
/// does not already have.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAdjustment {
    pub role: TrackRole,
    pub distortion_scale: f64,
    pub compression_boost: f64,
    /// Upper bound on the low-pass coefficient for this role.
    pub forced_lowpass: Option<f64>,
    pub highpass_scale: f64,
    pub highpass_boost: f64,
    pub reverb_scale: f64,
    pub delay_scale: f64,
    pub chorus_scale: f64,
    pub bitcrush_scale: f64,
    pub tremolo_scale: f64,
    /// Scales the deviation of the stereo width from 1.0.
    pub width_scale: f64,
}

impl RoleAdjustment {
    pub const GENERIC: RoleAdjustment = RoleAdjustment {
        role: TrackRole::Generic,
        distortion_scale: 1.0,
        compression_boost: 0.0,
        forced_lowpass: None,
        highpass_scale: 1.0,
        highpass_boost: 0.0,
        reverb_scale: 1.0,
        delay_scale: 1.0,
        chorus_scale: 1.0,
        bitcrush_scale: 1.0,
        tremolo_scale: 0.0,
        width_scale: 1.0,
    };

    pub fn for_role(role: TrackRole) -> RoleAdjustment {
        let generic = RoleAdjustment {
            role,
            ..RoleAdjustment::GENERIC
        };
        match role {
            TrackRole::Vocal => RoleAdjustment {
                distortion_scale: 0.5,
                compression_boost: 0.05,
                reverb_scale: 1.3,
                chorus_scale: 1.5,
                bitcrush_scale: 0.5,
                ..generic
            },
            TrackRole::Drums => RoleAdjustment {
                compression_boost: 0.15,
                highpass_boost: 0.1,
                reverb_scale: 0.8,
                delay_scale: 0.5,
                chorus_scale: 0.0,
                ..generic
            },
            TrackRole::Bass => RoleAdjustment {
                distortion_scale: 1.2,
                compression_boost: 0.05,
                forced_lowpass: Some(0.15),
                highpass_scale: 0.0,
                reverb_scale: 0.5,
                delay_scale: 0.5,
                chorus_scale: 0.0,
                width_scale: 0.0,
                ..generic
            },
            TrackRole::Melody => RoleAdjustment {
                distortion_scale: 0.8,
                tremolo_scale: 0.5,
                ..generic
            },
            TrackRole::Fx => RoleAdjustment {
                highpass_boost: 0.3,
                delay_scale: 2.0,
                chorus_scale: 2.0,
                bitcrush_scale: 1.3,
                tremolo_scale: 0.5,
                ..generic
            },
            TrackRole::Synth => RoleAdjustment {
                distortion_scale: 1.2,
                chorus_scale: 2.0,
                tremolo_scale: 1.0,
                ..generic
            },
            TrackRole::Generic => generic,
        }
    }
}

/// Biasing for a role. Total: every role, including generic, has one.
pub fn resolve_role_bias(role: TrackRole) -> RoleAdjustment {
    RoleAdjustment::for_role(role)
}

// ── Voice ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

impl Gender {
    /// Pitch scaling the synthesizer applies for this voice gender.
    pub fn frequency_multiplier(self) -> f64 {
        match self {
            Gender::Male => 0.7,
            Gender::Female => 1.3,
            Gender::Neutral => 1.0,
        }
    }
}

/// How strongly a voice wants each effect, each 0.0 to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectPreferences {
    pub reverb: f64,
    pub delay: f64,
    pub distortion: f64,
    pub compression: f64,
    pub chorus: f64,
}

impl EffectPreferences {
    /// Multiplier a preference applies to an eligible stage amount.
    /// A neutral 0.5 preference leaves the amount unchanged.
    pub fn scale(pref: f64) -> f64 {
        0.5 + pref.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    pub name: &'static str,
    pub gender: Gender,
    pub base_frequency: f64,
    pub harmonic_content: f64,
    /// Attack time in seconds.
    pub attack: f64,
    /// Release time in seconds.
    pub release: f64,
    pub preferences: EffectPreferences,
}

const fn voice(
    name: &'static str,
    gender: Gender,
    base_frequency: f64,
    harmonic_content: f64,
    attack: f64,
    release: f64,
    prefs: [f64; 5],
) -> VoiceProfile {
    VoiceProfile {
        name,
        gender,
        base_frequency,
        harmonic_content,
        attack,
        release,
        preferences: EffectPreferences {
            reverb: prefs[0],
            delay: prefs[1],
            distortion: prefs[2],
            compression: prefs[3],
            chorus: prefs[4],
        },
    }
}

/// The built-in voices. The last entry is the fallback.
pub const VOICE_CATALOG: [VoiceProfile; 7] = [
    voice("Male Pop", Gender::Male, 110.0, 0.7, 0.02, 0.3, [0.3, 0.2, 0.4, 0.7, 0.3]),
    voice("Female RnB", Gender::Female, 220.0, 0.5, 0.05, 0.5, [0.6, 0.4, 0.2, 0.8, 0.5]),
    voice("Robotic", Gender::Neutral, 180.0, 0.9, 0.01, 0.1, [0.2, 0.3, 0.8, 0.5, 0.1]),
    voice("Soft Lofi", Gender::Female, 200.0, 0.3, 0.08, 0.7, [0.7, 0.5, 0.3, 0.4, 0.2]),
    voice("Anime Style", Gender::Female, 260.0, 0.4, 0.03, 0.4, [0.5, 0.3, 0.1, 0.6, 0.7]),
    voice("Auto Harmony", Gender::Neutral, 165.0, 0.6, 0.04, 0.6, [0.4, 0.6, 0.2, 0.5, 0.9]),
    voice("Default", Gender::Neutral, 165.0, 0.5, 0.05, 0.4, [0.4, 0.3, 0.3, 0.5, 0.4]),
];

impl VoiceProfile {
    pub fn default_voice() -> VoiceProfile {
        VOICE_CATALOG[VOICE_CATALOG.len() - 1]
    }

    /// Look up a voice by name, ignoring case and separators, so
    /// "male-pop", "Male Pop" and "malepop" all match. Never fails.
    pub fn by_name(name: &str) -> VoiceProfile {
        let key = compact_label(name);
        VOICE_CATALOG
            .iter()
            .find(|v| compact_label(v.name) == key)
            .copied()
            .unwrap_or_else(|| {
                log::debug!("unknown voice {name:?}, using default voice");
                VoiceProfile::default_voice()
            })
    }
}

pub fn resolve_voice(name: &str) -> VoiceProfile {
    VoiceProfile::by_name(name)
}

// ── Mood ────────────────────────────────────────────────────

/// Emotional color of a text prompt, as labelled by an external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Calm,
    Aggressive,
    Romantic,
    Neutral,
}

impl Mood {
    pub fn frequency_multiplier(self) -> f64 {
        match self {
            Mood::Happy => 1.2,
            Mood::Sad => 0.8,
            Mood::Energetic => 1.5,
            Mood::Calm => 0.6,
            Mood::Aggressive => 2.0,
            Mood::Romantic | Mood::Neutral => 1.0,
        }
    }
}

pub fn resolve_mood(label: &str) -> Mood {
    match normalize_label(label).as_str() {
        "happy" => Mood::Happy,
        "sad" => Mood::Sad,
        "energetic" => Mood::Energetic,
        "calm" => Mood::Calm,
        "aggressive" => Mood::Aggressive,
        "romantic" => Mood::Romantic,
        _ => Mood::Neutral,
    }
}

// ── Label helpers ───────────────────────────────────────────

/// Lowercase, turn `-`/`_` into spaces and collapse runs of whitespace.
fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase alphanumerics only.
fn compact_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
