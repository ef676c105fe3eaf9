//! Remix session: the boundary the host talks to.
//!
//! A [`Remixer`] owns a render configuration and a decode source. Each call
//! decodes the upload, builds a fresh chain for the selection, processes
//! and re-encodes. Nothing is shared between calls.

use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::chain::{build_chain, EffectChain};
use crate::codec::{encode, DecodeSource, EncodedAudioBlob, WavCodec};
use crate::config::RenderConfig;
use crate::error::{ProcessError, RemixError};
use crate::processor::{CancelToken, Processor};
use crate::profile::TrackRole;
use crate::synth::{synthesize, ToneSpec};

/// What the user picked: a genre, a track role and optionally a voice.
/// All three are open strings; unknown values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selection {
    pub genre: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl Selection {
    pub fn new(genre: impl Into<String>) -> Self {
        Selection {
            genre: genre.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }
}

pub struct Remixer {
    config: RenderConfig,
    source: Box<dyn DecodeSource>,
}

impl Default for Remixer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl Remixer {
    /// A remixer that decodes canonical 16-bit PCM WAV.
    pub fn new(config: RenderConfig) -> Self {
        Self::with_source(config, WavCodec)
    }

    pub fn with_source(config: RenderConfig, source: impl DecodeSource + 'static) -> Self {
        Remixer {
            config: config.sanitized(),
            source: Box::new(source),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The chain a selection resolves to under this configuration.
    pub fn chain_for(&self, selection: &Selection) -> EffectChain {
        build_chain(&selection.genre, &selection.role, selection.voice.as_deref())
            .with_delay_feedback(self.config.delay_feedback)
    }

    pub fn processor(&self) -> Processor {
        Processor::from_config(&self.config)
    }

    /// Apply the selection's chain to an already-decoded buffer.
    pub fn remix_buffer(
        &self,
        buffer: &SampleBuffer,
        selection: &Selection,
        cancel: &CancelToken,
    ) -> Result<SampleBuffer, ProcessError> {
        let chain = self.chain_for(selection);
        self.processor().process_with_cancel(buffer, &chain, cancel)
    }

    /// Decode, remix and re-encode one upload.
    pub fn remix_bytes(
        &self,
        bytes: &[u8],
        selection: &Selection,
    ) -> Result<EncodedAudioBlob, RemixError> {
        self.remix_bytes_with_cancel(bytes, selection, &CancelToken::new())
    }

    pub fn remix_bytes_with_cancel(
        &self,
        bytes: &[u8],
        selection: &Selection,
        cancel: &CancelToken,
    ) -> Result<EncodedAudioBlob, RemixError> {
        let buffer = self.source.decode(bytes).inspect_err(|e| {
            log::warn!("could not decode {} byte upload: {e}", bytes.len());
        })?;
        let out = self.remix_buffer(&buffer, selection, cancel)?;
        Ok(encode(&out)?)
    }

    /// Remix several stems of one song. Each track takes its role from its
    /// position (vocal, drums, bass, melody, fx, synth, then repeating); the
    /// genre and voice are shared. Every track gets its own result, so one
    /// bad stem does not discard the others.
    pub fn remix_tracks<T: AsRef<[u8]>>(
        &self,
        tracks: &[T],
        genre: &str,
        voice: Option<&str>,
        cancel: &CancelToken,
    ) -> Vec<Result<EncodedAudioBlob, RemixError>> {
        tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                let selection = Selection {
                    genre: genre.to_string(),
                    role: TrackRole::for_track_index(index).name().to_string(),
                    voice: voice.map(str::to_string),
                };
                self.remix_bytes_with_cancel(track.as_ref(), &selection, cancel)
            })
            .collect()
    }

    /// Render a tone for a text prompt and encode it.
    pub fn synthesize(
        &self,
        text: &str,
        intensity: f64,
        genre: &str,
        mood: &str,
        voice: Option<&str>,
    ) -> Result<EncodedAudioBlob, RemixError> {
        let spec = ToneSpec::from_text(text, intensity, genre, mood, voice, &self.config.synth);
        Ok(encode(&synthesize(&spec))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{PrimitiveKind, Stage};
    use crate::codec::decode;
    use crate::error::{DecodeError, EncodeError};
    use std::f32::consts::PI;

    fn sine_wav(freq: f32, len: usize, channels: usize) -> Vec<u8> {
        let sr = 44100;
        let ch: Vec<f32> = (0..len)
            .map(|n| 0.5 * (2.0 * PI * freq * n as f32 / sr as f32).sin())
            .collect();
        encode(&SampleBuffer::new(vec![ch; channels], sr)).unwrap().into_bytes()
    }

    fn seeded() -> Remixer {
        Remixer::new(RenderConfig {
            reverb_seed: Some(11),
            ..RenderConfig::default()
        })
    }

    #[test]
    fn remix_keeps_shape_and_format() {
        let input = sine_wav(440.0, 4410, 2);
        let blob = seeded()
            .remix_bytes(&input, &Selection::new("Lo-Fi").with_role("melody"))
            .unwrap();
        assert_eq!(blob.mime_type(), "audio/wav");
        assert_eq!(blob.len(), input.len());
        let out = decode(blob.bytes()).unwrap();
        assert_eq!(out.num_channels(), 2);
        assert_eq!(out.len(), 4410);
        assert!(out.peak() <= 1.0);
    }

    #[test]
    fn undecodable_upload_is_a_decode_error() {
        let err = Remixer::default()
            .remix_bytes(b"ID3\x04 definitely not a wav", &Selection::new("EDM"))
            .unwrap_err();
        assert!(matches!(err, RemixError::Decode(DecodeError::NotRiff)), "got {err}");
    }

    #[test]
    fn absurd_header_rate_is_rejected_before_processing() {
        let mut input = sine_wav(440.0, 256, 2);
        input[24..28].copy_from_slice(&u32::MAX.to_le_bytes());
        let err = Remixer::default()
            .remix_bytes(&input, &Selection::new("EDM"))
            .unwrap_err();
        assert!(
            matches!(
                err,
                RemixError::Decode(DecodeError::UnsupportedSampleRate { sample_rate: u32::MAX })
            ),
            "got {err}"
        );
    }

    #[test]
    fn unencodable_output_is_an_encode_error() {
        struct Ultrasonic;
        impl DecodeSource for Ultrasonic {
            fn decode(&self, _bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
                Ok(SampleBuffer::silent(1, 16, 1_000_000))
            }
        }
        let err = Remixer::with_source(RenderConfig::default(), Ultrasonic)
            .remix_bytes(b"anything", &Selection::new("Default"))
            .unwrap_err();
        assert!(
            matches!(
                err,
                RemixError::Encode(EncodeError::UnsupportedSampleRate { sample_rate: 1_000_000 })
            ),
            "got {err}"
        );
    }

    #[test]
    fn config_feedback_reaches_delay_stages() {
        let remixer = Remixer::new(RenderConfig {
            delay_feedback: 0.2,
            ..RenderConfig::default()
        });
        let chain = remixer.chain_for(&Selection::new("EDM"));
        let feedback: Vec<f64> = chain
            .stages()
            .iter()
            .filter_map(|s| match s {
                Stage::Delay { feedback, .. } => Some(*feedback),
                _ => None,
            })
            .collect();
        assert_eq!(feedback, vec![0.2]);
    }

    #[test]
    fn tracks_take_roles_by_position() {
        let remixer = seeded();
        let tracks = vec![sine_wav(220.0, 2048, 1), sine_wav(55.0, 2048, 1), sine_wav(110.0, 2048, 1)];
        let blobs = remixer.remix_tracks(&tracks, "Trap", None, &CancelToken::new());
        assert_eq!(blobs.len(), 3);

        // Track 2 is the bass, which gets the forced low-pass.
        let bass = remixer.chain_for(&Selection::new("Trap").with_role("bass"));
        let direct = seeded().remix_bytes(&tracks[2], &Selection::new("Trap").with_role("bass")).unwrap();
        assert!(bass.contains(PrimitiveKind::LowPass));
        assert_eq!(blobs[2].as_ref().ok(), Some(&direct), "non-reverb chains are deterministic");
    }

    #[test]
    fn bad_stem_does_not_sink_the_batch() {
        let remixer = seeded();
        let good = sine_wav(220.0, 1024, 1);
        let tracks = [good.as_slice(), b"not a wav at all".as_slice(), good.as_slice()];
        let results = remixer.remix_tracks(&tracks, "Lo-Fi", None, &CancelToken::new());
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok(), "vocal stem failed: {:?}", results[0]);
        assert!(
            matches!(results[1], Err(RemixError::Decode(DecodeError::NotRiff))),
            "got {:?}",
            results[1]
        );
        let bass = results[2].as_ref().unwrap();
        assert_eq!(decode(bass.bytes()).unwrap().len(), 1024);
    }

    #[test]
    fn cancelled_session_reports_progress() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = Remixer::default()
            .remix_bytes_with_cancel(&sine_wav(440.0, 1024, 1), &Selection::new("Rock"), &cancel)
            .unwrap_err();
        assert!(
            matches!(err, RemixError::Process(ProcessError::Cancelled { samples_done: 0 })),
            "got {err}"
        );
    }

    #[test]
    fn custom_source_is_used() {
        struct Fixed;
        impl DecodeSource for Fixed {
            fn decode(&self, _bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
                Ok(SampleBuffer::silent(1, 100, 8000))
            }
        }
        let blob = Remixer::with_source(RenderConfig::default(), Fixed)
            .remix_bytes(b"anything", &Selection::new("Default"))
            .unwrap();
        let out = decode(blob.bytes()).unwrap();
        assert_eq!((out.num_channels(), out.len(), out.sample_rate()), (1, 100, 8000));
    }

    #[test]
    fn synthesize_encodes_configured_shape() {
        let mut config = RenderConfig::default();
        config.synth.duration = 0.5;
        config.synth.channels = 1;
        let blob = Remixer::new(config)
            .synthesize("late night drive", 0.6, "Lo-Fi", "calm", None)
            .unwrap();
        let out = decode(blob.bytes()).unwrap();
        assert_eq!(out.num_channels(), 1);
        assert_eq!(out.len(), 22050);
    }

    #[test]
    fn selection_from_json() {
        let sel: Selection = serde_json::from_str(r#"{ "genre": "Trap", "voice": "Robotic" }"#).unwrap();
        assert_eq!(sel, Selection::new("Trap").with_voice("Robotic"));
    }
}
