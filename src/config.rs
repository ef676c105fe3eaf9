//! Render configuration.
//!
//! Every field has a default, so an empty JSON object (or no config at all)
//! gives the standard behaviour.

use serde::{Deserialize, Serialize};

use crate::chain::DEFAULT_DELAY_FEEDBACK;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Frames processed between cancellation checks.
    pub block_size: usize,
    /// Seed for the reverb noise. `None` draws fresh entropy per render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverb_seed: Option<u64>,
    /// Feedback applied to every delay stage.
    pub delay_feedback: f64,
    pub synth: SynthConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            block_size: 128,
            reverb_seed: None,
            delay_feedback: DEFAULT_DELAY_FEEDBACK,
            synth: SynthConfig::default(),
        }
    }
}

/// Output shape of the tone synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthConfig {
    pub sample_rate: u32,
    /// Length of the rendered tone in seconds.
    pub duration: f64,
    pub channels: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            sample_rate: 44100,
            duration: 4.0,
            channels: 2,
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<RenderConfig, ConfigError> {
        Ok(serde_json::from_str::<RenderConfig>(json)?.sanitized())
    }

    /// Pull out-of-range values back into something renderable.
    pub fn sanitized(mut self) -> RenderConfig {
        self.block_size = self.block_size.max(1);
        self.delay_feedback = if self.delay_feedback.is_finite() {
            self.delay_feedback.clamp(0.0, 0.99)
        } else {
            DEFAULT_DELAY_FEEDBACK
        };
        self.synth.sample_rate = self.synth.sample_rate.clamp(8000, 192_000);
        self.synth.duration = if self.synth.duration.is_finite() {
            self.synth.duration.clamp(0.0, 600.0)
        } else {
            SynthConfig::default().duration
        };
        self.synth.channels = self.synth.channels.clamp(1, 8);
        self
    }
}
