pub mod buffer;
pub mod chain;
pub mod codec;
pub mod config;
#[cfg(feature = "decoders")]
pub mod decode;
pub mod dsp;
pub mod error;
pub mod processor;
pub mod profile;
pub mod remix;
pub mod synth;

pub use crate::buffer::SampleBuffer;
pub use crate::chain::{build_chain, EffectChain, Stage};
pub use crate::codec::{decode, encode, DecodeSource, EncodedAudioBlob, WavCodec};
pub use crate::config::{RenderConfig, SynthConfig};
pub use crate::error::{ConfigError, DecodeError, EncodeError, ProcessError, RemixError};
pub use crate::processor::{process, CancelToken, Processor};
pub use crate::profile::{resolve_genre_params, resolve_role_bias, resolve_voice, Genre, TrackRole};
pub use crate::remix::{Remixer, Selection};
pub use crate::synth::{synthesize, ToneSpec};

use crate::profile::VOICE_CATALOG;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the remixer-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Read an optional JS config object. `undefined` and `null` mean defaults.
fn config_from_js(config: JsValue) -> Result<RenderConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(RenderConfig::default());
    }
    let config: RenderConfig =
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(config.sanitized())
}

/// WASM-exposed: remix an uploaded WAV for a genre/role/voice selection and
/// return the re-encoded WAV bytes.
#[wasm_bindgen]
pub fn remix_wav(
    bytes: &[u8],
    genre: &str,
    role: &str,
    voice: Option<String>,
    config: JsValue,
) -> Result<Vec<u8>, JsValue> {
    let remixer = Remixer::new(config_from_js(config)?);
    let selection = Selection {
        genre: genre.to_string(),
        role: role.to_string(),
        voice,
    };
    let blob = remixer
        .remix_bytes(bytes, &selection)
        .map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(blob.into_bytes())
}

/// WASM-exposed: synthesize a tone for a text prompt as WAV bytes.
/// `genre` and `mood` are the labels a classifier assigned to the prompt.
#[wasm_bindgen]
pub fn synthesize_wav(
    text: &str,
    intensity: f64,
    genre: &str,
    mood: &str,
    voice: Option<String>,
    config: JsValue,
) -> Result<Vec<u8>, JsValue> {
    let remixer = Remixer::new(config_from_js(config)?);
    let blob = remixer
        .synthesize(text, intensity, genre, mood, voice.as_deref())
        .map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(blob.into_bytes())
}

/// WASM-exposed: the stage list a selection resolves to, for display.
#[wasm_bindgen]
pub fn describe_chain(genre: &str, role: &str, voice: Option<String>) -> Result<JsValue, JsValue> {
    let chain = build_chain(genre, role, voice.as_deref());
    serde_wasm_bindgen::to_value(&chain).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: display names of the known genres, in menu order.
#[wasm_bindgen]
pub fn list_genres() -> Vec<String> {
    Genre::ALL.iter().map(|g| g.name().to_string()).collect()
}

/// WASM-exposed: the voice catalog.
#[wasm_bindgen]
pub fn list_voices() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&VOICE_CATALOG[..]).map_err(|e| JsValue::from_str(&format!("{e}")))
}
