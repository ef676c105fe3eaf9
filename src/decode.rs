//! Decoders for arbitrary uploads (feature `decoders`).
//!
//! [`FileDecoder`] accepts any WAV that `hound` can read (8 to 32-bit
//! integer or 32-bit float) and treats everything else as MP3.

use std::fmt;
use std::io::Cursor;

use crate::buffer::SampleBuffer;
use crate::codec::{check_sample_rate, DecodeSource};
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, Default)]
pub struct FileDecoder;

impl DecodeSource for FileDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
        if bytes.starts_with(b"RIFF") {
            decode_wav(bytes)
        } else {
            decode_mp3(bytes)
        }
    }
}

fn backend(e: impl fmt::Display) -> DecodeError {
    DecodeError::Backend {
        message: e.to_string(),
    }
}

fn decode_wav(bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).map_err(backend)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(DecodeError::InvalidChannelCount { channels: 0 });
    }
    if !check_sample_rate(spec.sample_rate) {
        return Err(DecodeError::UnsupportedSampleRate {
            sample_rate: spec.sample_rate,
        });
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(backend)?,
        hound::SampleFormat::Int => {
            let full_scale = (1u64 << spec.bits_per_sample.saturating_sub(1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<_, _>>()
                .map_err(backend)?
        }
    };
    Ok(SampleBuffer::from_interleaved_f32(
        &samples,
        spec.channels as usize,
        spec.sample_rate,
    ))
}

fn decode_mp3(bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(bytes));
    let mut pcm: Vec<i16> = Vec::new();
    let mut layout: Option<(usize, i32)> = None;
    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if frame.channels == 0 {
                    continue;
                }
                match layout {
                    None => layout = Some((frame.channels, frame.sample_rate)),
                    Some((channels, _)) if channels != frame.channels => {
                        log::warn!(
                            "skipping {}-channel frame in {channels}-channel stream",
                            frame.channels
                        );
                        continue;
                    }
                    Some(_) => {}
                }
                pcm.extend_from_slice(&frame.data);
            }
            Err(minimp3::Error::Eof) => break,
            Err(minimp3::Error::SkippedData) => continue,
            Err(e) => return Err(backend(format!("{e:?}"))),
        }
    }

    let (channels, sample_rate) = layout.ok_or_else(|| backend("no MP3 frames found"))?;
    Ok(SampleBuffer::from_interleaved_i16(
        &pcm,
        channels,
        sample_rate.max(0) as u32,
    ))
}
