//! WAV codec: canonical 16-bit PCM RIFF/WAVE encode and decode.
//!
//! `encode` always writes the 44-byte canonical header followed by
//! interleaved little-endian `i16` frames. `decode` accepts anything with a
//! PCM `fmt ` chunk and a `data` chunk, skipping unknown chunks in between,
//! and is the exact inverse of `encode` up to 16-bit quantization.

use crate::buffer::{i16_to_f32, SampleBuffer};
use crate::error::{DecodeError, EncodeError};

pub const WAV_MIME_TYPE: &str = "audio/wav";
pub const WAV_HEADER_LEN: usize = 44;
/// Highest sample rate accepted on either side of the codec.
pub const MAX_SAMPLE_RATE: u32 = 768_000;

const PCM_FORMAT: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Encoded bytes plus their declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudioBlob {
    bytes: Vec<u8>,
    mime_type: &'static str,
}

impl EncodedAudioBlob {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Something that can turn uploaded bytes into samples.
///
/// The session layer only ever sees this trait, so hosts can plug in
/// richer decoders (or fetch-and-decode pipelines) without touching the
/// processing core.
pub trait DecodeSource: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, DecodeError>;
}

/// The built-in source: canonical 16-bit PCM WAV only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec;

impl DecodeSource for WavCodec {
    fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
        decode(bytes)
    }
}

/// Float sample to `i16`: negatives scale by 32768, positives by 32767,
/// so ±1.0 land exactly on the ends of the range.
#[inline]
fn to_i16(sample: f32) -> i16 {
    let s = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) as f64 };
    let scaled = if s < 0.0 { s * 32768.0 } else { s * 32767.0 };
    scaled.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

pub(crate) fn check_sample_rate(sample_rate: u32) -> bool {
    (1..=MAX_SAMPLE_RATE).contains(&sample_rate)
}

fn header_u32(field: &'static str, value: u64) -> Result<u32, EncodeError> {
    u32::try_from(value).map_err(|_| EncodeError::HeaderOverflow { field, value })
}

/// Encode a buffer as a canonical 16-bit PCM WAV file.
///
/// Fails instead of truncating when the header cannot describe the buffer:
/// too many channels for a 16-bit block align, a sample rate outside
/// `1..=MAX_SAMPLE_RATE`, or a size field past `u32::MAX`.
pub fn encode(buffer: &SampleBuffer) -> Result<EncodedAudioBlob, EncodeError> {
    let num_channels = buffer.num_channels();
    let bytes_per_sample = BITS_PER_SAMPLE / 8;
    let channels = u16::try_from(num_channels)
        .ok()
        .filter(|&c| c <= u16::MAX / bytes_per_sample)
        .ok_or(EncodeError::TooManyChannels {
            channels: num_channels,
        })?;
    let block_align = channels * bytes_per_sample;
    let sample_rate = buffer.sample_rate();
    if !check_sample_rate(sample_rate) {
        return Err(EncodeError::UnsupportedSampleRate { sample_rate });
    }
    let byte_rate = header_u32("byte rate", sample_rate as u64 * block_align as u64)?;
    let data_size = (buffer.len() as u64).saturating_mul(block_align as u64);
    let file_size = header_u32("RIFF size", data_size.saturating_add(36))?;
    let data_size = header_u32("data size", data_size)?;

    let mut buf = Vec::with_capacity(WAV_HEADER_LEN + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for i in 0..buffer.len() {
        for ch in buffer.channels() {
            buf.extend_from_slice(&to_i16(ch[i]).to_le_bytes());
        }
    }

    Ok(EncodedAudioBlob {
        bytes: buf,
        mime_type: WAV_MIME_TYPE,
    })
}

struct Format {
    channels: u16,
    sample_rate: u32,
}

/// Decode a 16-bit PCM WAV file.
pub fn decode(bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
    if bytes.len() < 12 {
        return Err(DecodeError::TooShort { len: bytes.len() });
    }
    if &bytes[0..4] != b"RIFF" {
        return Err(DecodeError::NotRiff);
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(DecodeError::NotWave);
    }

    let mut format = None;
    let mut data = None;
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = read_u32(bytes, pos + 4) as usize;
        let body_start = pos + 8;
        let available = bytes.len() - body_start;

        match id {
            b"fmt " => {
                if size < 16 || available < 16 {
                    return Err(DecodeError::TruncatedData {
                        declared: size.max(16),
                        available,
                    });
                }
                format = Some(parse_format(&bytes[body_start..body_start + 16])?);
            }
            b"data" => {
                if size > available {
                    return Err(DecodeError::TruncatedData {
                        declared: size,
                        available,
                    });
                }
                data = Some(&bytes[body_start..body_start + size]);
            }
            _ => {}
        }
        if format.is_some() && data.is_some() {
            break;
        }
        // Chunks are padded to an even length.
        pos = body_start.saturating_add(size).saturating_add(size & 1);
    }

    let format = format.ok_or(DecodeError::MissingChunk { id: "fmt " })?;
    let data = data.ok_or(DecodeError::MissingChunk { id: "data" })?;

    if format.channels == 0 {
        if data.is_empty() {
            return Ok(SampleBuffer::new(Vec::new(), format.sample_rate));
        }
        return Err(DecodeError::InvalidChannelCount { channels: 0 });
    }

    let channels = format.channels as usize;
    let mut out = vec![Vec::with_capacity(data.len() / (2 * channels)); channels];
    for frame in data.chunks_exact(2 * channels) {
        for (ch, sample) in out.iter_mut().zip(frame.chunks_exact(2)) {
            ch.push(i16_to_f32(i16::from_le_bytes([sample[0], sample[1]])));
        }
    }
    Ok(SampleBuffer::new(out, format.sample_rate))
}

fn parse_format(fmt: &[u8]) -> Result<Format, DecodeError> {
    let format_tag = read_u16(fmt, 0);
    let channels = read_u16(fmt, 2);
    let sample_rate = read_u32(fmt, 4);
    let block_align = read_u16(fmt, 12);
    let bits = read_u16(fmt, 14);

    if format_tag != PCM_FORMAT {
        return Err(DecodeError::UnsupportedFormat { format_tag });
    }
    if bits != BITS_PER_SAMPLE {
        return Err(DecodeError::UnsupportedBitDepth { bits });
    }
    if !check_sample_rate(sample_rate) {
        return Err(DecodeError::UnsupportedSampleRate { sample_rate });
    }
    let expected = channels.saturating_mul(BITS_PER_SAMPLE / 8);
    if block_align != expected {
        return Err(DecodeError::BlockAlignMismatch {
            expected,
            found: block_align,
        });
    }
    Ok(Format {
        channels,
        sample_rate,
    })
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(channels: usize, len: usize, sample_rate: u32) -> SampleBuffer {
        let chans = (0..channels)
            .map(|c| {
                (0..len)
                    .map(|i| {
                        let x = (i as f32 / len.max(1) as f32) * 2.0 - 1.0;
                        if c % 2 == 0 { x } else { -x * 0.5 }
                    })
                    .collect()
            })
            .collect();
        SampleBuffer::new(chans, sample_rate)
    }

    #[test]
    fn wav_header_valid() {
        let wav = encode(&ramp(2, 100, 44100)).unwrap();
        let bytes = wav.bytes();
        assert_eq!(wav.mime_type(), "audio/wav");

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(read_u32(bytes, 4), 36 + 400);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(read_u32(bytes, 16), 16);
        assert_eq!(read_u16(bytes, 20), 1);
        assert_eq!(read_u16(bytes, 22), 2);
        assert_eq!(read_u32(bytes, 24), 44100);
        assert_eq!(read_u32(bytes, 28), 44100 * 4);
        assert_eq!(read_u16(bytes, 32), 4);
        assert_eq!(read_u16(bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(read_u32(bytes, 40), 400);
        assert_eq!(bytes.len(), 44 + 400);
    }

    #[test]
    fn full_scale_mapping_is_asymmetric() {
        let buf = SampleBuffer::new(vec![vec![1.0, -1.0, 0.0, 2.0, -7.0, f32::NAN]], 8000);
        let wav = encode(&buf).unwrap();
        let pcm: Vec<i16> = wav.bytes()[44..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(pcm, vec![32767, -32768, 0, 32767, -32768, 0]);
    }

    #[test]
    fn round_trip_within_quantization() {
        for &(channels, sample_rate) in &[(1, 8000), (2, 44100), (3, 48000), (6, 96000)] {
            let input = ramp(channels, 1000, sample_rate);
            let output = decode(encode(&input).unwrap().bytes()).unwrap();
            assert_eq!(output.num_channels(), channels);
            assert_eq!(output.sample_rate(), sample_rate);
            assert_eq!(output.len(), input.len());
            for (a, b) in input.channels().iter().zip(output.channels()) {
                for (x, y) in a.iter().zip(b) {
                    let err = (x - y).abs();
                    assert!(err <= 1.0 / 32767.0, "error {err} at {x} for {channels}ch/{sample_rate}Hz");
                }
            }
        }
    }

    #[test]
    fn empty_buffer_is_header_only() {
        let wav = encode(&SampleBuffer::silent(2, 0, 44100)).unwrap();
        assert_eq!(wav.len(), 44);
        let back = decode(wav.bytes()).unwrap();
        assert_eq!(back.len(), 0);
        assert_eq!(back.num_channels(), 2);

        let none = encode(&SampleBuffer::new(Vec::new(), 22050)).unwrap();
        assert_eq!(none.len(), 44);
        let back = decode(none.bytes()).unwrap();
        assert_eq!(back.len(), 0);
    }

    #[test]
    fn skips_unknown_chunks() {
        let wav = encode(&ramp(1, 10, 8000)).unwrap().into_bytes();
        let mut patched = wav[..36].to_vec();
        // Odd-sized LIST chunk plus its pad byte.
        patched.extend_from_slice(b"LIST");
        patched.extend_from_slice(&3u32.to_le_bytes());
        patched.extend_from_slice(&[1, 2, 3, 0]);
        patched.extend_from_slice(&wav[36..]);
        let back = decode(&patched).unwrap();
        assert_eq!(back, decode(&wav).unwrap());
    }

    #[test]
    fn rejects_foreign_bytes() {
        assert_eq!(decode(b"RIFF"), Err(DecodeError::TooShort { len: 4 }));
        assert_eq!(decode(b"ID3\x04\0\0\0\0\0\0\0\0\0"), Err(DecodeError::NotRiff));
        assert_eq!(decode(b"RIFF\0\0\0\0AVI "), Err(DecodeError::NotWave));
        assert_eq!(
            decode(b"RIFF\x04\0\0\0WAVE"),
            Err(DecodeError::MissingChunk { id: "fmt " })
        );
    }

    #[test]
    fn rejects_unsupported_formats() {
        let mut wav = encode(&ramp(2, 4, 8000)).unwrap().into_bytes();
        wav[34] = 24;
        assert_eq!(decode(&wav), Err(DecodeError::UnsupportedBitDepth { bits: 24 }));

        let mut wav = encode(&ramp(2, 4, 8000)).unwrap().into_bytes();
        wav[20] = 3;
        assert_eq!(decode(&wav), Err(DecodeError::UnsupportedFormat { format_tag: 3 }));

        let mut wav = encode(&ramp(2, 4, 8000)).unwrap().into_bytes();
        wav[32] = 2;
        assert_eq!(
            decode(&wav),
            Err(DecodeError::BlockAlignMismatch { expected: 4, found: 2 })
        );
    }

    #[test]
    fn rejects_truncated_data() {
        let wav = encode(&ramp(2, 100, 8000)).unwrap().into_bytes();
        let cut = &wav[..wav.len() - 10];
        assert_eq!(
            decode(cut),
            Err(DecodeError::TruncatedData { declared: 400, available: 390 })
        );
    }

    #[test]
    fn missing_data_chunk() {
        let wav = encode(&ramp(1, 4, 8000)).unwrap().into_bytes();
        assert_eq!(decode(&wav[..36]), Err(DecodeError::MissingChunk { id: "data" }));
    }

    #[test]
    fn zero_channels_with_samples_is_invalid() {
        let mut wav = encode(&ramp(1, 4, 8000)).unwrap().into_bytes();
        wav[22] = 0;
        wav[32] = 0;
        assert_eq!(decode(&wav), Err(DecodeError::InvalidChannelCount { channels: 0 }));
    }

    #[test]
    fn rejects_out_of_range_sample_rates() {
        let mut wav = encode(&ramp(2, 4, 8000)).unwrap().into_bytes();
        wav[24..28].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(
            decode(&wav),
            Err(DecodeError::UnsupportedSampleRate { sample_rate: u32::MAX })
        );

        wav[24..28].copy_from_slice(&0u32.to_le_bytes());
        assert_eq!(decode(&wav), Err(DecodeError::UnsupportedSampleRate { sample_rate: 0 }));

        wav[24..28].copy_from_slice(&MAX_SAMPLE_RATE.to_le_bytes());
        assert_eq!(decode(&wav).unwrap().sample_rate(), MAX_SAMPLE_RATE);
    }

    #[test]
    fn encode_refuses_headers_that_do_not_fit() {
        assert_eq!(
            encode(&SampleBuffer::silent(2, 4, u32::MAX)),
            Err(EncodeError::UnsupportedSampleRate { sample_rate: u32::MAX })
        );
        assert_eq!(
            encode(&SampleBuffer::silent(2, 4, 0)),
            Err(EncodeError::UnsupportedSampleRate { sample_rate: 0 })
        );
        assert_eq!(
            encode(&SampleBuffer::silent(40_000, 0, 8000)),
            Err(EncodeError::TooManyChannels { channels: 40_000 })
        );

        let widest = encode(&SampleBuffer::silent(32767, 0, MAX_SAMPLE_RATE));
        assert!(
            matches!(widest, Err(EncodeError::HeaderOverflow { field: "byte rate", .. })),
            "got {widest:?}"
        );
    }

    #[test]
    fn wav_codec_is_a_decode_source() {
        let source: &dyn DecodeSource = &WavCodec;
        let buf = ramp(2, 32, 16000);
        let back = source.decode(encode(&buf).unwrap().bytes()).unwrap();
        assert_eq!(back.len(), 32);
    }
}
