//! Multichannel sample buffer shared by the codec, processor and synth.

/// 16-bit PCM to float: negatives scale by 32768, positives by 32767, so
/// both ends of the `i16` range land on ±1.0.
#[inline]
pub(crate) fn i16_to_f32(value: i16) -> f32 {
    if value < 0 {
        value as f32 / 32768.0
    } else {
        value as f32 / 32767.0
    }
}

/// A fixed-shape block of audio: one `Vec<f32>` per channel, all the same
/// length, plus the sample rate they were recorded at.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Build a buffer from channel-major data.
    ///
    /// Channels shorter than the longest one are padded with zeros so that
    /// every channel ends up with the same length.
    pub fn new(mut channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        let len = channels.iter().map(Vec::len).max().unwrap_or(0);
        let mut padded = 0;
        for ch in channels.iter_mut() {
            if ch.len() < len {
                padded += 1;
                ch.resize(len, 0.0);
            }
        }
        if padded > 0 {
            log::warn!("padded {padded} short channel(s) to {len} samples");
        }
        SampleBuffer {
            channels,
            sample_rate,
        }
    }

    /// An all-zero buffer of the given shape.
    pub fn silent(num_channels: usize, len: usize, sample_rate: u32) -> Self {
        SampleBuffer {
            channels: vec![vec![0.0; len]; num_channels],
            sample_rate,
        }
    }

    /// De-interleave frames of 16-bit PCM.
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved_i16(pcm: &[i16], num_channels: usize, sample_rate: u32) -> Self {
        if num_channels == 0 {
            return SampleBuffer::new(Vec::new(), sample_rate);
        }
        let frames = pcm.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];
        for frame in pcm.chunks_exact(num_channels) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(i16_to_f32(s));
            }
        }
        SampleBuffer {
            channels,
            sample_rate,
        }
    }

    /// De-interleave frames of float samples.
    pub fn from_interleaved_f32(samples: &[f32], num_channels: usize, sample_rate: u32) -> Self {
        if num_channels == 0 {
            return SampleBuffer::new(Vec::new(), sample_rate);
        }
        let frames = samples.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
        SampleBuffer {
            channels,
            sample_rate,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Peak absolute value across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|ch| ch.iter())
            .fold(0.0_f32, |m, &s| m.max(s.abs()))
    }

    /// Frame-interleaved copy of the samples (L R L R ...).
    pub fn interleaved(&self) -> Vec<f32> {
        let n = self.num_channels();
        let mut out = Vec::with_capacity(self.len() * n);
        for i in 0..self.len() {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_channels() {
        let buf = SampleBuffer::new(vec![vec![0.5; 10], vec![0.25; 4]], 44100);
        assert_eq!(buf.len(), 10);
        let right = buf.channel(1).unwrap();
        assert_eq!(right.len(), 10);
        assert_eq!(right[3], 0.25);
        assert_eq!(right[4], 0.0, "padding should be silence");
    }

    #[test]
    fn empty_shapes() {
        let none = SampleBuffer::new(Vec::new(), 44100);
        assert_eq!(none.num_channels(), 0);
        assert!(none.is_empty());

        let zero_len = SampleBuffer::silent(2, 0, 22050);
        assert_eq!(zero_len.num_channels(), 2);
        assert!(zero_len.is_empty());
        assert_eq!(zero_len.duration_secs(), 0.0);
    }

    #[test]
    fn interleave_and_back() {
        let pcm: Vec<i16> = vec![0, 16384, -16384, 32767];
        let buf = SampleBuffer::from_interleaved_i16(&pcm, 2, 8000);
        assert_eq!(buf.len(), 2);
        assert!((buf.channel(0).unwrap()[1] + 0.5).abs() < 1e-6);
        assert!((buf.channel(1).unwrap()[0] - 0.5).abs() < 1e-4);

        let flat = buf.interleaved();
        let again = SampleBuffer::from_interleaved_f32(&flat, 2, 8000);
        assert_eq!(again, buf);
    }

    #[test]
    fn pcm_extremes_reach_full_scale() {
        let buf = SampleBuffer::from_interleaved_i16(&[32767, -32768, 0], 1, 8000);
        assert_eq!(buf.channel(0).unwrap(), &[1.0, -1.0, 0.0]);
    }

    #[test]
    fn drops_partial_frame() {
        let buf = SampleBuffer::from_interleaved_f32(&[0.1, 0.2, 0.3], 2, 8000);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn peak_tracks_largest_magnitude() {
        let buf = SampleBuffer::new(vec![vec![0.1, -0.8], vec![0.3, 0.2]], 8000);
        assert!((buf.peak() - 0.8).abs() < 1e-6, "got {}", buf.peak());
    }
}
