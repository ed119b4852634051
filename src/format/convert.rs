//! Sample decoding and channel selection.

/// Converts i16 samples to f32.
///
/// Output will be in the range [-1.0, 1.0).
#[inline]
pub fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / 32768.0
}

/// Converts f32 samples to i16.
///
/// Input should be in the range [-1.0, 1.0]. Values outside this range are
/// clamped. Uses × 32767 for symmetric scaling.
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}

/// Encoding of each sample inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    /// 16-bit signed little-endian PCM.
    #[default]
    I16,
    /// 32-bit IEEE float, little-endian.
    F32,
}

impl SampleFormat {
    /// Bytes occupied by one sample of this format.
    #[must_use]
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::I16 => 2,
            Self::F32 => 4,
        }
    }

    /// Decodes one sample from the start of `bytes` to f32.
    #[inline]
    fn decode(self, bytes: &[u8]) -> f32 {
        match self {
            Self::I16 => i16_to_f32(i16::from_le_bytes([bytes[0], bytes[1]])),
            Self::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }
}

/// Which channel(s) of a multi-channel frame feed the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSelection {
    /// Use the first channel of each frame.
    #[default]
    Mono,
    /// Use channel 0.
    Left,
    /// Use channel 1.
    Right,
    /// Average channels 0 and 1.
    Both,
}

impl ChannelSelection {
    /// Minimum number of channels a frame needs for this selection.
    #[must_use]
    pub fn required_channels(self) -> u16 {
        match self {
            Self::Mono | Self::Left => 1,
            Self::Right | Self::Both => 2,
        }
    }
}

/// Byte layout of one raw input frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    /// Sample encoding.
    pub sample_format: SampleFormat,
    /// Interleaved channels per frame.
    pub channels: u16,
    /// Channel(s) to extract.
    pub selection: ChannelSelection,
}

impl FrameFormat {
    /// Byte stride of one frame.
    #[must_use]
    pub fn bytes_per_frame(&self) -> usize {
        self.sample_format.bytes_per_sample() * self.channels as usize
    }

    /// Decodes one frame to a single mono f32 sample.
    ///
    /// `frame` must be exactly [`bytes_per_frame()`](Self::bytes_per_frame) long.
    #[inline]
    pub fn decode_frame(&self, frame: &[u8]) -> f32 {
        let width = self.sample_format.bytes_per_sample();
        match self.selection {
            ChannelSelection::Mono | ChannelSelection::Left => self.sample_format.decode(frame),
            ChannelSelection::Right => self.sample_format.decode(&frame[width..]),
            ChannelSelection::Both => {
                let left = self.sample_format.decode(frame);
                let right = self.sample_format.decode(&frame[width..]);
                (left + right) * 0.5
            }
        }
    }
}

/// Encodes f32 samples as little-endian i16 bytes.
pub fn f32_slice_to_i16_bytes(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&s| f32_to_i16(s).to_le_bytes())
        .collect()
}

/// Encodes f32 samples as little-endian f32 bytes.
pub fn f32_slice_to_f32_bytes(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|&s| s.to_le_bytes()).collect()
}
