//! Mock audio source for testing without hardware.

use std::time::Duration;

use crate::format::{f32_slice_to_f32_bytes, f32_slice_to_i16_bytes, FrameFormat, SampleFormat};
use crate::pipeline::{create_ingest_buffer, IngestConsumer};

/// A mock audio source that generates synthetic audio for testing.
///
/// Samples are kept as interleaved f32 and encoded on the way out, so the
/// same signal can be fed to a pipeline configured for either
/// [`SampleFormat`].
///
/// # Example
///
/// ```
/// use period_capture::{MockSource, SampleFormat};
///
/// let mut mock = MockSource::new(48000, 1);
///
/// // 100ms of silence, then 100ms of a 1 kHz tone
/// mock.generate_silence(100);
/// mock.generate_sine(1000.0, 0.5, 100);
///
/// let bytes = mock.to_bytes(SampleFormat::I16);
/// assert_eq!(bytes.len(), 9600 * 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockSource {
    sample_rate: u32,
    channels: u16,
    samples: Vec<f32>,
    phase: f64,
    seed: u32,
}

impl MockSource {
    /// Creates a new mock source with the given format.
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            samples: Vec::new(),
            phase: 0.0,
            seed: 12345,
        }
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Generates silence for the given duration in milliseconds.
    pub fn generate_silence(&mut self, duration_ms: u64) {
        self.generate_dc(0.0, duration_ms);
    }

    /// Generates a constant level on every channel.
    pub fn generate_dc(&mut self, level: f32, duration_ms: u64) {
        let num_samples = self.frames_for_duration(duration_ms) * self.channels as usize;
        self.samples
            .extend(std::iter::repeat(level).take(num_samples));
    }

    /// Generates a sine wave at `frequency` Hz.
    ///
    /// Phase carries over between calls, so consecutive tones join without
    /// a discontinuity.
    pub fn generate_sine(&mut self, frequency: f64, amplitude: f32, duration_ms: u64) {
        let step = 2.0 * std::f64::consts::PI * frequency / f64::from(self.sample_rate);

        for _ in 0..self.frames_for_duration(duration_ms) {
            let sample = amplitude * self.phase.sin() as f32;
            self.phase = (self.phase + step) % (2.0 * std::f64::consts::PI);

            // Same sample on all channels
            for _ in 0..self.channels {
                self.samples.push(sample);
            }
        }
    }

    /// Generates deterministic white noise in `[-amplitude, amplitude)`.
    pub fn generate_noise(&mut self, amplitude: f32, duration_ms: u64) {
        let num_samples = self.frames_for_duration(duration_ms) * self.channels as usize;

        // Simple LCG for deterministic "random" noise
        for _ in 0..num_samples {
            self.seed = self.seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let random = f32::from((self.seed >> 16) as u16) / 32768.0 - 1.0;
            self.samples.push(random * amplitude);
        }
    }

    /// Adds interleaved samples directly.
    pub fn add_samples(&mut self, samples: &[f32]) {
        self.samples.extend_from_slice(samples);
    }

    /// Takes all accumulated samples, clearing the internal buffer.
    pub fn take_samples(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.samples)
    }

    /// Returns a reference to the accumulated samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Returns the number of whole frames accumulated.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Returns the duration of accumulated samples.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    /// Encodes the accumulated samples as little-endian frame bytes.
    pub fn to_bytes(&self, format: SampleFormat) -> Vec<u8> {
        match format {
            SampleFormat::I16 => f32_slice_to_i16_bytes(&self.samples),
            SampleFormat::F32 => f32_slice_to_f32_bytes(&self.samples),
        }
    }

    /// Loads the accumulated samples into a fresh ingest ring.
    ///
    /// The ring is sized to hold everything, so nothing is dropped.
    pub fn into_ingest_buffer(self, format: FrameFormat) -> IngestConsumer {
        let bytes = self.to_bytes(format.sample_format);
        let frames = bytes.len() / format.bytes_per_frame();
        let (mut producer, consumer) = create_ingest_buffer(frames, format);
        producer.push_frames(&bytes);
        consumer
    }

    fn frames_for_duration(&self, duration_ms: u64) -> usize {
        (u64::from(self.sample_rate) * duration_ms / 1000) as usize
    }
}
