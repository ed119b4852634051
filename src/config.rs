//! Configuration types for period capture.

use std::sync::Arc;

use crate::capture::{BufferStrategy, ResetStrategy, RingStrategy};
use crate::format::{ChannelSelection, FrameFormat, SampleFormat};
use crate::pipeline::{validate_coefficients, LOWPASS_48K_TO_12K};
use crate::PeriodCaptureError;

/// Largest accepted `max_period_secs`: one day, the span periods align to.
pub const MAX_PERIOD_LIMIT_SECS: u32 = 86_400;

/// How the period buffer is realigned by [`PeriodCapture::clear()`].
///
/// [`PeriodCapture::clear()`]: crate::PeriodCapture::clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferMode {
    /// Treat the buffer as a ring: jump the write position to "now" in the
    /// period and rotate existing content so it stays time-aligned.
    #[default]
    Ring,

    /// Restart at position zero. Existing content is left for later writes
    /// to overwrite.
    Reset,
}

impl BufferMode {
    /// Builds the strategy object for this mode.
    #[must_use]
    pub fn strategy(self) -> Box<dyn BufferStrategy> {
        match self {
            Self::Ring => Box::new(RingStrategy),
            Self::Reset => Box::new(ResetStrategy),
        }
    }
}

/// Configuration for a capture pipeline.
///
/// Fixed at construction. Use [`CaptureConfig::default()`] for the standard
/// 48 kHz → 12 kHz, 15 second setup, or customize as needed.
///
/// # Example
///
/// ```
/// use period_capture::CaptureConfig;
///
/// let config = CaptureConfig {
///     period_secs: 60,
///     block_size: 3456,
///     ..Default::default()
/// };
/// assert_eq!(config.output_sample_rate(), 12000);
/// assert_eq!(config.frames_per_block(), 3456 * 4);
/// ```
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Input sample rate in Hz.
    ///
    /// Default: 48000
    pub input_sample_rate: u32,

    /// Length of one wall-clock aligned period in seconds.
    ///
    /// Default: 15
    pub period_secs: u32,

    /// Longest period the buffer is sized for, in seconds.
    ///
    /// Buffer capacity is `max_period_secs × output_sample_rate()` samples.
    /// Default: 60
    pub max_period_secs: u32,

    /// Decimated samples per completion notification.
    ///
    /// Default: 256
    pub block_size: usize,

    /// Integer downsampling factor.
    ///
    /// Default: 4
    pub decimation_factor: usize,

    /// Symmetric FIR low-pass coefficients, normalized to unity gain at
    /// construction.
    ///
    /// Default: [`LOWPASS_48K_TO_12K`]
    pub coefficients: Arc<[f32]>,

    /// Encoding of incoming samples.
    ///
    /// Default: [`SampleFormat::I16`]
    pub sample_format: SampleFormat,

    /// Interleaved channels per incoming frame.
    ///
    /// Default: 1
    pub channels: u16,

    /// Channel(s) fed into the filter.
    ///
    /// Default: [`ChannelSelection::Mono`]
    pub channel: ChannelSelection,

    /// Behavior of [`PeriodCapture::clear()`](crate::PeriodCapture::clear).
    ///
    /// Default: [`BufferMode::Ring`]
    pub buffer_mode: BufferMode,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input_sample_rate: 48000,
            period_secs: 15,
            max_period_secs: 60,
            block_size: 256,
            decimation_factor: 4,
            coefficients: Arc::from(&LOWPASS_48K_TO_12K[..]),
            sample_format: SampleFormat::I16,
            channels: 1,
            channel: ChannelSelection::Mono,
            buffer_mode: BufferMode::Ring,
        }
    }
}

impl CaptureConfig {
    /// Sample rate after decimation.
    #[must_use]
    pub fn output_sample_rate(&self) -> u32 {
        if self.decimation_factor == 0 {
            return 0;
        }
        self.input_sample_rate / self.decimation_factor as u32
    }

    /// Period buffer capacity in decimated samples.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.max_period_secs as usize * self.output_sample_rate() as usize
    }

    /// Raw input frames consumed per decimation block.
    #[must_use]
    pub fn frames_per_block(&self) -> usize {
        self.decimation_factor * self.block_size
    }

    /// Byte layout of incoming frames.
    #[must_use]
    pub fn frame_format(&self) -> FrameFormat {
        FrameFormat {
            sample_format: self.sample_format,
            channels: self.channels,
            selection: self.channel,
        }
    }

    /// Checks the configuration for consistency.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, see [`PeriodCaptureError`].
    pub fn validate(&self) -> Result<(), PeriodCaptureError> {
        if self.input_sample_rate == 0 {
            return Err(PeriodCaptureError::ZeroSampleRate);
        }

        if self.decimation_factor == 0
            || self.input_sample_rate % self.decimation_factor as u32 != 0
        {
            return Err(PeriodCaptureError::InvalidDecimationFactor {
                factor: self.decimation_factor,
                sample_rate: self.input_sample_rate,
            });
        }

        validate_coefficients(&self.coefficients, self.decimation_factor)?;

        if self.max_period_secs > MAX_PERIOD_LIMIT_SECS {
            return Err(PeriodCaptureError::MaxPeriodTooLong {
                max_period_secs: self.max_period_secs,
                limit: MAX_PERIOD_LIMIT_SECS,
            });
        }

        if self.period_secs == 0 || self.period_secs > self.max_period_secs {
            return Err(PeriodCaptureError::InvalidPeriod {
                period_secs: self.period_secs,
                max_period_secs: self.max_period_secs,
            });
        }

        if self.block_size == 0 {
            return Err(PeriodCaptureError::ZeroBlockSize);
        }

        if self.channels == 0 {
            return Err(PeriodCaptureError::ZeroChannels);
        }

        let required = self.channel.required_channels();
        if self.channels < required {
            return Err(PeriodCaptureError::ChannelUnavailable {
                selection: self.channel,
                required,
                channels: self.channels,
            });
        }

        Ok(())
    }
}
