//! Error types for period-capture.
//!
//! Errors are split into two categories:
//! - **Fatal errors** ([`PeriodCaptureError`]): Prevent a capture pipeline from being built
//! - **Runtime events**: Drops, wraps and repositions surfaced via [`EventCallback`](crate::EventCallback)
//!
//! Once built, the write path has no failure signal at all. Overflow and
//! period rollover are policy, not errors.

/// Fatal configuration errors that prevent a [`PeriodCapture`](crate::PeriodCapture)
/// from being constructed.
///
/// These are returned from [`CaptureConfig::validate()`] and
/// [`PeriodCaptureBuilder::build()`].
///
/// [`CaptureConfig::validate()`]: crate::CaptureConfig::validate
/// [`PeriodCaptureBuilder::build()`]: crate::PeriodCaptureBuilder::build
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PeriodCaptureError {
    /// The input sample rate was zero.
    #[error("input sample rate must be non-zero")]
    ZeroSampleRate,

    /// The decimation factor is zero or does not evenly divide the input rate.
    #[error("decimation factor {factor} does not evenly divide input rate {sample_rate}Hz")]
    InvalidDecimationFactor {
        /// The requested decimation factor.
        factor: usize,
        /// The configured input sample rate.
        sample_rate: u32,
    },

    /// The filter must be longer than one decimation step.
    #[error("filter has {taps} taps, needs more than the decimation factor {factor}")]
    FilterTooShort {
        /// Number of filter coefficients.
        taps: usize,
        /// The configured decimation factor.
        factor: usize,
    },

    /// Filter coefficients are not mirror-symmetric (non-linear phase).
    #[error("filter coefficients are not symmetric (mismatch at tap {index})")]
    AsymmetricFilter {
        /// First tap whose mirror differs.
        index: usize,
    },

    /// Filter coefficients sum to zero, so they cannot be normalized to unity gain.
    #[error("filter coefficients sum to zero")]
    ZeroFilterGain,

    /// Period length is zero or larger than the buffer was sized for.
    #[error("period of {period_secs}s is invalid (maximum {max_period_secs}s)")]
    InvalidPeriod {
        /// Requested period length in seconds.
        period_secs: u32,
        /// Maximum supported period length in seconds.
        max_period_secs: u32,
    },

    /// Maximum period exceeds what the buffer may be sized for.
    #[error("maximum period of {max_period_secs}s exceeds the {limit}s limit")]
    MaxPeriodTooLong {
        /// Requested maximum period in seconds.
        max_period_secs: u32,
        /// Largest accepted maximum period in seconds.
        limit: u32,
    },

    /// Block size (decimated samples per notification) was zero.
    #[error("block size must be non-zero")]
    ZeroBlockSize,

    /// Frame channel count was zero.
    #[error("channel count must be non-zero")]
    ZeroChannels,

    /// The selected channel does not exist in the configured frame layout.
    #[error("channel selection {selection:?} needs at least {required} channels, frames have {channels}")]
    ChannelUnavailable {
        /// The requested selection.
        selection: crate::ChannelSelection,
        /// Channels required by the selection.
        required: u16,
        /// Channels actually present per frame.
        channels: u16,
    },
}
