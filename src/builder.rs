//! Builder pattern for `PeriodCapture`.

use std::sync::Arc;

use crate::capture::{BufferStrategy, PeriodCapture, PeriodState};
use crate::clock::{Clock, PeriodClock, SystemClock};
use crate::format::{ChannelSelection, SampleFormat};
use crate::notify::{BlockWritten, FnNotifier, Notifier};
use crate::pipeline::Decimator;
use crate::{event_callback, BufferMode, CaptureConfig, CaptureEvent, EventCallback};
use crate::PeriodCaptureError;

/// Builder for configuring a [`PeriodCapture`].
///
/// Use [`PeriodCapture::builder()`] to create a new builder.
///
/// # Example
///
/// ```
/// use period_capture::{BlockWritten, ChannelSelection, PeriodCapture, SampleFormat};
///
/// let capture = PeriodCapture::builder()
///     .period_secs(60)
///     .sample_format(SampleFormat::F32)
///     .channels(2, ChannelSelection::Left)
///     .on_block(|block: &BlockWritten| {
///         println!("{} samples ready", block.position);
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(capture.capacity(), 60 * 12000);
/// ```
#[must_use]
pub struct PeriodCaptureBuilder {
    /// Pipeline configuration.
    config: CaptureConfig,
    /// Wall-clock source. System time when unset.
    clock: Option<Arc<dyn Clock>>,
    /// Overrides the strategy derived from `config.buffer_mode`.
    strategy: Option<Box<dyn BufferStrategy>>,
    /// Block-completion consumers.
    notifiers: Vec<Arc<dyn Notifier>>,
    /// Event callback.
    event_callback: Option<EventCallback>,
}

impl Default for PeriodCaptureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodCaptureBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: CaptureConfig::default(),
            clock: None,
            strategy: None,
            notifiers: Vec::new(),
            event_callback: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the input sample rate in Hz.
    ///
    /// Default: 48000
    pub fn input_sample_rate(mut self, rate: u32) -> Self {
        self.config.input_sample_rate = rate;
        self
    }

    /// Set the period length in seconds.
    ///
    /// Default: 15
    pub fn period_secs(mut self, secs: u32) -> Self {
        self.config.period_secs = secs;
        self
    }

    /// Set the longest period the buffer must hold.
    ///
    /// Default: 60
    pub fn max_period_secs(mut self, secs: u32) -> Self {
        self.config.max_period_secs = secs;
        self
    }

    /// Set the number of decimated samples per block.
    ///
    /// Default: 256
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.config.block_size = block_size;
        self
    }

    /// Set the decimation factor and its low-pass filter.
    ///
    /// Coefficients must be symmetric and longer than `factor`.
    pub fn decimation(mut self, factor: usize, coefficients: &[f32]) -> Self {
        self.config.decimation_factor = factor;
        self.config.coefficients = Arc::from(coefficients);
        self
    }

    /// Set the encoding of incoming samples.
    ///
    /// Default: [`SampleFormat::I16`]
    pub fn sample_format(mut self, format: SampleFormat) -> Self {
        self.config.sample_format = format;
        self
    }

    /// Set the interleaved channel count and which channel(s) to capture.
    ///
    /// Default: 1 channel, [`ChannelSelection::Mono`]
    pub fn channels(mut self, channels: u16, selection: ChannelSelection) -> Self {
        self.config.channels = channels;
        self.config.channel = selection;
        self
    }

    /// Set how `clear()` treats the buffer.
    ///
    /// Default: [`BufferMode::Ring`]
    pub fn buffer_mode(mut self, mode: BufferMode) -> Self {
        self.config.buffer_mode = mode;
        self
    }

    /// Use a custom buffer strategy instead of the one from
    /// [`buffer_mode()`](Self::buffer_mode).
    pub fn strategy<S: BufferStrategy + 'static>(mut self, strategy: S) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    /// Set the wall-clock source.
    ///
    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Add a consumer of block-completion notifications.
    pub fn notifier<N: Notifier + 'static>(mut self, notifier: N) -> Self {
        self.notifiers.push(Arc::new(notifier));
        self
    }

    /// Add a closure called after every completed block.
    pub fn on_block<F>(self, f: F) -> Self
    where
        F: Fn(&BlockWritten) + Send + Sync + 'static,
    {
        self.notifier(FnNotifier::new("on_block", f))
    }

    /// Set a callback to receive runtime events.
    ///
    /// Events include dropped frames, period wraps and repositions.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(CaptureEvent) + Send + Sync + 'static,
    {
        self.event_callback = Some(event_callback(callback));
        self
    }

    /// Validates the configuration and allocates the pipeline.
    ///
    /// In ring mode the write position starts at the buffer index matching
    /// the current wall-clock time; in reset mode it starts at zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is inconsistent, see
    /// [`CaptureConfig::validate()`].
    pub fn build(self) -> Result<PeriodCapture, PeriodCaptureError> {
        self.config.validate()?;

        let decimator = Decimator::new(&self.config.coefficients, self.config.decimation_factor)?;
        let state = PeriodState::new(self.config.capacity(), self.config.block_size, decimator);

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let clock = PeriodClock::new(
            clock,
            self.config.period_secs,
            self.config.output_sample_rate(),
        );
        let strategy = self
            .strategy
            .unwrap_or_else(|| self.config.buffer_mode.strategy());

        Ok(PeriodCapture::from_parts(
            self.config,
            clock,
            strategy,
            state,
            self.notifiers,
            self.event_callback,
        ))
    }
}
