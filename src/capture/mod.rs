//! The period capture pipeline and its write path.

mod state;
mod strategy;

pub use state::PeriodState;
pub use strategy::{resync_position, BufferStrategy, Reposition, ResetStrategy, RingStrategy};

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::clock::PeriodClock;
use crate::event::{CaptureEvent, EventCallback};
use crate::format::FrameFormat;
use crate::notify::{BlockWritten, Notifier};
use crate::pipeline::FrameAccumulator;
use crate::{CaptureConfig, PeriodCaptureBuilder};

/// Statistics about a capture pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Decimation blocks completed (one notification each).
    pub blocks_written: u64,
    /// Decimated samples stored in the period buffer.
    pub samples_written: u64,
    /// Raw input frames discarded because the buffer was full.
    pub frames_dropped: u64,
    /// Period rollovers detected by the write path.
    pub period_wraps: u64,
    /// Explicit repositions via `clear()` or `resync()`.
    pub repositions: u64,
}

/// Internal counters shared by the write and control paths.
#[derive(Debug, Default)]
struct CaptureCounters {
    blocks_written: AtomicU64,
    samples_written: AtomicU64,
    frames_dropped: AtomicU64,
    period_wraps: AtomicU64,
    repositions: AtomicU64,
}

/// What happened during one locked write, reported once the lock is gone.
#[derive(Debug, Default)]
struct WriteOutcome {
    events: Vec<CaptureEvent>,
    blocks: Vec<usize>,
}

/// Real-time ingest into a wall-clock aligned period buffer.
///
/// Raw PCM goes in through [`ingest()`](Self::ingest). It is low-pass
/// filtered, decimated, and appended to the period buffer, and every
/// completed block is announced to the registered [`Notifier`]s. A control
/// thread may realign the buffer at any time with [`resync()`](Self::resync),
/// [`clear()`](Self::clear) or [`reset_content()`](Self::reset_content).
///
/// All mutable state sits behind one lock held for exactly one operation.
/// Notifications and events are delivered after that lock is released, so
/// anything they trigger sees the write that caused them.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use period_capture::{ManualClock, PeriodCapture};
///
/// let capture = PeriodCapture::builder()
///     .clock(Arc::new(ManualClock::new(0)))
///     .build()
///     .unwrap();
///
/// // 1024 i16 frames = one block of 256 decimated samples
/// let consumed = capture.ingest(&vec![0u8; 2048]);
/// assert_eq!(consumed, 2048);
/// assert_eq!(capture.position(), 256);
/// ```
pub struct PeriodCapture {
    config: CaptureConfig,
    format: FrameFormat,
    clock: PeriodClock,
    strategy: Box<dyn BufferStrategy>,
    state: Mutex<PeriodState>,
    notifiers: Vec<Arc<dyn Notifier>>,
    event_callback: Option<EventCallback>,
    counters: CaptureCounters,
}

impl PeriodCapture {
    /// Creates a builder with default settings.
    pub fn builder() -> PeriodCaptureBuilder {
        PeriodCaptureBuilder::new()
    }

    /// Assembles a pipeline from validated parts.
    pub(crate) fn from_parts(
        config: CaptureConfig,
        clock: PeriodClock,
        strategy: Box<dyn BufferStrategy>,
        mut state: PeriodState,
        notifiers: Vec<Arc<dyn Notifier>>,
        event_callback: Option<EventCallback>,
    ) -> Self {
        let initial = strategy.reset_position(&mut state, &clock);

        tracing::info!(
            strategy = strategy.name(),
            input_rate = config.input_sample_rate,
            output_rate = config.output_sample_rate(),
            period_secs = config.period_secs,
            capacity = state.capacity(),
            block_size = config.block_size,
            position = initial.to,
            "period capture created"
        );

        Self {
            format: config.frame_format(),
            config,
            clock,
            strategy,
            state: Mutex::new(state),
            notifiers,
            event_callback,
            counters: CaptureCounters::default(),
        }
    }

    /// Ingests a chunk of raw PCM bytes.
    ///
    /// The chunk must contain whole frames; a trailing partial frame is a
    /// caller bug (asserted in debug builds, ignored in release). Frames
    /// beyond what the period buffer can still hold are dropped.
    ///
    /// Always returns `data.len()`: the producer is never asked to retry.
    pub fn ingest(&self, data: &[u8]) -> usize {
        let stride = self.format.bytes_per_frame();
        debug_assert!(
            data.len() % stride == 0,
            "torn frame: {} bytes is not a multiple of the {stride}-byte frame",
            data.len()
        );

        let format = self.format;
        self.ingest_with(data.len() / stride, |acc, frames| {
            acc.store(&data[frames.start * stride..frames.end * stride], &format)
        });

        data.len()
    }

    /// Ingests already-decoded mono samples at the input rate.
    ///
    /// Same policy as [`ingest()`](Self::ingest); returns `samples.len()`.
    pub fn ingest_samples(&self, samples: &[f32]) -> usize {
        self.ingest_with(samples.len(), |acc, frames| {
            acc.store_samples(&samples[frames])
        });
        samples.len()
    }

    fn ingest_with<F>(&self, requested: usize, mut store: F)
    where
        F: FnMut(&mut FrameAccumulator, Range<usize>) -> usize,
    {
        let mut outcome = WriteOutcome::default();

        let now_ms = {
            let mut state = self.state.lock();

            // Clock and wrap baseline are read together; resync moves both
            let now_ms = self.clock.now_ms();
            let second = self.clock.second_in_period(now_ms);

            if second < state.last_second {
                outcome.events.push(CaptureEvent::PeriodWrapped {
                    previous_second: state.last_second,
                    second,
                });
                state.set_position(0);
                self.counters.period_wraps.fetch_add(1, Ordering::SeqCst);
                tracing::trace!(previous = state.last_second, second, "period wrapped");
            }
            state.last_second = second;

            let acceptable = state.buffer.remaining() * self.config.decimation_factor;
            let accepted = requested.min(acceptable);
            if accepted < requested {
                let dropped = requested - accepted;
                self.counters
                    .frames_dropped
                    .fetch_add(dropped as u64, Ordering::SeqCst);
                tracing::debug!(
                    dropped,
                    position = state.position(),
                    second,
                    "period buffer full, dropping frames"
                );
                outcome.events.push(CaptureEvent::FramesDropped {
                    dropped_frames: dropped,
                    position: state.position(),
                    second_in_period: second,
                });
            }

            let mut done = 0;
            while done < accepted {
                done += store(&mut state.accumulator, done..accepted);
                if state.accumulator.is_full() {
                    let stored = state.write_block();
                    self.counters
                        .samples_written
                        .fetch_add(stored as u64, Ordering::SeqCst);
                    outcome.blocks.push(state.position());
                }
            }

            now_ms
        };

        self.deliver(outcome, now_ms);
    }

    /// Hands notifications and events to their consumers. Lock must not be held.
    fn deliver(&self, outcome: WriteOutcome, now_ms: i64) {
        for event in outcome.events {
            self.emit_event(event);
        }

        for position in outcome.blocks {
            let blocks = self.counters.blocks_written.fetch_add(1, Ordering::SeqCst);
            if blocks % 100 == 0 {
                tracing::debug!(block = blocks, position, "block written");
            }

            let block = BlockWritten {
                position,
                timestamp_ms: now_ms,
            };
            for notifier in &self.notifiers {
                notifier.notify(&block);
            }
        }
    }

    fn emit_event(&self, event: CaptureEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(event);
        }
    }

    /// Resets the write position according to the configured
    /// [`BufferStrategy`].
    ///
    /// In ring mode this realigns with the wall clock (see
    /// [`resync()`](Self::resync)); in reset mode it restarts at zero.
    pub fn clear(&self) -> Reposition {
        let reposition = {
            let mut state = self.state.lock();
            self.strategy.reset_position(&mut state, &self.clock)
        };
        self.after_reposition(reposition)
    }

    /// Realigns the write position with the wall clock, rotating the buffer
    /// so captured samples keep their time alignment.
    ///
    /// Call this when the clock source reports a drift correction. Runs
    /// regardless of the configured strategy. Calling it twice without the
    /// clock advancing yields a zero delta the second time.
    pub fn resync(&self) -> Reposition {
        let reposition = {
            let mut state = self.state.lock();
            resync_position(&mut state, &self.clock)
        };
        self.after_reposition(reposition)
    }

    fn after_reposition(&self, reposition: Reposition) -> Reposition {
        self.counters.repositions.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            from = reposition.from,
            to = reposition.to,
            delta = reposition.delta,
            "repositioned period buffer"
        );
        self.emit_event(CaptureEvent::Repositioned {
            from: reposition.from,
            to: reposition.to,
            delta: reposition.delta,
        });
        reposition
    }

    /// Resets buffer content according to the configured strategy (zeroed by
    /// default). Indices are untouched.
    pub fn reset_content(&self) {
        {
            let mut state = self.state.lock();
            self.strategy.reset_content(&mut state);
        }
        tracing::debug!("cleared period buffer content");
        self.emit_event(CaptureEvent::ContentCleared);
    }

    /// Runs `f` over the buffer storage and the current write position.
    ///
    /// The lock is held for the duration of `f`; keep it short.
    pub fn with_samples<R>(&self, f: impl FnOnce(&[f32], usize) -> R) -> R {
        let state = self.state.lock();
        f(state.samples(), state.position())
    }

    /// Copies the valid part of the buffer, `[0, position)`.
    pub fn snapshot(&self) -> Vec<f32> {
        self.with_samples(|samples, position| samples[..position].to_vec())
    }

    /// Current write position.
    pub fn position(&self) -> usize {
        self.state.lock().position()
    }

    /// Frames waiting in the accumulator for the next block.
    pub fn fill_offset(&self) -> usize {
        self.state.lock().fill_offset()
    }

    /// Period buffer capacity in decimated samples.
    pub fn capacity(&self) -> usize {
        self.state.lock().capacity()
    }

    /// Returns `true` once the buffer is full for this period.
    pub fn is_full(&self) -> bool {
        self.state.lock().buffer.is_full()
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Name of the active buffer strategy.
    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Returns current statistics.
    pub fn stats(&self) -> CaptureStats {
        CaptureStats {
            blocks_written: self.counters.blocks_written.load(Ordering::SeqCst),
            samples_written: self.counters.samples_written.load(Ordering::SeqCst),
            frames_dropped: self.counters.frames_dropped.load(Ordering::SeqCst),
            period_wraps: self.counters.period_wraps.load(Ordering::SeqCst),
            repositions: self.counters.repositions.load(Ordering::SeqCst),
        }
    }
}

impl std::fmt::Debug for PeriodCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodCapture")
            .field("config", &self.config)
            .field("strategy", &self.strategy)
            .field("notifiers", &self.notifiers.len())
            .finish_non_exhaustive()
    }
}
