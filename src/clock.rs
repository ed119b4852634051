//! Wall-clock sources and period arithmetic.
//!
//! The pipeline never corrects drift itself. It asks a [`Clock`] for the
//! current time and derives "where are we in the period" from it.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds in one UTC day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// A source of current wall-clock time.
///
/// Implementations must be cheap to call; the write path queries the clock
/// once per ingested chunk while holding the capture lock, so `now_ms` must
/// never call back into the pipeline.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// The operating system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as i64)
    }
}

/// System time shifted by an externally measured drift.
///
/// Whatever measures the offset (NTP check, decoded time signals) calls
/// [`set_drift_ms`](Self::set_drift_ms); readers see the new value on their
/// next query.
#[derive(Debug, Default)]
pub struct DriftingClock {
    drift_ms: AtomicI64,
}

impl DriftingClock {
    /// Creates a clock with the given initial drift.
    pub fn new(drift_ms: i64) -> Self {
        Self {
            drift_ms: AtomicI64::new(drift_ms),
        }
    }

    /// Returns the current drift offset in milliseconds.
    pub fn drift_ms(&self) -> i64 {
        self.drift_ms.load(Ordering::Relaxed)
    }

    /// Replaces the drift offset.
    pub fn set_drift_ms(&self, drift_ms: i64) {
        self.drift_ms.store(drift_ms, Ordering::Relaxed);
    }
}

impl Clock for DriftingClock {
    fn now_ms(&self) -> i64 {
        SystemClock.now_ms() + self.drift_ms()
    }
}

/// A clock that only moves when told to.
///
/// Useful for tests and for replaying recorded audio against its original
/// timestamps.
///
/// # Example
///
/// ```
/// use period_capture::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000);
/// clock.advance_ms(500);
/// assert_eq!(clock.now_ms(), 1_500);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `now_ms`.
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    /// Moves the clock to an absolute time.
    pub fn set_ms(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    /// Moves the clock forward (or backward, for negative values).
    pub fn advance_ms(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Milliseconds elapsed in the current period.
///
/// Periods are aligned to UTC midnight, so a 15 s period always starts at
/// :00, :15, :30 and :45.
#[must_use]
pub fn ms_in_period(now_ms: i64, period_secs: u32) -> u64 {
    let period_ms = i64::from(period_secs.max(1)) * 1000;
    now_ms.rem_euclid(MS_PER_DAY).rem_euclid(period_ms) as u64
}

/// Whole seconds elapsed in the current period.
#[must_use]
pub fn second_in_period(now_ms: i64, period_secs: u32) -> u32 {
    let second_of_day = now_ms.rem_euclid(MS_PER_DAY) / 1000;
    (second_of_day % i64::from(period_secs.max(1))) as u32
}

/// A [`Clock`] bound to one period length and output rate.
///
/// Translates wall-clock readings into period-relative quantities: seconds
/// elapsed for wrap detection, and the buffer index that corresponds to
/// "now".
#[derive(Debug, Clone)]
pub struct PeriodClock {
    clock: Arc<dyn Clock>,
    period_secs: u32,
    output_rate: u32,
}

impl PeriodClock {
    /// Binds `clock` to a period length and decimated sample rate.
    pub fn new(clock: Arc<dyn Clock>, period_secs: u32, output_rate: u32) -> Self {
        Self {
            clock,
            period_secs,
            output_rate,
        }
    }

    /// Current time in ms since the Unix epoch.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Period length in seconds.
    pub fn period_secs(&self) -> u32 {
        self.period_secs
    }

    /// Whole seconds elapsed in the period at `now_ms`.
    pub fn second_in_period(&self, now_ms: i64) -> u32 {
        second_in_period(now_ms, self.period_secs)
    }

    /// Buffer index matching `now_ms`, clamped to `capacity`.
    pub fn target_position(&self, now_ms: i64, capacity: usize) -> usize {
        let ms = ms_in_period(now_ms, self.period_secs);
        let index = ms * u64::from(self.output_rate) / 1000;
        usize::try_from(index).map_or(capacity, |i| i.min(capacity))
    }
}
