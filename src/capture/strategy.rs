//! Buffer repositioning strategies.
//!
//! Both strategies answer the same two questions: where should the write
//! position go when the buffer is cleared, and what happens to the content.

use std::fmt;

use crate::capture::PeriodState;
use crate::clock::PeriodClock;

/// Result of moving the write position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reposition {
    /// Position before the move.
    pub from: usize,
    /// Position after the move.
    pub to: usize,
    /// Position change, `to - from`.
    pub delta: isize,
}

impl Reposition {
    fn new(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            delta: to as isize - from as isize,
        }
    }
}

/// Selects how [`PeriodCapture::clear()`] and
/// [`PeriodCapture::reset_content()`] treat the buffer.
///
/// Both methods run with the capture lock held.
///
/// [`PeriodCapture::clear()`]: crate::PeriodCapture::clear
/// [`PeriodCapture::reset_content()`]: crate::PeriodCapture::reset_content
pub trait BufferStrategy: Send + Sync + fmt::Debug {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Moves the write position and resets the accumulator.
    fn reset_position(&self, state: &mut PeriodState, clock: &PeriodClock) -> Reposition;

    /// Resets buffer content. Zeroes all storage by default.
    fn reset_content(&self, state: &mut PeriodState) {
        state.zero_content();
    }
}

/// Aligns the write position with the wall clock, rotating the content so
/// already-captured samples keep their place in time.
///
/// The sample that was at the old position ends up at the new one. The
/// rotation covers the whole storage, so content far from that boundary is
/// stale until the write path overwrites it.
pub fn resync_position(state: &mut PeriodState, clock: &PeriodClock) -> Reposition {
    let now_ms = clock.now_ms();
    let from = state.position();
    let to = clock.target_position(now_ms, state.capacity());
    let reposition = Reposition::new(from, to);

    state.rotate(reposition.delta);
    state.set_position(to);
    state.set_baseline_second(clock.second_in_period(now_ms));

    reposition
}

/// Ring buffer mode: clearing realigns with the wall clock via
/// [`resync_position`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RingStrategy;

impl BufferStrategy for RingStrategy {
    fn name(&self) -> &str {
        "ring"
    }

    fn reset_position(&self, state: &mut PeriodState, clock: &PeriodClock) -> Reposition {
        resync_position(state, clock)
    }
}

/// Simple reset mode: clearing restarts at position zero without touching
/// content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetStrategy;

impl BufferStrategy for ResetStrategy {
    fn name(&self) -> &str {
        "reset"
    }

    fn reset_position(&self, state: &mut PeriodState, _clock: &PeriodClock) -> Reposition {
        let from = state.position();
        state.set_position(0);
        Reposition::new(from, 0)
    }
}
