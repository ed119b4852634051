//! Runtime events for monitoring capture health.
//!
//! Events are non-fatal notifications about pipeline behavior. Capture
//! continues after every event; they exist for logging and metrics, not
//! error handling.

use std::sync::Arc;

/// Runtime events emitted by a [`PeriodCapture`](crate::PeriodCapture).
///
/// All events are delivered after the capture lock has been released, so a
/// callback may safely read the buffer.
///
/// # Example
///
/// ```
/// use period_capture::CaptureEvent;
///
/// fn handle_event(event: CaptureEvent) {
///     match event {
///         CaptureEvent::FramesDropped { dropped_frames, position, .. } => {
///             eprintln!("buffer full at {position}: dropped {dropped_frames} frames");
///         }
///         CaptureEvent::PeriodWrapped { previous_second, second } => {
///             eprintln!("new period ({previous_second}s -> {second}s)");
///         }
///         CaptureEvent::Repositioned { from, to, delta } => {
///             eprintln!("moved write position {from} -> {to} ({delta:+})");
///         }
///         CaptureEvent::ContentCleared => {
///             eprintln!("period buffer zeroed");
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Input arrived after the period buffer filled up and was discarded.
    ///
    /// Happens whenever input keeps arriving after the buffer reached
    /// capacity. Capture resumes when the next period starts.
    FramesDropped {
        /// Raw input frames discarded from this chunk.
        dropped_frames: usize,
        /// Write position at the time of the drop.
        position: usize,
        /// Whole seconds elapsed in the period.
        second_in_period: u32,
    },

    /// The wall clock crossed a period boundary and the write position
    /// restarted at zero.
    PeriodWrapped {
        /// Seconds-in-period seen on the previous write.
        previous_second: u32,
        /// Seconds-in-period seen on this write.
        second: u32,
    },

    /// The write position was realigned with the wall clock.
    Repositioned {
        /// Position before the move.
        from: usize,
        /// Position after the move.
        to: usize,
        /// Rotation applied to the buffer content (`to - from`).
        delta: isize,
    },

    /// The whole period buffer was zeroed.
    ContentCleared,
}

/// Callback type for receiving runtime events.
///
/// Register one via [`PeriodCaptureBuilder::on_event()`].
///
/// [`PeriodCaptureBuilder::on_event()`]: crate::PeriodCaptureBuilder::on_event
pub type EventCallback = Arc<dyn Fn(CaptureEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// # Example
///
/// ```
/// use period_capture::{event_callback, CaptureEvent};
///
/// let callback = event_callback(|event| {
///     println!("Got event: {:?}", event);
/// });
/// callback(CaptureEvent::ContentCleared);
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(CaptureEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}
