//! Block-completion notifications for downstream consumers.
//!
//! A [`Notifier`] is told every time a decimation block lands in the period
//! buffer. The crate provides two built-in notifiers:
//!
//! - [`ChannelNotifier`]: Forwards to a bounded tokio mpsc channel
//! - [`FnNotifier`]: Wraps a closure
//!
//! You can implement the [`Notifier`] trait for custom consumers such as a
//! decoder trigger or a waterfall redraw.

mod channel;

pub use channel::ChannelNotifier;

/// One completed decimation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWritten {
    /// Write position after the block. Samples `[0, position)` are valid
    /// for the current period.
    pub position: usize,
    /// Wall-clock time the block was written, in ms since the Unix epoch.
    pub timestamp_ms: i64,
}

/// A consumer of block-completion notifications.
///
/// # Implementation Notes
///
/// - Called on the ingest thread, after the capture lock is released
/// - Must not block: the producer is a real-time audio path
/// - The buffer write that caused the notification is already visible
///
/// # Example
///
/// ```
/// use period_capture::{BlockWritten, Notifier};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct Latest(AtomicUsize);
///
/// impl Notifier for Latest {
///     fn name(&self) -> &str {
///         "latest"
///     }
///
///     fn notify(&self, block: &BlockWritten) {
///         self.0.store(block.position, Ordering::Release);
///     }
/// }
/// ```
pub trait Notifier: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Called once per completed block.
    fn notify(&self, block: &BlockWritten);
}

/// A notifier backed by a closure.
pub struct FnNotifier<F> {
    name: String,
    f: F,
}

impl<F> FnNotifier<F>
where
    F: Fn(&BlockWritten) + Send + Sync,
{
    /// Wraps `f` under the given name.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Notifier for FnNotifier<F>
where
    F: Fn(&BlockWritten) + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, block: &BlockWritten) {
        (self.f)(block);
    }
}
