//! Tokio mpsc channel notifier implementation.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::notify::{BlockWritten, Notifier};

/// A notifier that forwards block completions to a bounded tokio channel.
///
/// Sends never wait. If the receiver falls behind and the channel is full,
/// the notification is dropped and a warning is logged; the next block's
/// notification carries a newer position anyway.
///
/// # Example
///
/// ```
/// use period_capture::{BlockWritten, ChannelNotifier};
/// use tokio::sync::mpsc;
///
/// let (tx, _rx) = mpsc::channel::<BlockWritten>(16);
/// let notifier = ChannelNotifier::new(tx);
///
/// // Register with PeriodCapture::builder().notifier(notifier), then:
/// // while let Some(block) = rx.recv().await { decode up to block.position }
/// ```
pub struct ChannelNotifier {
    name: String,
    sender: mpsc::Sender<BlockWritten>,
}

impl ChannelNotifier {
    /// Creates a new channel notifier with the given sender.
    pub fn new(sender: mpsc::Sender<BlockWritten>) -> Self {
        Self {
            name: "channel".to_string(),
            sender,
        }
    }

    /// Creates a new channel notifier with a custom name.
    pub fn with_name(name: impl Into<String>, sender: mpsc::Sender<BlockWritten>) -> Self {
        Self {
            name: name.into(),
            sender,
        }
    }
}

impl Notifier for ChannelNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, block: &BlockWritten) {
        match self.sender.try_send(*block) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    notifier = %self.name,
                    position = block.position,
                    "notification channel full, dropping block notification"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(notifier = %self.name, "notification channel closed");
            }
        }
    }
}
