//! # period-capture
//!
//! **Note:** This crate is under active development. The API may change before 1.0.
//!
//! Real-time audio ingest into a wall-clock aligned period buffer.
//!
//! `period-capture` takes raw PCM from a live source, low-pass filters and
//! decimates it, and stores the result in a fixed-capacity buffer whose
//! write position tracks time within a repeating period (15 s, 60 s, ...).
//! A downstream decoder is notified after every block and reads the buffer
//! once the period is complete.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use period_capture::{BlockWritten, ChannelNotifier, PeriodCapture};
//! use tokio::sync::mpsc;
//!
//! # async fn run(audio: &[u8]) -> Result<(), period_capture::PeriodCaptureError> {
//! let (tx, mut rx) = mpsc::channel::<BlockWritten>(64);
//!
//! let capture = Arc::new(
//!     PeriodCapture::builder()
//!         .period_secs(15)
//!         .notifier(ChannelNotifier::new(tx))
//!         .on_event(|e| tracing::warn!(?e, "capture event"))
//!         .build()?,
//! );
//!
//! // From the audio thread: 48 kHz mono i16 frames
//! capture.ingest(audio);
//!
//! // Elsewhere: react to completed blocks
//! while let Some(block) = rx.recv().await {
//!     let samples = capture.snapshot();
//!     assert_eq!(samples.len(), block.position);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Write path**: [`PeriodCapture::ingest`] checks for a period wrap,
//!   clamps input to the remaining capacity, accumulates one block,
//!   decimates it and appends it to the buffer
//! - **Clock sync**: [`PeriodCapture::resync`] moves the write position to
//!   "now" and rotates the buffer so captured audio keeps its alignment
//! - **Bridge**: an optional lock-free ring lets a real-time callback hand
//!   off bytes without touching the capture lock
//!
//! One lock guards the buffer, its indices and the filter state. It is never
//! held while notifiers or event callbacks run.

#![warn(missing_docs)]
// DSP code requires intentional numeric casts between sample domains
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless
)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
// These doc lints are too strict for internal implementation details
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod builder;
mod capture;
pub mod clock;
mod config;
mod error;
mod event;
pub mod format;
pub mod notify;
pub mod pipeline;
pub mod source;

pub use builder::PeriodCaptureBuilder;
pub use capture::{
    resync_position, BufferStrategy, CaptureStats, PeriodCapture, PeriodState, Reposition,
    ResetStrategy, RingStrategy,
};
pub use clock::{Clock, DriftingClock, ManualClock, PeriodClock, SystemClock};
pub use config::{BufferMode, CaptureConfig, MAX_PERIOD_LIMIT_SECS};
pub use error::PeriodCaptureError;
pub use event::{event_callback, CaptureEvent, EventCallback};
pub use format::{ChannelSelection, FrameFormat, SampleFormat};
pub use notify::{BlockWritten, ChannelNotifier, FnNotifier, Notifier};
pub use pipeline::{create_ingest_buffer, spawn_ingest_bridge, BridgeHandle};
pub use source::MockSource;
