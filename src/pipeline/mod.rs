//! Signal path components.
//!
//! ```text
//! Raw PCM → Frame Accumulator → Decimator → Period Buffer
//! ```
//!
//! - **Frame Accumulator**: Batches decoded frames into one decimation block
//! - **Decimator**: Streaming FIR low-pass plus integer downsampling
//! - **Period Buffer**: Fixed-capacity sample store with a write position
//! - **Bridge**: Lock-free SPSC ring feeding the write path from an audio callback
//!
//! These are the building blocks of [`PeriodCapture`](crate::PeriodCapture);
//! they are public for callers that want to run the filter on its own.

mod accumulator;
mod bridge;
mod decimator;
mod period_buffer;

pub use accumulator::FrameAccumulator;
pub use bridge::{
    create_ingest_buffer, spawn_ingest_bridge, BridgeHandle, IngestConsumer, IngestProducer,
};
pub(crate) use decimator::validate_coefficients;
pub use decimator::{Decimator, LOWPASS_48K_TO_12K};
pub use period_buffer::PeriodBuffer;
