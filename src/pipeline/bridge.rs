//! Lock-free hand-off from a real-time audio callback to the write path.
//!
//! ```text
//! Audio Callback → IngestProducer → SPSC Ring → Bridge Task → PeriodCapture::ingest
//! ```
//!
//! The callback side never locks or allocates. The bridge task polls the
//! ring at a fixed interval and feeds whole frames into the capture pipeline.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tokio::task::JoinHandle;

use crate::format::FrameFormat;
use crate::PeriodCapture;

/// Frames moved per `ingest()` call by the bridge.
const DRAIN_CHUNK_FRAMES: usize = 4096;

/// Producer half of an ingest ring, owned by the audio callback.
pub struct IngestProducer {
    producer: HeapProd<u8>,
    stride: usize,
    dropped: Arc<AtomicU64>,
}

impl IngestProducer {
    /// Pushes as many whole frames from `data` as fit.
    ///
    /// Frames that do not fit are dropped and counted; a trailing partial
    /// frame is ignored. Returns the number of frames queued. Never blocks.
    pub fn push_frames(&mut self, data: &[u8]) -> usize {
        let offered = data.len() / self.stride;
        let fits = self.producer.vacant_len() / self.stride;
        let frames = offered.min(fits);

        let pushed = self.producer.push_slice(&data[..frames * self.stride]);
        debug_assert_eq!(pushed, frames * self.stride);

        if frames < offered {
            self.dropped
                .fetch_add((offered - frames) as u64, Ordering::Relaxed);
        }
        frames
    }

    /// Frames dropped so far because the ring was full.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Bytes per frame.
    pub fn stride(&self) -> usize {
        self.stride
    }
}

/// Consumer half of an ingest ring.
///
/// Only whole frames are ever pushed, so the ring always holds a whole
/// number of frames.
pub struct IngestConsumer {
    consumer: HeapCons<u8>,
    stride: usize,
    scratch: Vec<u8>,
    dropped: Arc<AtomicU64>,
}

impl IngestConsumer {
    /// Frames waiting in the ring.
    pub fn available_frames(&self) -> usize {
        self.consumer.occupied_len() / self.stride
    }

    /// Frames the producer has dropped so far.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Pops up to `max_frames` whole frames into an internal scratch buffer.
    ///
    /// Returns an empty slice when nothing is queued.
    pub fn pop_frames(&mut self, max_frames: usize) -> &[u8] {
        let frames = self.available_frames().min(max_frames);
        let len = frames * self.stride;
        self.scratch.resize(len, 0);
        let popped = self.consumer.pop_slice(&mut self.scratch[..len]);
        &self.scratch[..popped]
    }

    /// Moves everything queued into `capture`. Returns frames moved.
    pub fn drain_into(&mut self, capture: &PeriodCapture) -> usize {
        let stride = self.stride;
        let mut moved = 0;
        loop {
            let bytes = self.pop_frames(DRAIN_CHUNK_FRAMES);
            if bytes.is_empty() {
                return moved;
            }
            capture.ingest(bytes);
            moved += bytes.len() / stride;
        }
    }
}

/// Creates an SPSC ring holding up to `capacity_frames` frames of `format`.
///
/// The producer goes to the audio callback, the consumer to
/// [`spawn_ingest_bridge`].
pub fn create_ingest_buffer(
    capacity_frames: usize,
    format: FrameFormat,
) -> (IngestProducer, IngestConsumer) {
    let stride = format.bytes_per_frame();
    let ring = HeapRb::<u8>::new(capacity_frames.max(1) * stride);
    let (producer, consumer) = ring.split();
    let dropped = Arc::new(AtomicU64::new(0));

    (
        IngestProducer {
            producer,
            stride,
            dropped: dropped.clone(),
        },
        IngestConsumer {
            consumer,
            stride,
            scratch: Vec::with_capacity(DRAIN_CHUNK_FRAMES * stride),
            dropped,
        },
    )
}

/// Handle to a running ingest bridge task.
pub struct BridgeHandle {
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<u64>>,
}

impl BridgeHandle {
    /// Returns `true` until [`stop()`](Self::stop) is called.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops polling, drains whatever is still queued into the pipeline and
    /// waits for the task to finish.
    ///
    /// Returns the total number of frames the bridge delivered.
    pub async fn stop(mut self) -> u64 {
        self.running.store(false, Ordering::SeqCst);

        let Some(task) = self.task.take() else {
            return 0;
        };
        match task.await {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!(error = %e, "ingest bridge task failed");
                0
            }
        }
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        // Dropped without stop(): let the task wind down on its own
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Spawns a task that polls `consumer` every `poll_interval` and feeds the
/// queued frames into `capture`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_ingest_bridge(
    mut consumer: IngestConsumer,
    capture: Arc<PeriodCapture>,
    poll_interval: Duration,
) -> BridgeHandle {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();

    tracing::info!(?poll_interval, stride = consumer.stride, "ingest bridge starting");

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_interval);
        let mut total = 0u64;

        while flag.load(Ordering::SeqCst) {
            interval.tick().await;
            total += consumer.drain_into(&capture) as u64;
        }

        total += consumer.drain_into(&capture) as u64;
        tracing::debug!(
            frames = total,
            dropped = consumer.dropped_frames(),
            "ingest bridge stopped"
        );
        total
    });

    BridgeHandle {
        running,
        task: Some(task),
    }
}
