//! Lock-protected mutable state of a capture pipeline.

use crate::pipeline::{Decimator, FrameAccumulator, PeriodBuffer};

/// Everything the write path and the control path both mutate.
///
/// Lives behind the single capture lock: the period buffer and its write
/// position, the partially filled accumulator, the filter history, and the
/// seconds-in-period baseline used for wrap detection.
#[derive(Debug)]
pub struct PeriodState {
    pub(crate) buffer: PeriodBuffer,
    pub(crate) accumulator: FrameAccumulator,
    pub(crate) decimator: Decimator,
    pub(crate) last_second: u32,
}

impl PeriodState {
    pub(crate) fn new(capacity: usize, block_size: usize, decimator: Decimator) -> Self {
        Self {
            buffer: PeriodBuffer::new(capacity),
            accumulator: FrameAccumulator::new(decimator.factor(), block_size),
            decimator,
            last_second: 0,
        }
    }

    /// Current write position.
    pub fn position(&self) -> usize {
        self.buffer.position()
    }

    /// Frames held in the accumulator.
    pub fn fill_offset(&self) -> usize {
        self.accumulator.fill_offset()
    }

    /// Period buffer capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Seconds-in-period recorded by the last write or reposition.
    pub fn baseline_second(&self) -> u32 {
        self.last_second
    }

    /// The period buffer storage.
    pub fn samples(&self) -> &[f32] {
        self.buffer.as_slice()
    }

    /// Moves the write position and discards any partial block.
    pub fn set_position(&mut self, position: usize) {
        self.buffer.set_position(position);
        self.accumulator.reset();
    }

    /// Rotates the whole buffer storage by `delta` slots.
    pub fn rotate(&mut self, delta: isize) {
        self.buffer.rotate(delta);
    }

    /// Records a new seconds-in-period baseline.
    pub fn set_baseline_second(&mut self, second: u32) {
        self.last_second = second;
    }

    /// Zeroes the buffer storage. Indices are untouched.
    pub fn zero_content(&mut self) {
        self.buffer.zero();
    }

    /// Runs the full accumulator through the filter into the period buffer.
    ///
    /// Samples that would land past capacity are discarded. The accumulator
    /// is emptied either way. Returns the number of samples stored.
    pub(crate) fn write_block(&mut self) -> usize {
        let Self {
            buffer,
            accumulator,
            decimator,
            ..
        } = self;

        let mut stored = 0;
        for group in accumulator.groups() {
            let sample = decimator.downsample(group);
            if buffer.push(sample) {
                stored += 1;
            }
        }
        accumulator.reset();
        stored
    }
}
