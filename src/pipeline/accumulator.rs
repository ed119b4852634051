//! Frame accumulator that batches raw frames into decimation blocks.

use crate::format::FrameFormat;

/// Scratch buffer holding exactly one decimation block of decoded frames.
///
/// Frames are decoded on the way in, so the accumulator always holds mono
/// f32 samples at the input rate. Once [`is_full`](Self::is_full) the caller
/// drains it group by group via [`groups`](Self::groups) and then calls
/// [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct FrameAccumulator {
    frames: Vec<f32>,
    fill: usize,
    group_size: usize,
}

impl FrameAccumulator {
    /// Creates an accumulator for `block_size` groups of `group_size` frames.
    pub fn new(group_size: usize, block_size: usize) -> Self {
        Self {
            frames: vec![0.0; group_size * block_size],
            fill: 0,
            group_size,
        }
    }

    /// Total frames per block.
    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    /// Frames currently held (the fill offset).
    pub fn fill_offset(&self) -> usize {
        self.fill
    }

    /// Frames still needed to complete the block.
    pub fn remaining(&self) -> usize {
        self.frames.len() - self.fill
    }

    /// Returns `true` once a whole block has been stored.
    pub fn is_full(&self) -> bool {
        self.fill == self.frames.len()
    }

    /// Decodes whole frames from `bytes` into the accumulator.
    ///
    /// Stores at most [`remaining()`](Self::remaining) frames and returns how
    /// many were taken. Trailing bytes that do not form a full frame are
    /// ignored.
    pub fn store(&mut self, bytes: &[u8], format: &FrameFormat) -> usize {
        let stride = format.bytes_per_frame();
        let mut stored = 0;
        for (slot, frame) in self.frames[self.fill..]
            .iter_mut()
            .zip(bytes.chunks_exact(stride))
        {
            *slot = format.decode_frame(frame);
            stored += 1;
        }
        self.fill += stored;
        stored
    }

    /// Stores already-decoded mono samples.
    pub fn store_samples(&mut self, samples: &[f32]) -> usize {
        let n = samples.len().min(self.remaining());
        self.frames[self.fill..self.fill + n].copy_from_slice(&samples[..n]);
        self.fill += n;
        n
    }

    /// Iterates the block as consecutive decimation groups.
    pub fn groups(&self) -> std::slice::ChunksExact<'_, f32> {
        self.frames.chunks_exact(self.group_size)
    }

    /// Discards any partial block.
    pub fn reset(&mut self) {
        self.fill = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ChannelSelection, SampleFormat};

    fn mono_i16() -> FrameFormat {
        FrameFormat {
            sample_format: SampleFormat::I16,
            channels: 1,
            selection: ChannelSelection::Mono,
        }
    }

    fn i16_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_store_partial() {
        let mut acc = FrameAccumulator::new(4, 2);
        assert_eq!(acc.capacity(), 8);

        let stored = acc.store(&i16_bytes(&[0; 5]), &mono_i16());
        assert_eq!(stored, 5);
        assert_eq!(acc.fill_offset(), 5);
        assert_eq!(acc.remaining(), 3);
        assert!(!acc.is_full());
    }

    #[test]
    fn test_store_stops_at_capacity() {
        let mut acc = FrameAccumulator::new(4, 2);
        let stored = acc.store(&i16_bytes(&[1; 12]), &mono_i16());
        assert_eq!(stored, 8);
        assert!(acc.is_full());

        // Full accumulator takes nothing more
        assert_eq!(acc.store(&i16_bytes(&[1; 4]), &mono_i16()), 0);
    }

    #[test]
    fn test_store_across_calls() {
        let mut acc = FrameAccumulator::new(2, 2);
        acc.store(&i16_bytes(&[16384, 16384, 0]), &mono_i16());
        acc.store(&i16_bytes(&[-16384]), &mono_i16());

        let groups: Vec<&[f32]> = acc.groups().collect();
        assert_eq!(groups, vec![&[0.5f32, 0.5][..], &[0.0f32, -0.5][..]]);
    }

    #[test]
    fn test_torn_frame_ignored() {
        let mut acc = FrameAccumulator::new(4, 1);
        let mut bytes = i16_bytes(&[0, 0]);
        bytes.push(0xff);
        assert_eq!(acc.store(&bytes, &mono_i16()), 2);
    }

    #[test]
    fn test_store_samples() {
        let mut acc = FrameAccumulator::new(2, 2);
        assert_eq!(acc.store_samples(&[1.0; 3]), 3);
        assert_eq!(acc.store_samples(&[2.0; 3]), 1);
        assert!(acc.is_full());
    }

    #[test]
    fn test_reset() {
        let mut acc = FrameAccumulator::new(4, 2);
        acc.store(&i16_bytes(&[0; 8]), &mono_i16());
        acc.reset();
        assert_eq!(acc.fill_offset(), 0);
        assert_eq!(acc.remaining(), 8);
    }
}
