//! Fixed-capacity store of decimated samples for one period.

/// Decimated samples for the active period plus the write position.
///
/// Storage is allocated once at full capacity and never grows. The write
/// position only moves forward through [`push`](Self::push); everything
/// else that moves it is an explicit reset or rotation.
#[derive(Debug, Clone)]
pub struct PeriodBuffer {
    samples: Vec<f32>,
    position: usize,
}

impl PeriodBuffer {
    /// Allocates a zeroed buffer of `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
            position: 0,
        }
    }

    /// Maximum number of samples the buffer holds.
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Index of the next free slot.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Slots left before the buffer is full.
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }

    /// Returns `true` once the write position has reached capacity.
    pub fn is_full(&self) -> bool {
        self.position == self.samples.len()
    }

    /// The whole fixed-capacity storage, including slots past the position.
    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    /// Writes one sample at the position and advances it.
    ///
    /// Returns `false` without writing when the buffer is full.
    pub fn push(&mut self, sample: f32) -> bool {
        match self.samples.get_mut(self.position) {
            Some(slot) => {
                *slot = sample;
                self.position += 1;
                true
            }
            None => false,
        }
    }

    /// Moves the write position, clamped to capacity. Content is untouched.
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.samples.len());
    }

    /// Rotates the whole storage circularly by `delta` slots.
    ///
    /// Positive values move content toward higher indices, so the sample at
    /// `i` ends up at `(i + delta) mod capacity`. The write position is left
    /// as is.
    pub fn rotate(&mut self, delta: isize) {
        let len = self.samples.len();
        if len == 0 {
            return;
        }
        let shift = delta.unsigned_abs() % len;
        if delta > 0 {
            self.samples.rotate_right(shift);
        } else {
            self.samples.rotate_left(shift);
        }
    }

    /// Zeroes all storage. The write position is left as is.
    pub fn zero(&mut self) {
        self.samples.fill(0.0);
    }
}
