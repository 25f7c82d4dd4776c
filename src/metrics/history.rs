//! Bounded per-node sample history.

use std::collections::VecDeque;

use super::Sample;

/// One day of 5-minute samples.
pub const DEFAULT_CAPACITY: usize = 288;

/// Oldest-first buffer of samples for a single node.
///
/// Insertion order is the time axis; once `capacity` is reached the oldest
/// sample is popped from the front on every push.
#[derive(Debug, Clone)]
pub struct History {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn extend<I: IntoIterator<Item = Sample>>(&mut self, samples: I) {
        for s in samples {
            self.push(s);
        }
    }

    /// Oldest-first slice, as the predictor wants it. Rotates the ring
    /// in place when it has wrapped.
    pub fn samples(&mut self) -> &[Sample] {
        self.samples.make_contiguous()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }
}
