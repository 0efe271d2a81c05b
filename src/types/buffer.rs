//! Bounded, time-ordered ring of recent orientation samples
//!
//! Holds roughly the last 2.6 seconds of motion at 60Hz. Feature extraction
//! runs over a snapshot of this buffer once the challenge completes.

use std::collections::VecDeque;

use crate::types::OrientationSample;
use crate::SAMPLE_BUFFER_CAP;

/// Capped sample ring. Oldest samples drop on overflow; non-increasing
/// timestamps are rejected so the buffer never holds out-of-order samples.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<OrientationSample>,
    cap: usize,
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleBuffer {
    /// Create a buffer with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(SAMPLE_BUFFER_CAP)
    }

    /// Create a buffer with a custom capacity
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Append a sample. Returns false if the sample was rejected for not
    /// advancing the clock.
    pub fn push(&mut self, sample: OrientationSample) -> bool {
        if let Some(last) = self.samples.back() {
            if sample.timestamp_ms <= last.timestamp_ms {
                return false;
            }
        }
        if self.samples.len() == self.cap {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        true
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate oldest first
    pub fn iter(&self) -> impl Iterator<Item = &OrientationSample> {
        self.samples.iter()
    }

    /// Copy out the current contents, oldest first
    pub fn snapshot(&self) -> Vec<OrientationSample> {
        self.samples.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
