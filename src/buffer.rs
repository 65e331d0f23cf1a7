//! Fixed-capacity circular sample buffer with overwrite-on-full semantics.
//!
//! Each sensor owns one [`SampleBuffer`]. Samples are appended with
//! [`enqueue`](SampleBuffer::enqueue), which never fails: once the buffer is
//! full, every further insertion discards the oldest sample to make room.
//! This keeps a fixed recent history under a live sensor feed without
//! unbounded growth.
//!
//! Samples only ever leave through [`drain_oldest`](SampleBuffer::drain_oldest),
//! which removes in FIFO order. The smoothing window for the periodic
//! collection cycle is read non-destructively with
//! [`window`](SampleBuffer::window) so the moving history survives between
//! polls.
//!
//! # Example
//!
//! ```rust
//! use rs_railops::buffer::{EnqueueStatus, SampleBuffer};
//!
//! let mut buf = SampleBuffer::new(5, 5).unwrap();
//! for v in [10, 20, 30, 40] {
//!     assert_eq!(buf.enqueue(v), EnqueueStatus::Stored);
//! }
//! assert_eq!(buf.enqueue(50), EnqueueStatus::Filled);
//! assert_eq!(buf.enqueue(60), EnqueueStatus::Overwrote); // 10 is gone
//!
//! assert_eq!(buf.drain_oldest(5).unwrap(), vec![20, 30, 40, 50, 60]);
//! assert!(buf.is_empty());
//! ```

use thiserror::Error;

/// Errors produced by [`SampleBuffer`] construction and draining.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// Capacity must be at least one slot.
    #[error("buffer capacity must be non-zero")]
    ZeroCapacity,

    /// The smoothing window must satisfy `1 <= window <= capacity`.
    #[error("window size {window} outside 1..={capacity}")]
    InvalidWindow {
        /// Requested window size.
        window: usize,
        /// Configured capacity.
        capacity: usize,
    },

    /// A drain asked for more samples than are currently stored.
    #[error("cannot drain {requested} samples, only {available} stored")]
    Underflow {
        /// Number of samples requested.
        requested: usize,
        /// Number of samples currently stored.
        available: usize,
    },
}

/// Result of an [`enqueue`](SampleBuffer::enqueue) call.
///
/// A tri-state rather than a boolean so callers can raise a one-shot
/// "buffer full" notice on [`Filled`](Self::Filled) without repeating it for
/// every steady-state [`Overwrote`](Self::Overwrote).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueStatus {
    /// Stored with room to spare.
    Stored,
    /// Stored, and the buffer just reached capacity.
    Filled,
    /// Stored by discarding the oldest sample; the buffer stays full.
    Overwrote,
}

/// Fixed-capacity ring of `i32` samples owned by a single sensor channel.
///
/// Two cursors over a fixed slab: `read` points at the oldest stored sample,
/// `write` at the next insertion slot. Both wrap modulo capacity, with
/// `occupancy` tracking how many slots are live.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    storage: Box<[i32]>,
    read: usize,
    write: usize,
    occupancy: usize,
    window_size: usize,
}

impl SampleBuffer {
    /// Create a buffer with the given capacity and smoothing window.
    ///
    /// Fails when `capacity` is zero or `window_size` falls outside
    /// `1..=capacity`. Both settings are fixed for the buffer's lifetime;
    /// they come from the station configuration.
    pub fn new(capacity: usize, window_size: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::ZeroCapacity);
        }
        if window_size == 0 || window_size > capacity {
            return Err(BufferError::InvalidWindow {
                window: window_size,
                capacity,
            });
        }
        Ok(Self {
            storage: vec![0; capacity].into_boxed_slice(),
            read: 0,
            write: 0,
            occupancy: 0,
            window_size,
        })
    }

    /// Append a sample, discarding the oldest one if the buffer is full.
    ///
    /// Never fails; see [`EnqueueStatus`] for the three possible outcomes.
    pub fn enqueue(&mut self, value: i32) -> EnqueueStatus {
        let was_full = self.is_full();

        self.storage[self.write] = value;
        self.write = (self.write + 1) % self.capacity();

        if was_full {
            // Oldest sample overwritten; advance past it.
            self.read = (self.read + 1) % self.capacity();
            EnqueueStatus::Overwrote
        } else {
            self.occupancy += 1;
            if self.is_full() {
                EnqueueStatus::Filled
            } else {
                EnqueueStatus::Stored
            }
        }
    }

    /// Remove and return the `n` oldest samples in insertion order.
    ///
    /// Fails with [`BufferError::Underflow`] when `n` exceeds the current
    /// occupancy, leaving the buffer untouched. `drain_oldest(0)` succeeds
    /// and returns an empty vector.
    pub fn drain_oldest(&mut self, n: usize) -> Result<Vec<i32>, BufferError> {
        if n > self.occupancy {
            return Err(BufferError::Underflow {
                requested: n,
                available: self.occupancy,
            });
        }

        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push(self.storage[(self.read + i) % self.capacity()]);
        }
        self.read = (self.read + n) % self.capacity();
        self.occupancy -= n;
        Ok(out)
    }

    /// Copy of the most recent `min(window_size, occupancy)` samples, oldest
    /// first, without consuming them.
    ///
    /// Empty while the buffer is empty. This is what the collection cycle
    /// feeds to the median filter each poll.
    pub fn window(&self) -> Vec<i32> {
        let len = self.window_size.min(self.occupancy);
        let start = self.occupancy - len;
        (0..len)
            .map(|i| self.storage[(self.read + start + i) % self.capacity()])
            .collect()
    }

    /// The most recently stored sample, if any.
    pub fn last(&self) -> Option<i32> {
        if self.is_empty() {
            None
        } else {
            let idx = (self.write + self.capacity() - 1) % self.capacity();
            Some(self.storage[idx])
        }
    }

    /// Number of samples currently stored.
    pub fn occupancy(&self) -> usize {
        self.occupancy
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Configured smoothing window size.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// True when every slot holds a live sample.
    pub fn is_full(&self) -> bool {
        self.occupancy == self.capacity()
    }

    /// True when no samples are stored.
    pub fn is_empty(&self) -> bool {
        self.occupancy == 0
    }
}

// ============================================================================
// Tests
// ============================================================================
