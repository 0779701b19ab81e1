//! Queue performance counters.

use crate::invariants::debug_assert_monotonic;
use std::time::Duration;

/// Counters mutated inside the queue's critical section.
///
/// Counts only ever increase. `avg_latency` is recomputed incrementally on
/// each dequeue that measured a nonzero wait.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    enqueued: u64,
    dequeued: u64,
    dropped: u64,
    rotated_out: u64,
    errors: u64,
    handed_off: u64,
    max_size: usize,
    total_wait: Duration,
    avg_latency: Duration,
}

/// Point-in-time copy of [`Metrics`] plus the current buffered size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
    /// Messages accepted into a buffer.
    pub enqueued: u64,
    /// Messages delivered to the consumer, including direct handoffs.
    pub dequeued: u64,
    /// Messages discarded by `DropOldest` or `DropNewest`.
    pub dropped: u64,
    /// Messages discarded when `Block` rotated full generations.
    pub rotated_out: u64,
    /// Errors reported through the error path.
    pub errors: u64,
    /// Messages delivered through the handoff slot instead of a buffer.
    pub handed_off: u64,
    /// High-water mark of buffered messages across both generations.
    pub max_size: usize,
    /// Sum of measured consumer waits.
    pub total_wait: Duration,
    /// `total_wait / dequeued`.
    pub avg_latency: Duration,
    /// Messages buffered at snapshot time.
    pub current_size: usize,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_enqueued(&mut self) {
        self.enqueued += 1;
    }

    #[inline]
    pub(crate) fn add_dropped(&mut self, n: u64) {
        self.dropped += n;
    }

    #[inline]
    pub(crate) fn add_rotated_out(&mut self, n: u64) {
        self.rotated_out += n;
    }

    #[inline]
    pub(crate) fn add_error(&mut self) {
        self.errors += 1;
    }

    /// Counts a direct handoff as a delivery on the producer side.
    pub(crate) fn add_handoff(&mut self) {
        self.handed_off += 1;
        self.dequeued += 1;
    }

    /// Counts a buffered message taken by the consumer.
    pub(crate) fn add_dequeued(&mut self, waited: Duration) {
        self.dequeued += 1;
        self.add_wait(waited);
    }

    /// Records the consumer-side wait of a delivery already counted.
    pub(crate) fn add_wait(&mut self, waited: Duration) {
        if waited.is_zero() || self.dequeued == 0 {
            return;
        }
        self.total_wait += waited;
        self.avg_latency =
            Duration::from_nanos((self.total_wait.as_nanos() / u128::from(self.dequeued)) as u64);
    }

    /// Raises the high-water mark to `size` if larger.
    pub(crate) fn observe_size(&mut self, size: usize) {
        let old = self.max_size;
        self.max_size = old.max(size);
        debug_assert_monotonic!("max_size", old, self.max_size);
    }

    pub fn enqueued(&self) -> u64 {
        self.enqueued
    }

    pub fn dequeued(&self) -> u64 {
        self.dequeued
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn rotated_out(&self) -> u64 {
        self.rotated_out
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn avg_latency(&self) -> Duration {
        self.avg_latency
    }

    /// Returns a copy of the counters tagged with `current_size`.
    pub fn snapshot(&self, current_size: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            enqueued: self.enqueued,
            dequeued: self.dequeued,
            dropped: self.dropped,
            rotated_out: self.rotated_out,
            errors: self.errors,
            handed_off: self.handed_off,
            max_size: self.max_size,
            total_wait: self.total_wait,
            avg_latency: self.avg_latency,
            current_size,
        }
    }
}
