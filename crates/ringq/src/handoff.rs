//! Single-slot handoff between producers and the parked consumer.
//!
//! The slot is plain data guarded by the queue's lock; wake-ups travel over a
//! separate `tokio::sync::Notify` owned by the queue. A consumer registers its
//! `Notified` future *before* inspecting the slot, so a signal raised between
//! the inspection and the await is never lost.
//!
//! ```text
//!  producer                      slot                      consumer
//!  ────────                      ────                      ────────
//!                                 ◄── park() ───────────── buffers empty
//!  deliver(msg) ────────────────► value = msg
//!  notify_one() ────────────────────────────────────────► wakes
//!                                 ──── take_value() ─────► yields msg
//! ```
//!
//! The slot is "signaled" while it holds a value, an error, or a bare wake
//! issued by `complete()`/`abort()`. It is vacant otherwise.

use crate::error::QueueError;
use crate::invariants::{debug_assert_single_consumer, debug_assert_slot_vacant};

pub(crate) struct HandoffSlot<T> {
    /// Message delivered directly by a producer.
    value: Option<T>,
    /// Error to deliver to the next pull (abort or fatal escalation).
    error: Option<QueueError>,
    /// Wake with no payload; the consumer re-reads the lifecycle.
    woken: bool,
    /// A consumer pull is suspended waiting on this slot.
    parked: bool,
}

impl<T> HandoffSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            value: None,
            error: None,
            woken: false,
            parked: false,
        }
    }

    #[inline]
    pub(crate) fn is_signaled(&self) -> bool {
        self.value.is_some() || self.error.is_some() || self.woken
    }

    #[inline]
    pub(crate) fn is_parked(&self) -> bool {
        self.parked
    }

    #[inline]
    pub(crate) fn is_woken(&self) -> bool {
        self.woken
    }

    #[cfg(test)]
    pub(crate) fn has_value(&self) -> bool {
        self.value.is_some()
    }

    // ---------------------------------------------------------------------
    // CONSUMER SIDE
    // ---------------------------------------------------------------------

    pub(crate) fn park(&mut self) {
        debug_assert_single_consumer!(self.parked);
        self.parked = true;
    }

    pub(crate) fn unpark(&mut self) {
        self.parked = false;
    }

    pub(crate) fn take_value(&mut self) -> Option<T> {
        let value = self.value.take();
        if value.is_some() {
            self.woken = false;
        }
        value
    }

    pub(crate) fn take_error(&mut self) -> Option<QueueError> {
        self.error.take()
    }

    /// Clears a bare wake after the consumer has observed it.
    pub(crate) fn acknowledge(&mut self) {
        self.woken = false;
    }

    // ---------------------------------------------------------------------
    // PRODUCER / CONTROL SIDE
    // ---------------------------------------------------------------------

    pub(crate) fn deliver(&mut self, value: T) {
        debug_assert_slot_vacant!(self.value.is_some());
        self.value = Some(value);
    }

    pub(crate) fn fail(&mut self, error: QueueError) {
        self.error = Some(error);
    }

    pub(crate) fn signal(&mut self) {
        self.woken = true;
    }

    /// Drops an undelivered value. Returns `true` if one was discarded.
    pub(crate) fn discard_value(&mut self) -> bool {
        self.value.take().is_some()
    }
}
