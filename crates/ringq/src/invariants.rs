//! Debug assertion macros for ring buffer and queue invariants.
//!
//! These macros are only active in debug builds (`debug_assert!`), so there is
//! zero overhead in release builds.

// =============================================================================
// Ring buffer: Bounded Count
// =============================================================================

/// Assert that the occupied count never exceeds capacity.
///
/// **Invariant**: `0 ≤ len ≤ capacity`
///
/// Used in: `RingBuffer::push()` after advancing tail
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "bounded count violated: len {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

// =============================================================================
// Ring buffer: Index Consistency
// =============================================================================

/// Assert that `tail == (head + len) mod capacity`.
///
/// Used in: `RingBuffer::push()` and `RingBuffer::pop()`
macro_rules! debug_assert_indices_consistent {
    ($head:expr, $tail:expr, $len:expr, $capacity:expr) => {
        debug_assert!(
            ($head + $len) % $capacity == $tail,
            "index consistency violated: head {} + len {} != tail {} (mod {})",
            $head,
            $len,
            $tail,
            $capacity
        )
    };
}

// =============================================================================
// Lifecycle: Terminal States Are Final
// =============================================================================

/// Assert that a terminal lifecycle was not left.
///
/// **Invariant**: `was_terminal → is_terminal`
///
/// Used in: `LifecycleState::set_status()` and `LifecycleState::set_error()`
macro_rules! debug_assert_terminal_final {
    ($was_terminal:expr, $is_terminal:expr) => {
        debug_assert!(
            !$was_terminal || $is_terminal,
            "terminal lifecycle left after a transition"
        )
    };
}

// =============================================================================
// Metrics: Monotonic Counters
// =============================================================================

/// Assert that a counter only increases.
///
/// Used in: `Metrics::observe_size()` for the high-water mark
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "monotonic counter violated: {} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// Handoff: Single Parked Consumer
// =============================================================================

/// Assert that a second consumer did not park while one is already parked.
///
/// **Invariant**: at most one pull is suspended on the handoff slot
///
/// Used in: `HandoffSlot::park()`
macro_rules! debug_assert_single_consumer {
    ($already_parked:expr) => {
        debug_assert!(
            !$already_parked,
            "single consumer violated: a second pull parked on the handoff slot"
        )
    };
}

/// Assert that a hand-off never overwrites a pending value.
///
/// Used in: `HandoffSlot::deliver()`
macro_rules! debug_assert_slot_vacant {
    ($occupied:expr) => {
        debug_assert!(
            !$occupied,
            "handoff slot overwritten while a delivered value was pending"
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_indices_consistent;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_single_consumer;
pub(crate) use debug_assert_slot_vacant;
pub(crate) use debug_assert_terminal_final;
