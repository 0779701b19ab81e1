//! The bounded single-consumer queue.

use crate::config::{BackpressureStrategy, CompletePolicy, HandoffPolicy, QueueConfig};
use crate::error::{ConfigError, QueueError};
use crate::handoff::HandoffSlot;
use crate::lifecycle::{LifecycleState, QueueStatus};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::ring::RingBuffer;
use crate::stream::{QueueSink, QueueStream};
use parking_lot::Mutex;
use std::error::Error as StdError;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Callback invoked with every error reported through the error path.
pub type ErrorHook = Arc<dyn Fn(&QueueError) + Send + Sync>;

/// Predicate deciding whether a message may be enqueued.
pub type MessageValidator<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

// =============================================================================
// SYNCHRONIZATION STRATEGY
// =============================================================================
//
// One `parking_lot::Mutex` guards both ring buffers, the lifecycle, the
// metrics and the handoff slot. Every operation does its read-modify-write
// inside a single critical section and never awaits while holding it.
//
// Side effects that run user code or wake tasks (`on_error`, `notify_one`)
// are collected in `Deferred` and executed after the lock is released, so a
// hook may call back into the queue.
//
// The consumer parks by setting `HandoffSlot::parked` in the same critical
// section that found the buffers empty. Its `Notified` future is enabled
// before that critical section, so any producer that observes `parked` and
// calls `notify_one()` afterwards is guaranteed to wake it.
//
// =============================================================================

/// Bounded, typed, single-consumer async message queue.
///
/// Cloning is cheap and yields another handle to the same queue; producers
/// typically each hold a clone. Exactly one task may pull at a time.
///
/// # Ordering
///
/// Messages are FIFO within each ring buffer. Under `Block`, a message can be
/// pushed into the primary generation while older ones wait in the secondary,
/// and with [`HandoffPolicy::Unsignaled`] a message parked in the handoff slot
/// is observed after the buffers drain. Neither path guarantees global FIFO.
pub struct AsyncMessageQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for AsyncMessageQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<T> {
    state: Mutex<State<T>>,
    /// Wakes the parked consumer. Only one consumer, so `notify_one` suffices
    /// and a stored permit covers a signal raised before the consumer awaits.
    ready: Notify,
    config: QueueConfig,
    on_error: Option<ErrorHook>,
    validator: Option<MessageValidator<T>>,
}

struct State<T> {
    /// Two generations; `rings[primary]` is the primary buffer.
    rings: [RingBuffer<T>; 2],
    primary: usize,
    lifecycle: LifecycleState,
    metrics: Metrics,
    handoff: HandoffSlot<T>,
}

/// Work to perform once the lock is released.
#[derive(Default)]
struct Deferred {
    wake: bool,
    hook_error: Option<QueueError>,
}

/// Result of one locked attempt to pull.
enum Pull<T> {
    Ready(Result<Option<T>, QueueError>),
    Pending,
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

/// Builder for queues with injected validator and error hook.
pub struct QueueBuilder<T> {
    config: QueueConfig,
    on_error: Option<ErrorHook>,
    validator: Option<MessageValidator<T>>,
}

impl<T> QueueBuilder<T> {
    /// Starts a builder from `config`.
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            on_error: None,
            validator: None,
        }
    }

    /// Sets the callback for reported errors.
    ///
    /// With a hook installed, rejected and overflowing enqueues are non-fatal.
    /// Without one, they move the queue to the terminal `Error` state.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&QueueError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    /// Sets the predicate every message must satisfy to be enqueued.
    ///
    /// Called inside the queue's critical section, and only while the queue
    /// accepts messages. It must not call back into the queue.
    pub fn validate_message<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Builds the queue in the `Running` state.
    pub fn build(self) -> Result<AsyncMessageQueue<T>, ConfigError> {
        self.config.validate()?;

        let rings = [
            RingBuffer::new(self.config.buffer_size)?,
            RingBuffer::new(self.config.buffer_size)?,
        ];

        debug!(
            target: "ringq",
            buffer_size = self.config.buffer_size,
            backpressure = ?self.config.backpressure,
            handoff = ?self.config.handoff,
            completion = ?self.config.completion,
            timeout = ?self.config.timeout,
            "queue created"
        );

        Ok(AsyncMessageQueue {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    rings,
                    primary: 0,
                    lifecycle: LifecycleState::new(QueueStatus::Running),
                    metrics: Metrics::new(),
                    handoff: HandoffSlot::new(),
                }),
                ready: Notify::new(),
                config: self.config,
                on_error: self.on_error,
                validator: self.validator,
            }),
        })
    }
}

impl<T> AsyncMessageQueue<T> {
    /// Creates a queue with no validator and no error hook.
    pub fn new(config: QueueConfig) -> Result<Self, ConfigError> {
        QueueBuilder::new(config).build()
    }

    /// Creates a default-configured queue with `buffer_size` slots per generation.
    pub fn with_capacity(buffer_size: usize) -> Result<Self, ConfigError> {
        Self::new(QueueConfig::new(buffer_size))
    }

    /// Returns a builder for injecting a validator and an error hook.
    pub fn builder(config: QueueConfig) -> QueueBuilder<T> {
        QueueBuilder::new(config)
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Offers a message to the queue. Never suspends.
    ///
    /// Returns `true` if the message was handed to the consumer or buffered,
    /// `false` if it was rejected or discarded by backpressure.
    #[inline]
    pub fn enqueue(&self, message: T) -> bool {
        self.try_enqueue(message).is_ok()
    }

    /// Offers a message to the queue, returning why it was not accepted.
    ///
    /// `Err(QueueError::Dropped)` under `DropNewest` is a policy outcome and is
    /// not reported to the error hook; every other error is.
    pub fn try_enqueue(&self, message: T) -> Result<(), QueueError> {
        let shared = &*self.shared;
        let mut deferred = Deferred::default();
        let result = {
            let mut state = shared.state.lock();
            shared.admit(&mut state, message, &mut deferred)
        };
        shared.finish(deferred);
        result
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Pulls the next message of the lazy sequence.
    ///
    /// - `Ok(Some(msg))`: the next message.
    /// - `Ok(None)`: the sequence has ended.
    /// - `Err(QueueError::Timeout(_))`: no message within the configured
    ///   timeout. The queue stays usable; pull again.
    /// - `Err(_)` otherwise: the queue failed; the sequence is over.
    ///
    /// Suspends only while nothing is buffered and the queue is not
    /// terminated. Cancel-safe: dropping the future unparks the consumer and
    /// releases the timer without losing a delivered message.
    ///
    /// Only one pull may be in flight at a time.
    pub async fn recv(&self) -> Result<Option<T>, QueueError> {
        let shared = &*self.shared;
        let started = Instant::now();
        let deadline = shared
            .config
            .effective_timeout()
            .map(|timeout| (started + timeout, timeout));
        let mut parked: Option<ParkGuard<'_, T>> = None;

        loop {
            let notified = shared.ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let mut deferred = Deferred::default();
            let pulled = {
                let mut state = shared.state.lock();
                shared.pull(&mut state, started.elapsed(), parked.is_some(), &mut deferred)
            };
            shared.finish(deferred);

            match pulled {
                Pull::Ready(result) => return result,
                Pull::Pending => {
                    if parked.is_none() {
                        parked = Some(ParkGuard { shared });
                    }
                }
            }

            match deadline {
                Some((deadline, timeout)) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        drop(parked.take());
                        return Err(shared.timed_out(timeout));
                    }
                }
                None => notified.await,
            }
        }
    }

    /// Returns the lazy sequence as a `Stream`.
    pub fn stream(&self) -> QueueStream<T>
    where
        T: Send + 'static,
    {
        QueueStream::new(self.clone())
    }

    /// Returns a `Sink` that enqueues every item it is sent.
    pub fn sink(&self) -> QueueSink<T> {
        QueueSink::new(self.clone())
    }

    // ---------------------------------------------------------------------
    // CONTROL API
    // ---------------------------------------------------------------------

    /// Stops accepting messages. Idempotent; only acts on a `Running` queue.
    ///
    /// Under [`CompletePolicy::Stop`] the consumer sequence ends at its next
    /// pull, even if messages are still buffered. Under
    /// [`CompletePolicy::Drain`] buffered messages are delivered first. A
    /// parked consumer is woken and observes the end.
    pub fn complete(&self) {
        let shared = &*self.shared;
        let wake = {
            let mut state = shared.state.lock();
            if state.lifecycle.status() != QueueStatus::Running {
                return;
            }
            state.lifecycle.set_status(QueueStatus::Completed);

            info!(target: "ringq", remaining = state.buffered_len(), "queue completed");

            let drains = shared.config.completion == CompletePolicy::Drain
                && (state.buffered_len() > 0 || state.handoff.is_signaled());
            if !drains && state.handoff.is_parked() {
                state.handoff.signal();
                true
            } else {
                false
            }
        };

        if wake {
            shared.ready.notify_one();
        }
    }

    /// Terminates the queue as `Completed`, discarding everything buffered.
    pub fn abort(&self) {
        self.shared.abort(None);
    }

    /// Terminates the queue as `Error`, discarding everything buffered.
    ///
    /// The error is delivered once to the consumer as [`QueueError::Aborted`].
    pub fn abort_with_error<E>(&self, error: E)
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        self.shared.abort(Some(QueueError::aborted(error)));
    }

    // ---------------------------------------------------------------------
    // INTROSPECTION
    // ---------------------------------------------------------------------

    /// Returns the lifecycle status.
    pub fn status(&self) -> QueueStatus {
        self.shared.state.lock().lifecycle.status()
    }

    /// Returns the error that put the queue in the `Error` state, if any.
    pub fn last_error(&self) -> Option<QueueError> {
        self.shared.state.lock().lifecycle.error().cloned()
    }

    /// Returns the number of buffered messages across both generations.
    ///
    /// A message waiting in the handoff slot is not counted.
    pub fn size(&self) -> usize {
        self.shared.state.lock().buffered_len()
    }

    /// Returns `true` if no message is buffered.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the capacity of each generation.
    pub fn capacity(&self) -> usize {
        self.shared.config.buffer_size
    }

    /// Returns the configuration the queue was built with.
    pub fn config(&self) -> &QueueConfig {
        &self.shared.config
    }

    /// Returns `true` while a consumer pull is suspended awaiting data.
    pub fn has_parked_consumer(&self) -> bool {
        self.shared.state.lock().handoff.is_parked()
    }

    /// Returns a point-in-time copy of the metrics.
    ///
    /// With metrics disabled only `current_size` is populated.
    pub fn metrics(&self) -> MetricsSnapshot {
        let state = self.shared.state.lock();
        let current_size = state.buffered_len();
        if self.shared.config.enable_metrics {
            state.metrics.snapshot(current_size)
        } else {
            MetricsSnapshot {
                current_size,
                ..MetricsSnapshot::default()
            }
        }
    }

    /// Copies the buffered messages in consumption order
    /// (primary generation, then secondary).
    pub fn buffered(&self) -> Vec<T>
    where
        T: Clone,
    {
        let state = self.shared.state.lock();
        state.primary().iter().chain(state.secondary().iter()).cloned().collect()
    }
}

impl<T> std::fmt::Debug for AsyncMessageQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("AsyncMessageQueue")
            .field("status", &state.lifecycle.status())
            .field("size", &state.buffered_len())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CRITICAL SECTIONS
// =============================================================================

impl<T> Shared<T> {
    /// Enqueue logic; runs under the lock.
    fn admit(
        &self,
        state: &mut State<T>,
        message: T,
        deferred: &mut Deferred,
    ) -> Result<(), QueueError> {
        let status = state.lifecycle.status();
        if !status.accepts_messages() {
            let err = QueueError::Rejected { status };
            self.report(state, err.clone(), deferred);
            return Err(err);
        }

        if !self.validator.as_ref().map_or(true, |validate| validate(&message)) {
            let err = QueueError::ValidationFailed;
            self.report(state, err.clone(), deferred);
            return Err(err);
        }

        if self.should_hand_off(&state.handoff) {
            state.handoff.deliver(message);
            if self.config.enable_metrics {
                state.metrics.add_handoff();
            }
            deferred.wake = true;
            trace!(target: "ringq", parked = state.handoff.is_parked(), "message handed off");
            return Ok(());
        }

        let message = match state.primary_mut().try_push(message) {
            Ok(()) => {
                self.record_enqueue(state);
                return Ok(());
            }
            Err(message) => message,
        };

        self.apply_backpressure(state, message, deferred)
    }

    fn should_hand_off(&self, slot: &HandoffSlot<T>) -> bool {
        match self.config.handoff {
            HandoffPolicy::ParkedConsumer => slot.is_parked() && !slot.is_signaled(),
            HandoffPolicy::Unsignaled => !slot.is_signaled(),
        }
    }

    /// Primary is full; apply the configured strategy.
    fn apply_backpressure(
        &self,
        state: &mut State<T>,
        message: T,
        deferred: &mut Deferred,
    ) -> Result<(), QueueError> {
        let capacity = self.config.buffer_size;
        let metrics = self.config.enable_metrics;

        match self.config.backpressure {
            BackpressureStrategy::DropOldest => {
                let primary = state.primary_mut();
                drop(primary.pop());
                primary
                    .try_push(message)
                    .map_err(|_| QueueError::QueueFull { capacity })?;
                if metrics {
                    state.metrics.add_dropped(1);
                }
                debug!(target: "ringq", capacity, "buffer full, evicted oldest message");
                self.record_enqueue(state);
                Ok(())
            }
            BackpressureStrategy::DropNewest => {
                if metrics {
                    state.metrics.add_dropped(1);
                }
                debug!(target: "ringq", capacity, "buffer full, dropped newest message");
                Err(QueueError::Dropped)
            }
            BackpressureStrategy::Block => {
                if let Err(message) = state.secondary_mut().try_push(message) {
                    let discarded = state.rotate();
                    if metrics {
                        state.metrics.add_rotated_out(discarded as u64);
                    }
                    debug!(
                        target: "ringq",
                        capacity,
                        discarded,
                        "both generations full, rotated buffers"
                    );
                    state
                        .secondary_mut()
                        .try_push(message)
                        .map_err(|_| QueueError::QueueFull { capacity })?;
                }
                self.record_enqueue(state);
                Ok(())
            }
            BackpressureStrategy::ThrowError => {
                let err = QueueError::QueueFull { capacity };
                self.report(state, err.clone(), deferred);
                Err(err)
            }
        }
    }

    fn record_enqueue(&self, state: &mut State<T>) {
        if self.config.enable_metrics {
            let size = state.buffered_len();
            state.metrics.add_enqueued();
            state.metrics.observe_size(size);
        }
        trace!(target: "ringq", size = state.buffered_len(), "message buffered");
    }

    /// One pull attempt; runs under the lock. Parks the consumer when nothing
    /// is available.
    fn pull(
        &self,
        state: &mut State<T>,
        waited: Duration,
        already_parked: bool,
        deferred: &mut Deferred,
    ) -> Pull<T> {
        if let Some(err) = state.handoff.take_error() {
            return Pull::Ready(Err(err));
        }

        // Error already delivered; nothing more to yield.
        if state.lifecycle.status() == QueueStatus::Error {
            return Pull::Ready(Ok(None));
        }

        if state.lifecycle.is_terminated() && self.config.completion == CompletePolicy::Stop {
            state.handoff.acknowledge();
            return Pull::Ready(Ok(None));
        }

        let slot_first = self.config.handoff == HandoffPolicy::ParkedConsumer;
        if let Some(message) = state.take_next(slot_first, self.config.enable_metrics, waited) {
            trace!(target: "ringq", waited = ?waited, "message dequeued");
            return Pull::Ready(Ok(Some(message)));
        }

        if state.lifecycle.is_terminated() {
            state.handoff.acknowledge();
            return Pull::Ready(Ok(None));
        }

        if state.handoff.is_woken() {
            state.handoff.acknowledge();
            let err = QueueError::InvariantViolation("handoff slot signaled without a value");
            self.escalate(state, err.clone(), deferred);
            return Pull::Ready(Err(err));
        }

        if !already_parked {
            state.handoff.park();
        }
        Pull::Pending
    }

    fn timed_out(&self, timeout: Duration) -> QueueError {
        let err = QueueError::Timeout(timeout);
        let mut deferred = Deferred::default();
        {
            let mut state = self.state.lock();
            if self.config.enable_metrics {
                state.metrics.add_error();
            }
            if self.on_error.is_some() {
                deferred.hook_error = Some(err.clone());
            }
        }
        warn!(target: "ringq", timeout = ?timeout, "consumer pull timed out");
        self.finish(deferred);
        err
    }

    fn abort(&self, error: Option<QueueError>) {
        {
            let mut state = self.state.lock();
            let transitioned = match error {
                Some(err) => {
                    let stored = state.lifecycle.set_error(err.clone());
                    if stored {
                        state.handoff.fail(err);
                    }
                    stored
                }
                None => state.lifecycle.set_status(QueueStatus::Completed),
            };

            let mut discarded = state.rings[0].clear() + state.rings[1].clear();
            if state.handoff.discard_value() {
                discarded += 1;
            }
            state.handoff.signal();

            info!(
                target: "ringq",
                status = %state.lifecycle.status(),
                transitioned,
                discarded,
                "queue aborted"
            );
        }
        self.ready.notify_one();
    }

    /// Error path for producer-side failures.
    ///
    /// With a hook the error is non-fatal. Without one the queue moves to
    /// `Error` and the error becomes pending for the consumer.
    fn report(&self, state: &mut State<T>, err: QueueError, deferred: &mut Deferred) {
        if self.config.enable_metrics {
            state.metrics.add_error();
        }

        if self.on_error.is_some() {
            deferred.hook_error = Some(err);
        } else if state.lifecycle.set_error(err.clone()) {
            warn!(target: "ringq", error = %err, "no error hook installed, queue failed");
            state.handoff.fail(err);
            deferred.wake = true;
        }
    }

    /// Error path for consumer-side failures that are returned directly.
    fn escalate(&self, state: &mut State<T>, err: QueueError, deferred: &mut Deferred) {
        if self.config.enable_metrics {
            state.metrics.add_error();
        }
        warn!(target: "ringq", error = %err, "consumer observed an inconsistent handoff slot");

        if self.on_error.is_some() {
            deferred.hook_error = Some(err);
        } else {
            state.lifecycle.set_error(err);
        }
    }

    /// Runs deferred side effects outside the lock.
    fn finish(&self, deferred: Deferred) {
        if deferred.wake {
            self.ready.notify_one();
        }

        if let (Some(err), Some(hook)) = (deferred.hook_error, self.on_error.as_ref()) {
            if catch_unwind(AssertUnwindSafe(|| hook(&err))).is_err() {
                warn!(target: "ringq", error = %err, "error hook panicked");
            }
        }
    }
}

impl<T> State<T> {
    #[inline]
    fn primary(&self) -> &RingBuffer<T> {
        &self.rings[self.primary]
    }

    #[inline]
    fn secondary(&self) -> &RingBuffer<T> {
        &self.rings[self.primary ^ 1]
    }

    #[inline]
    fn primary_mut(&mut self) -> &mut RingBuffer<T> {
        &mut self.rings[self.primary]
    }

    #[inline]
    fn secondary_mut(&mut self) -> &mut RingBuffer<T> {
        &mut self.rings[self.primary ^ 1]
    }

    #[inline]
    fn buffered_len(&self) -> usize {
        self.rings[0].len() + self.rings[1].len()
    }

    /// Swaps the generations and clears the new secondary.
    ///
    /// Returns the number of messages discarded by the clear.
    fn rotate(&mut self) -> usize {
        self.primary ^= 1;
        self.secondary_mut().clear()
    }

    /// Pops from the primary, surfacing the secondary generation once the
    /// primary runs dry.
    fn pop_buffered(&mut self) -> Option<T> {
        if let Some(message) = self.primary_mut().pop() {
            return Some(message);
        }
        if self.secondary().is_empty() {
            return None;
        }
        self.rotate();
        self.primary_mut().pop()
    }

    /// Takes the next message from the handoff slot or the buffers and
    /// updates the dequeue metrics.
    fn take_next(&mut self, slot_first: bool, metrics: bool, waited: Duration) -> Option<T> {
        let take_slot = |state: &mut Self| {
            let message = state.handoff.take_value()?;
            if metrics {
                state.metrics.add_wait(waited);
            }
            Some(message)
        };
        let take_buffer = |state: &mut Self| {
            let message = state.pop_buffered()?;
            if metrics {
                state.metrics.add_dequeued(waited);
            }
            Some(message)
        };

        if slot_first {
            take_slot(self).or_else(|| take_buffer(self))
        } else {
            take_buffer(self).or_else(|| take_slot(self))
        }
    }
}

/// Clears `parked` when a pull returns or its future is dropped.
struct ParkGuard<'a, T> {
    shared: &'a Shared<T>,
}

impl<T> Drop for ParkGuard<'_, T> {
    fn drop(&mut self) {
        self.shared.state.lock().handoff.unpark();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(config: QueueConfig) -> AsyncMessageQueue<u32> {
        AsyncMessageQueue::new(config).unwrap()
    }

    #[test]
    fn test_rotate_discards_old_primary() {
        let q = queue(QueueConfig::lossless(2).with_metrics(true));
        for i in 1..=4 {
            assert!(q.enqueue(i));
        }
        // primary [1, 2], secondary [3, 4]
        assert_eq!(q.buffered(), vec![1, 2, 3, 4]);

        // Both full: rotate, clear [1, 2], push 5 into the fresh secondary
        assert!(q.enqueue(5));
        assert_eq!(q.buffered(), vec![3, 4, 5]);
        let metrics = q.metrics();
        assert_eq!(metrics.rotated_out, 2);
        assert_eq!(metrics.dropped, 0);
        assert_eq!(metrics.max_size, 4);
    }

    #[test]
    fn test_pop_surfaces_secondary() {
        let q = queue(QueueConfig::lossless(1));
        q.enqueue(1);
        q.enqueue(2);

        let mut state = q.shared.state.lock();
        assert_eq!(state.pop_buffered(), Some(1));
        assert_eq!(state.pop_buffered(), Some(2));
        assert_eq!(state.pop_buffered(), None);
    }

    #[test]
    fn test_unsignaled_policy_fills_slot_without_consumer() {
        let q = queue(
            QueueConfig::new(3)
                .with_handoff(HandoffPolicy::Unsignaled)
                .with_metrics(true),
        );
        q.enqueue(1);
        q.enqueue(2);

        // First message went to the slot, not the buffer
        assert_eq!(q.buffered(), vec![2]);
        assert!(q.shared.state.lock().handoff.has_value());
        assert_eq!(q.metrics().handed_off, 1);
    }

    #[test]
    fn test_validator_runs_before_buffering() {
        let q = AsyncMessageQueue::<u32>::builder(QueueConfig::new(4))
            .validate_message(|m| *m % 2 == 0)
            .on_error(|_| {})
            .build()
            .unwrap();

        assert!(q.enqueue(2));
        assert!(matches!(
            q.try_enqueue(3),
            Err(QueueError::ValidationFailed)
        ));
        assert_eq!(q.buffered(), vec![2]);
        assert_eq!(q.status(), QueueStatus::Running);
    }

    #[test]
    fn test_validator_skipped_once_terminated() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let q = AsyncMessageQueue::<u32>::builder(QueueConfig::new(4))
            .validate_message(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
            .on_error(|_| {})
            .build()
            .unwrap();

        assert!(q.enqueue(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        q.complete();
        assert!(matches!(
            q.try_enqueue(2),
            Err(QueueError::Rejected {
                status: QueueStatus::Completed
            })
        ));
        // Rejected on status before the validator is consulted
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hook_panic_is_contained() {
        let q = AsyncMessageQueue::<u32>::builder(QueueConfig::strict(1))
            .on_error(|_| panic!("hook failure"))
            .build()
            .unwrap();

        assert!(q.enqueue(1));
        assert!(!q.enqueue(2));
        // Queue is still usable after the hook panicked
        assert_eq!(q.status(), QueueStatus::Running);
        assert_eq!(q.metrics().errors, 1);
    }
}
