//! ringq - Bounded Single-Consumer Async Message Queue
//!
//! A typed, bounded message queue for async pipelines where any number of
//! producers feed exactly one consumer. Producers never suspend: when the
//! buffer is full the configured [`BackpressureStrategy`] decides what happens
//! to the message. The consumer pulls a lazy sequence that suspends only when
//! nothing is buffered.
//!
//! # Key Features
//!
//! - Fixed-capacity ring buffers with O(1) push/pop and no silent overwrite
//! - Explicit overflow policy: drop oldest, drop newest, generation swap, or error
//! - Direct handoff to a parked consumer, bypassing the buffer
//! - Closed lifecycle state machine (`complete` stops or drains, `abort` discards)
//! - Built-in counters and running average latency
//!
//! # Example
//!
//! ```
//! use ringq::{AsyncMessageQueue, BackpressureStrategy, QueueConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = QueueConfig::new(3)
//!     .with_backpressure(BackpressureStrategy::DropOldest)
//!     .with_metrics(true);
//! let queue = AsyncMessageQueue::<u32>::new(config)?;
//!
//! for i in 1..=6 {
//!     queue.enqueue(i);
//! }
//! assert_eq!(queue.metrics().dropped, 3);
//!
//! let mut received = Vec::new();
//! while !queue.is_empty() {
//!     if let Some(item) = queue.recv().await? {
//!         received.push(item);
//!     }
//! }
//! assert_eq!(received, vec![4, 5, 6]);
//!
//! // The sequence ends at the next pull after `complete()`
//! queue.enqueue(7);
//! queue.complete();
//! assert_eq!(queue.recv().await?, None);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handoff;
mod invariants;
mod lifecycle;
mod metrics;
mod queue;
mod ring;
mod stream;

pub use config::{BackpressureStrategy, CompletePolicy, HandoffPolicy, QueueConfig};
pub use error::{ConfigError, QueueError};
pub use lifecycle::{LifecycleState, QueueStatus};
pub use metrics::{Metrics, MetricsSnapshot};
pub use queue::{AsyncMessageQueue, ErrorHook, MessageValidator, QueueBuilder};
pub use ring::RingBuffer;
pub use stream::{QueueSink, QueueStream};

// Re-export useful stream combinators
pub use tokio_stream::StreamExt;
