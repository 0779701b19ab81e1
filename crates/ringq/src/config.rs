//! Configuration for queue behavior.

use crate::error::ConfigError;
use std::time::Duration;

/// Policy applied when the primary buffer is full at enqueue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BackpressureStrategy {
    /// Evict the oldest buffered message and accept the new one.
    #[default]
    DropOldest,
    /// Discard the new message.
    DropNewest,
    /// Spill into the secondary generation, rotating generations when both
    /// are full. Never suspends the producer.
    Block,
    /// Report [`QueueError::QueueFull`](crate::QueueError::QueueFull) and
    /// discard the new message.
    ThrowError,
}

/// When `enqueue` delivers straight into the handoff slot instead of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum HandoffPolicy {
    /// Only when a consumer is parked in a pull and the slot is vacant.
    #[default]
    ParkedConsumer,
    /// Whenever the slot is not signaled, whether or not a consumer is parked.
    ///
    /// With no consumer parked the message waits in the slot and is only seen
    /// after the buffers have been drained, so it can be observed out of order.
    Unsignaled,
}

/// What the consumer sequence does once `complete()` has been called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CompletePolicy {
    /// End the sequence at once. Messages still buffered are not delivered.
    #[default]
    Stop,
    /// Keep delivering buffered messages; end once both generations and the
    /// handoff slot are empty.
    Drain,
}

/// Configuration for an [`AsyncMessageQueue`](crate::AsyncMessageQueue).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QueueConfig {
    /// Capacity of each of the two ring buffers.
    ///
    /// Default: 1000
    pub buffer_size: usize,

    /// Overflow policy.
    ///
    /// Default: `DropOldest`
    pub backpressure: BackpressureStrategy,

    /// Collect counters and latency.
    ///
    /// Default: false
    pub enable_metrics: bool,

    /// Maximum time a single consumer pull waits for a message.
    /// `None` waits indefinitely.
    ///
    /// Default: None
    pub timeout: Option<Duration>,

    /// Fast-path condition for direct delivery.
    ///
    /// Default: `ParkedConsumer`
    pub handoff: HandoffPolicy,

    /// Consumer behavior after `complete()`.
    ///
    /// Default: `Stop`
    pub completion: CompletePolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            backpressure: BackpressureStrategy::DropOldest,
            enable_metrics: false,
            timeout: None,
            handoff: HandoffPolicy::ParkedConsumer,
            completion: CompletePolicy::Stop,
        }
    }
}

impl QueueConfig {
    /// Creates a default configuration with the given buffer size.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            ..Self::default()
        }
    }

    /// Keeps only the most recent `buffer_size` messages.
    pub fn latest(buffer_size: usize) -> Self {
        Self::new(buffer_size).with_backpressure(BackpressureStrategy::DropOldest)
    }

    /// Extends capacity through generation rotation instead of dropping on
    /// the first overflow.
    pub fn lossless(buffer_size: usize) -> Self {
        Self::new(buffer_size).with_backpressure(BackpressureStrategy::Block)
    }

    /// Reports every overflow as an error, with metrics enabled.
    pub fn strict(buffer_size: usize) -> Self {
        Self::new(buffer_size)
            .with_backpressure(BackpressureStrategy::ThrowError)
            .with_metrics(true)
    }

    /// Sets the buffer size.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Sets the backpressure strategy.
    pub fn with_backpressure(mut self, strategy: BackpressureStrategy) -> Self {
        self.backpressure = strategy;
        self
    }

    /// Enables or disables metrics.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.enable_metrics = enabled;
        self
    }

    /// Sets the per-pull timeout. `Duration::ZERO` disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Sets the handoff policy.
    pub fn with_handoff(mut self, policy: HandoffPolicy) -> Self {
        self.handoff = policy;
        self
    }

    /// Sets the completion policy.
    pub fn with_completion(mut self, policy: CompletePolicy) -> Self {
        self.completion = policy;
        self
    }

    /// Checks that the configuration can build a queue.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    /// Timeout with a zero duration normalized to `None`.
    pub(crate) fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QueueConfig::default();
        assert_eq!(config.buffer_size, 1000);
        assert_eq!(config.backpressure, BackpressureStrategy::DropOldest);
        assert!(!config.enable_metrics);
        assert_eq!(config.timeout, None);
        assert_eq!(config.handoff, HandoffPolicy::ParkedConsumer);
        assert_eq!(config.completion, CompletePolicy::Stop);
    }

    #[test]
    fn test_presets() {
        assert_eq!(
            QueueConfig::lossless(8).backpressure,
            BackpressureStrategy::Block
        );
        let strict = QueueConfig::strict(4);
        assert_eq!(strict.backpressure, BackpressureStrategy::ThrowError);
        assert!(strict.enable_metrics);
        assert_eq!(strict.buffer_size, 4);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = QueueConfig::new(4).with_timeout(Duration::ZERO);
        assert_eq!(config.timeout, None);

        let config = QueueConfig::new(4).with_timeout(Duration::from_millis(50));
        assert_eq!(config.effective_timeout(), Some(Duration::from_millis(50)));

        // Set directly, zero is still treated as no timeout
        let config = QueueConfig {
            timeout: Some(Duration::ZERO),
            ..QueueConfig::default()
        };
        assert_eq!(config.effective_timeout(), None);
    }

    #[test]
    fn test_validate() {
        assert!(QueueConfig::new(1).validate().is_ok());
        assert_eq!(QueueConfig::new(0).validate(), Err(ConfigError::ZeroCapacity));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json() {
        let config: QueueConfig = serde_json::from_str(
            r#"{ "buffer_size": 16, "backpressure": "throw-error", "enable_metrics": true, "completion": "drain" }"#,
        )
        .unwrap();
        assert_eq!(config.buffer_size, 16);
        assert_eq!(config.backpressure, BackpressureStrategy::ThrowError);
        assert!(config.enable_metrics);
        assert_eq!(config.handoff, HandoffPolicy::ParkedConsumer);
        assert_eq!(config.completion, CompletePolicy::Drain);
    }
}
