//! Error types for queue operations.

use crate::lifecycle::QueueStatus;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when constructing a ring or queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Buffer capacity must be at least one slot.
    #[error("buffer capacity must be greater than zero")]
    ZeroCapacity,
}

/// Errors produced by producers, the consumer sequence, or `abort`.
///
/// Cheap to clone: the same error is stored as the queue's last error,
/// delivered to the consumer and passed to the `on_error` hook.
#[derive(Debug, Clone, Error)]
pub enum QueueError {
    /// The queue is in a state that does not accept messages.
    #[error("cannot enqueue message: queue is {status}")]
    Rejected {
        /// Lifecycle status at the time of the attempt.
        status: QueueStatus,
    },

    /// The configured validator rejected the message.
    #[error("message failed validation")]
    ValidationFailed,

    /// The buffer is full under the `ThrowError` strategy.
    #[error("queue is full (capacity: {capacity})")]
    QueueFull {
        /// Capacity of the primary buffer.
        capacity: usize,
    },

    /// The message was discarded under the `DropNewest` strategy.
    #[error("message dropped by backpressure")]
    Dropped,

    /// A consumer pull waited longer than the configured timeout.
    #[error("timed out after {0:?} waiting for a message")]
    Timeout(Duration),

    /// The queue was aborted with this error.
    #[error("queue aborted: {0}")]
    Aborted(#[source] Arc<dyn StdError + Send + Sync + 'static>),

    /// The handoff slot was signaled without a value, error or termination.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(&'static str),
}

impl QueueError {
    /// Wraps an arbitrary error as an abort reason.
    pub fn aborted<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self::Aborted(Arc::from(error.into()))
    }

    /// Returns `true` for errors that reject an incoming message
    /// (terminal state or failed validation).
    #[inline]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::ValidationFailed)
    }

    /// Returns `true` if the queue remains usable after this error.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Dropped | Self::QueueFull { .. } | Self::ValidationFailed
        )
    }

    /// Returns `true` if this error ends the consumer sequence.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let timeout = QueueError::Timeout(Duration::from_millis(5));
        assert!(timeout.is_recoverable());
        assert!(!timeout.is_terminal());

        let rejected = QueueError::Rejected {
            status: QueueStatus::Completed,
        };
        assert!(rejected.is_rejection());
        assert!(!rejected.is_recoverable());
        assert!(rejected.is_terminal());

        let aborted = QueueError::aborted("upstream closed");
        assert!(!aborted.is_recoverable());
        assert!(aborted.is_terminal());
        assert_eq!(aborted.to_string(), "queue aborted: upstream closed");
    }

    #[test]
    fn test_aborted_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "socket gone");
        let err = QueueError::aborted(io);
        let source = err.source().expect("aborted error has a source");
        assert_eq!(source.to_string(), "socket gone");
    }
}
