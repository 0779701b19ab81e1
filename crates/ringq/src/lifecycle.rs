//! Queue lifecycle state machine.

use crate::error::QueueError;
use crate::invariants::debug_assert_terminal_final;
use std::fmt;

/// Lifecycle status of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QueueStatus {
    /// Constructed but not yet running. Accepts messages.
    Initialized,
    /// Normal operation. Accepts messages.
    Running,
    /// Reserved. No transition into or out of this state is defined; it
    /// neither accepts messages nor counts as terminated.
    Paused,
    /// Terminal: finished normally via `complete()` or `abort()`.
    Completed,
    /// Terminal: failed with an error.
    Error,
}

impl QueueStatus {
    /// Returns `true` for `Completed` and `Error`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Returns `true` for `Initialized` and `Running`.
    #[inline]
    pub fn accepts_messages(self) -> bool {
        matches!(self, Self::Initialized | Self::Running)
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Current status plus the last error, if any.
///
/// Once the state is terminal every further transition is refused.
#[derive(Debug, Clone)]
pub struct LifecycleState {
    status: QueueStatus,
    error: Option<QueueError>,
}

impl LifecycleState {
    /// Creates a state machine starting at `status`.
    pub fn new(status: QueueStatus) -> Self {
        Self {
            status,
            error: None,
        }
    }

    /// Returns the current status.
    #[inline]
    pub fn status(&self) -> QueueStatus {
        self.status
    }

    /// Returns the stored error, if the state is `Error`.
    #[inline]
    pub fn error(&self) -> Option<&QueueError> {
        self.error.as_ref()
    }

    /// Moves to `status`, clearing any stored error unless `status` is `Error`.
    ///
    /// Returns `false` (and changes nothing) if the state is already terminal.
    pub fn set_status(&mut self, status: QueueStatus) -> bool {
        let was_terminal = self.is_terminated();
        if was_terminal {
            return false;
        }

        self.status = status;
        if status != QueueStatus::Error {
            self.error = None;
        }

        debug_assert_terminal_final!(was_terminal, self.is_terminated());
        true
    }

    /// Forces the state to `Error` and stores `error`.
    ///
    /// Returns `false` (and changes nothing) if the state is already terminal.
    pub fn set_error(&mut self, error: QueueError) -> bool {
        let was_terminal = self.is_terminated();
        if was_terminal {
            return false;
        }

        self.status = QueueStatus::Error;
        self.error = Some(error);

        debug_assert_terminal_final!(was_terminal, self.is_terminated());
        true
    }

    /// Returns `true` while the status is `Initialized` or `Running`.
    #[inline]
    pub fn can_accept_messages(&self) -> bool {
        self.status.accepts_messages()
    }

    /// Returns `true` once the status is `Completed` or `Error`.
    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.status.is_terminal()
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new(QueueStatus::Initialized)
    }
}
