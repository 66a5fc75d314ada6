//! Turn states and turn configuration

use llm::RunStatus;
use std::time::Duration;

/// The state of one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// The engine accepted the work but has not started it.
    Queued,
    /// The engine is working.
    InProgress,
    /// The engine is waiting for tool outputs.
    RequiresAction,
    /// The engine produced a final answer.
    Completed,
    /// The engine reported a failure, or the turn hit an unexpected error.
    Failed,
    /// The turn exceeded its wall-clock budget.
    TimedOut,
}

impl SessionState {
    /// Whether the turn is over.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::TimedOut)
    }
}

impl From<RunStatus> for SessionState {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Queued => Self::Queued,
            RunStatus::InProgress => Self::InProgress,
            RunStatus::RequiresAction => Self::RequiresAction,
            RunStatus::Completed => Self::Completed,
            RunStatus::Failed => Self::Failed,
        }
    }
}

/// The result of one turn: a terminal state and the text to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Always one of `Completed`, `Failed` or `TimedOut`.
    pub state: SessionState,
    /// The assistant answer, or an apology.
    pub text: String,
}

impl TurnOutcome {
    pub(crate) fn new(state: SessionState, text: impl Into<String>) -> Self {
        Self {
            state,
            text: text.into(),
        }
    }
}

/// Timing of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnConfig {
    /// Wall-clock budget of a whole turn, tool round-trips included.
    pub timeout: Duration,
    /// Fixed delay between polls.
    pub poll_interval: Duration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
        }
    }
}
