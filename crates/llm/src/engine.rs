//! The polled completion engine boundary

use crate::{Tool, ToolCall, ToolOutput};
use anyhow::Result;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A hosted completion engine driven by request/response polling.
///
/// There is no inbound event stream: callers start a unit of work with
/// [`Engine::post_user_turn`] and poll it until it needs tool output,
/// completes, or fails.
pub trait Engine: Send + Sync {
    /// Create the persistent conversation identity
    fn start_session(
        &self,
        instructions: &str,
        tools: &[Tool],
    ) -> impl Future<Output = Result<Session>> + Send;

    /// Append a user message and start a unit of work for it
    fn post_user_turn(
        &self,
        session: &Session,
        text: &str,
    ) -> impl Future<Output = Result<Work>> + Send;

    /// Observe the current state of a unit of work
    fn poll_work(&self, work: &Work) -> impl Future<Output = Result<RunState>> + Send;

    /// Hand back one output per requested tool call
    fn submit_tool_outputs(
        &self,
        work: &Work,
        outputs: &[ToolOutput],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Stop a unit of work the caller gave up on
    fn cancel_work(&self, work: &Work) -> impl Future<Output = Result<()>> + Send;
}

/// A persistent conversation identity, kept for the life of the process
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Session {
    /// The engine-side agent (assistant) id
    pub agent: CompactString,

    /// The engine-side conversation (thread) id
    pub thread: CompactString,
}

/// A unit of work started for one user turn
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Work {
    /// The conversation the work belongs to
    pub thread: CompactString,

    /// The engine-side run id
    pub run: CompactString,
}

/// The engine-reported status of a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Accepted, not yet started
    Queued,
    /// Being processed
    InProgress,
    /// Waiting for tool outputs
    RequiresAction,
    /// Finished with a final answer
    Completed,
    /// Finished without an answer
    Failed,
}

impl RunStatus {
    /// Whether the work can make no further progress
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One poll observation
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    /// The status of the work
    pub status: RunStatus,

    /// Calls awaiting output, set when status is `RequiresAction`
    pub tool_calls: Vec<ToolCall>,

    /// The final answer, set when status is `Completed`
    pub text: Option<String>,

    /// The engine-reported cause, set when status is `Failed`
    pub error: Option<String>,
}

impl RunState {
    /// A state with no payload
    pub fn status(status: RunStatus) -> Self {
        Self {
            status,
            tool_calls: Vec::new(),
            text: None,
            error: None,
        }
    }

    /// A state waiting on the given tool calls
    pub fn requires_action(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::status(RunStatus::RequiresAction)
        }
    }

    /// A completed state carrying the final answer
    pub fn completed(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::status(RunStatus::Completed)
        }
    }

    /// A failed state carrying the engine-reported cause
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::status(RunStatus::Failed)
        }
    }
}
