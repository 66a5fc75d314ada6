//! Wire types of the hosted assistant/thread/run API

use crate::{RunStatus, Tool, ToolCall, ToolOutput};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Body of `POST /assistants`
#[derive(Debug, Serialize)]
pub struct CreateAssistant<'a> {
    pub model: &'a str,
    pub name: &'a str,
    pub instructions: &'a str,
    pub tools: Vec<FunctionTool<'a>>,
}

/// A tool entry in the assistant definition
#[derive(Debug, Serialize)]
pub struct FunctionTool<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: &'a Tool,
}

impl<'a> From<&'a Tool> for FunctionTool<'a> {
    fn from(function: &'a Tool) -> Self {
        Self {
            kind: "function",
            function,
        }
    }
}

/// Body of `POST /threads/{thread}/messages`
#[derive(Debug, Serialize)]
pub struct CreateMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Body of `POST /threads/{thread}/runs`
#[derive(Debug, Serialize)]
pub struct CreateRun<'a> {
    pub assistant_id: &'a str,
}

/// Body of `POST /threads/{thread}/runs/{run}/submit_tool_outputs`
#[derive(Debug, Serialize)]
pub struct SubmitToolOutputs<'a> {
    pub tool_outputs: &'a [ToolOutput],
}

/// Any object that carries an id
#[derive(Debug, Deserialize)]
pub struct Object {
    pub id: CompactString,
}

/// A run object
#[derive(Debug, Deserialize)]
pub struct Run {
    pub id: CompactString,
    pub status: Status,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    #[serde(default)]
    pub last_error: Option<LastError>,
}

/// The vendor run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl From<Status> for RunStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Queued => RunStatus::Queued,
            Status::InProgress | Status::Cancelling => RunStatus::InProgress,
            Status::RequiresAction => RunStatus::RequiresAction,
            Status::Completed => RunStatus::Completed,
            Status::Failed
            | Status::Cancelled
            | Status::Incomplete
            | Status::Expired
            | Status::Unknown => RunStatus::Failed,
        }
    }
}

/// The action a run is waiting on
#[derive(Debug, Deserialize)]
pub struct RequiredAction {
    pub submit_tool_outputs: PendingCalls,
}

/// Tool calls awaiting output
#[derive(Debug, Deserialize)]
pub struct PendingCalls {
    pub tool_calls: Vec<ToolCall>,
}

/// The error reported for a failed run
#[derive(Debug, Deserialize)]
pub struct LastError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// A page of thread messages
#[derive(Debug, Deserialize)]
pub struct MessageList {
    pub data: Vec<ThreadMessage>,
}

/// A message stored on a thread
#[derive(Debug, Deserialize)]
pub struct ThreadMessage {
    pub role: crate::Role,
    #[serde(default)]
    pub run_id: Option<CompactString>,
    #[serde(default)]
    pub content: Vec<Content>,
}

impl ThreadMessage {
    /// Join the text parts of the message with a single space
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| part.text.as_ref().map(|t| t.value.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One content part of a thread message
#[derive(Debug, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub text: Option<Text>,
}

/// A text content part
#[derive(Debug, Deserialize)]
pub struct Text {
    pub value: String,
}
