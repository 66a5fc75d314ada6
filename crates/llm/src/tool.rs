//! Tool abstractions shared with the completion engine

use compact_str::CompactString;
use schemars::Schema;
use serde::{Deserialize, Serialize};

/// A tool exposed to the engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tool {
    /// The name of the tool
    pub name: CompactString,

    /// The description of the tool
    pub description: String,

    /// The parameters of the tool
    pub parameters: Schema,

    /// Whether to strictly validate the parameters
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strict: bool,
}

/// A tool call requested by the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolCall {
    /// The ID of the tool call
    pub id: CompactString,

    /// The type of tool (currently only "function")
    #[serde(default, rename = "type")]
    pub call_type: CompactString,

    /// The function to call
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a function tool call
    pub fn function(
        id: impl Into<CompactString>,
        name: impl Into<CompactString>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// A function call within a tool call
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FunctionCall {
    /// The name of the function to call
    pub name: CompactString,

    /// The arguments to pass to the function (JSON string)
    #[serde(default)]
    pub arguments: String,
}

/// The output of one tool call, keyed by call id
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolOutput {
    /// The ID of the tool call this output answers
    pub tool_call_id: CompactString,

    /// The text handed back to the engine
    pub output: String,

    /// Whether the output describes a failure
    #[serde(default, skip_serializing)]
    pub error: bool,
}

impl ToolOutput {
    /// Create a successful output
    pub fn ok(call: impl Into<CompactString>, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: call.into(),
            output: output.into(),
            error: false,
        }
    }

    /// Create an error output
    pub fn error(call: impl Into<CompactString>, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: call.into(),
            output: output.into(),
            error: true,
        }
    }
}
