//! Transcript entries.
//!
//! The engine keeps the authoritative conversation on its side; these are
//! the local copies the runtime records as turns complete.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person at the prompt.
    #[default]
    User,
    /// The engine's answer.
    Assistant,
}

/// One entry of the local transcript.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// What the user typed.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// What the engine answered.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let speaker = match self.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        write!(f, "{speaker}: {}", self.content)
    }
}
