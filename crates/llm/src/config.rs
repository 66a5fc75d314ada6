//! Configuration for the hosted engine

use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The model to use
    pub model: String,

    /// The display name of the assistant created on the engine
    pub name: String,

    /// The API base URL, without a trailing slash
    pub base_url: String,
}

impl EngineConfig {
    /// Create a new configuration
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4-1106-preview".into(),
            name: "Concierge".into(),
            base_url: "https://api.openai.com/v1".into(),
        }
    }
}
