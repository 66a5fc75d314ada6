//! Completion engine boundary for concierge.
//!
//! This crate provides the shared types used between the conversation loop
//! and a hosted completion engine: `Message`, `Tool`, `ToolCall`,
//! `ToolOutput`, and the polled `Engine` trait. Also provides `Assistants`,
//! the HTTP client for the hosted assistant/thread/run API.

#[cfg(feature = "http")]
pub use assistants::Assistants;
pub use config::EngineConfig;
pub use engine::{Engine, RunState, RunStatus, Session, Work};
pub use message::{Message, Role};
#[cfg(feature = "http")]
pub use reqwest::{self, Client};
pub use tool::{FunctionCall, Tool, ToolCall, ToolOutput};

#[cfg(feature = "http")]
mod assistants;
mod config;
mod engine;
mod message;
mod tool;
