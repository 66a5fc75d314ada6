//! Concierge runtime: the conversation orchestrator.
//!
//! The [`Runtime`] drives one session against a polled completion
//! [`Engine`]. It holds the capability [`Registry`], the engine session, and
//! the local transcript, and runs each user turn to a terminal state.
//!
//! # Example
//!
//! ```rust,ignore
//! use runtime::{Capability, Param, Registry, Runtime, TurnConfig};
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     Capability::new("echo", "Echoes the input", |args| async move {
//!         anyhow::Ok(args["text"].to_string())
//!     })
//!     .param(Param::string("text").required()),
//! )?;
//! let mut runtime = Runtime::start(engine, registry, "You are helpful.", TurnConfig::default()).await?;
//! let outcome = runtime.turn("hello").await;
//! ```

pub use dispatch::parse_arguments;
pub use llm::Engine;
pub use registry::{Arguments, Capability, Handler, Param, ParamKind, Registry, RegistryError};
pub use state::{SessionState, TurnConfig, TurnOutcome};

use anyhow::Result;
use llm::{Message, RunStatus, Session, Work};
use std::time::Duration;
use tokio::time::{Instant, timeout, timeout_at};

mod dispatch;
mod registry;
mod state;

/// Reply when the engine reports a failed run.
pub const FAILED_REPLY: &str =
    "I'm sorry, but I encountered an error while processing your request. Please try again.";

/// Reply when a turn exceeds its budget.
pub const TIMEOUT_REPLY: &str = "The request timed out. Please try again later.";

/// Reply when the engine completes without an assistant message.
pub const EMPTY_REPLY: &str = "No response received from assistant.";

/// Budget for cancelling work abandoned on timeout.
const CANCEL_TIMEOUT: Duration = Duration::from_secs(5);

/// The conversation orchestrator for one session.
pub struct Runtime<E: Engine> {
    engine: E,
    registry: Registry,
    config: TurnConfig,
    session: Session,
    history: Vec<Message>,
}

impl<E: Engine> Runtime<E> {
    /// Start the engine session with the registry's capabilities.
    pub async fn start(
        engine: E,
        registry: Registry,
        instructions: &str,
        config: TurnConfig,
    ) -> Result<Self> {
        let session = engine
            .start_session(instructions, &registry.tools())
            .await?;
        tracing::info!(
            "session {} started with {} capabilities",
            session.thread,
            registry.len()
        );

        Ok(Self {
            engine,
            registry,
            config,
            session,
            history: Vec::new(),
        })
    }

    /// The completion engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The capability registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The engine session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The local transcript, in chronological order.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Run one user turn to a terminal state.
    ///
    /// Never fails and never blocks past the configured budget: engine
    /// failures, unexpected errors and timeouts all come back as a
    /// [`TurnOutcome`] with an apology. Work abandoned on timeout is
    /// cancelled so the next turn can post to the same session.
    pub async fn turn(&mut self, input: &str) -> TurnOutcome {
        self.history.push(Message::user(input));

        let deadline = Instant::now() + self.config.timeout;
        let posted =
            timeout_at(deadline, self.engine.post_user_turn(&self.session, input)).await;
        let outcome = match posted {
            Ok(Ok(work)) => match timeout_at(deadline, self.run(&work)).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => errored(e),
                Err(_) => {
                    self.cancel(&work).await;
                    self.timed_out()
                }
            },
            Ok(Err(e)) => errored(e),
            Err(_) => self.timed_out(),
        };

        if outcome.state == SessionState::Completed {
            let answer = Message::assistant(&outcome.text);
            tracing::debug!("{answer}");
            self.history.push(answer);
        }
        outcome
    }

    fn timed_out(&self) -> TurnOutcome {
        tracing::warn!("turn timed out after {:?}", self.config.timeout);
        TurnOutcome::new(SessionState::TimedOut, TIMEOUT_REPLY)
    }

    /// Best effort: a run left active blocks new messages on its thread.
    async fn cancel(&self, work: &Work) {
        match timeout(CANCEL_TIMEOUT, self.engine.cancel_work(work)).await {
            Ok(Ok(())) => tracing::debug!("cancelled run {}", work.run),
            Ok(Err(e)) => tracing::warn!("could not cancel run {}: {e:#}", work.run),
            Err(_) => tracing::warn!("cancelling run {} timed out", work.run),
        }
    }

    /// Poll the work until it ends.
    async fn run(&self, work: &Work) -> Result<TurnOutcome> {
        loop {
            let state = self.engine.poll_work(work).await?;
            match state.status {
                RunStatus::Completed => {
                    let text = state.text.filter(|t| !t.is_empty());
                    return Ok(TurnOutcome::new(
                        SessionState::Completed,
                        text.unwrap_or_else(|| EMPTY_REPLY.to_owned()),
                    ));
                }
                RunStatus::Failed => {
                    tracing::warn!(
                        "run {} failed: {}",
                        work.run,
                        state.error.as_deref().unwrap_or("no cause reported")
                    );
                    return Ok(TurnOutcome::new(SessionState::Failed, FAILED_REPLY));
                }
                RunStatus::RequiresAction => self.act(work, &state.tool_calls).await?,
                RunStatus::Queued | RunStatus::InProgress => {}
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Dispatch every pending call and submit all outputs in one batch.
    async fn act(&self, work: &Work, calls: &[llm::ToolCall]) -> Result<()> {
        if calls.is_empty() {
            tracing::warn!("run {} requires action without tool calls", work.run);
            return Ok(());
        }

        let outputs = self.registry.dispatch_all(calls).await;
        self.engine.submit_tool_outputs(work, &outputs).await
    }
}

fn errored(e: anyhow::Error) -> TurnOutcome {
    tracing::error!("turn failed: {e:#}");
    TurnOutcome::new(
        SessionState::Failed,
        format!("An error occurred: {e}. Please try again."),
    )
}
