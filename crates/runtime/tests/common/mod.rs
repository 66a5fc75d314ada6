//! A scripted engine shared by the runtime tests.

#![allow(dead_code)]

use anyhow::Result;
use llm::{Engine, RunState, RunStatus, Session, Tool, ToolOutput, Work};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Replays a fixed sequence of poll observations, then repeats `fallback`.
pub struct Scripted {
    polls: Mutex<VecDeque<Result<RunState, String>>>,
    fallback: RunState,
    pub instructions: Mutex<String>,
    pub tools: Mutex<Vec<Tool>>,
    pub posted: Mutex<Vec<String>>,
    pub submitted: Mutex<Vec<Vec<ToolOutput>>>,
    pub poll_count: Mutex<usize>,
    pub cancelled: Mutex<Vec<String>>,
}

impl Scripted {
    pub fn new(polls: impl IntoIterator<Item = RunState>) -> Self {
        Self {
            polls: Mutex::new(polls.into_iter().map(Ok).collect()),
            fallback: RunState::status(RunStatus::InProgress),
            instructions: Mutex::new(String::new()),
            tools: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            poll_count: Mutex::new(0),
            cancelled: Mutex::new(Vec::new()),
        }
    }

    /// An engine whose work never finishes.
    pub fn stuck() -> Self {
        Self::new([])
    }

    /// Queue a poll that fails at the transport level.
    pub fn then_error(self, error: &str) -> Self {
        self.polls.lock().push_back(Err(error.to_owned()));
        self
    }
}

impl Engine for Scripted {
    async fn start_session(&self, instructions: &str, tools: &[Tool]) -> Result<Session> {
        *self.instructions.lock() = instructions.to_owned();
        *self.tools.lock() = tools.to_vec();
        Ok(Session {
            agent: "asst_test".into(),
            thread: "thread_test".into(),
        })
    }

    async fn post_user_turn(&self, session: &Session, text: &str) -> Result<Work> {
        let mut posted = self.posted.lock();
        posted.push(text.to_owned());
        Ok(Work {
            thread: session.thread.clone(),
            run: format!("run_{}", posted.len()).into(),
        })
    }

    async fn poll_work(&self, _work: &Work) -> Result<RunState> {
        *self.poll_count.lock() += 1;
        let next = self.polls.lock().pop_front();
        match next {
            Some(Ok(state)) => Ok(state),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => Ok(self.fallback.clone()),
        }
    }

    async fn submit_tool_outputs(&self, _work: &Work, outputs: &[ToolOutput]) -> Result<()> {
        self.submitted.lock().push(outputs.to_vec());
        Ok(())
    }

    async fn cancel_work(&self, work: &Work) -> Result<()> {
        self.cancelled.lock().push(work.run.to_string());
        Ok(())
    }
}
