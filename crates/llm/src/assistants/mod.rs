//! HTTP client for the hosted assistant/thread/run API.
//!
//! `Assistants` wraps a `reqwest::Client` with pre-configured headers and
//! the API base URL, and implements [`Engine`] on top of the vendor's
//! assistant, thread, run and message resources.

use crate::{Engine, EngineConfig, RunState, RunStatus, Session, Tool, ToolOutput, Work};
use anyhow::{Context, Result};
use reqwest::{
    Client, Method, RequestBuilder,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use wire::{
    CreateAssistant, CreateMessage, CreateRun, MessageList, Object, Run, Status, SubmitToolOutputs,
};

mod wire;

/// Page size used when looking up the answer of a completed run.
const MESSAGE_PAGE: &str = "20";

/// Hosted assistant engine.
///
/// Holds a `reqwest::Client`, pre-built headers (auth, content-type and the
/// assistants beta opt-in), and the engine configuration.
#[derive(Clone)]
pub struct Assistants {
    client: Client,
    headers: HeaderMap,
    config: EngineConfig,
}

impl Assistants {
    /// Create an engine with Bearer token authentication.
    pub fn new(client: Client, key: &str, config: EngineConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::AUTHORIZATION, format!("Bearer {key}").parse()?);
        headers.insert(
            HeaderName::from_static("openai-beta"),
            HeaderValue::from_static("assistants=v2"),
        );
        Ok(Self {
            client,
            headers,
            config,
        })
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        self.client.request(method, url).headers(self.headers.clone())
    }

    /// Send a request and deserialize a successful response as JSON.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .with_context(|| format!("{what}: request failed"))?;
        let status = response.status();
        let text = response.text().await?;
        tracing::trace!("{what}: {status} {text}");
        if !status.is_success() {
            anyhow::bail!("{what}: engine returned {status}: {text}");
        }

        serde_json::from_str(&text).with_context(|| format!("{what}: unexpected response body"))
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &impl Serialize) -> Result<T> {
        if let Ok(body) = serde_json::to_string(body) {
            tracing::trace!("POST {path}: {body}");
        }
        self.call(self.request(Method::POST, path).json(body), path)
            .await
    }

    /// Fetch the latest assistant answer produced by the given run.
    async fn answer(&self, work: &Work) -> Result<Option<String>> {
        let path = format!("/threads/{}/messages", work.thread);
        let request = self
            .request(Method::GET, &path)
            .query(&[("order", "desc"), ("limit", MESSAGE_PAGE)]);
        let list: MessageList = self.call(request, &path).await?;
        Ok(list
            .data
            .iter()
            .filter(|m| m.role == crate::Role::Assistant)
            .find(|m| m.run_id.as_deref().is_none_or(|id| id == work.run.as_str()))
            .map(|m| m.text()))
    }
}

impl Engine for Assistants {
    async fn start_session(&self, instructions: &str, tools: &[Tool]) -> Result<Session> {
        let body = CreateAssistant {
            model: &self.config.model,
            name: &self.config.name,
            instructions,
            tools: tools.iter().map(Into::into).collect(),
        };
        let assistant: Object = self.post("/assistants", &body).await?;
        let thread: Object = self.post("/threads", &serde_json::json!({})).await?;
        tracing::debug!(
            "session started: assistant={} thread={}",
            assistant.id,
            thread.id
        );

        Ok(Session {
            agent: assistant.id,
            thread: thread.id,
        })
    }

    async fn post_user_turn(&self, session: &Session, text: &str) -> Result<Work> {
        let messages = format!("/threads/{}/messages", session.thread);
        let _: Object = self
            .post(
                &messages,
                &CreateMessage {
                    role: "user",
                    content: text,
                },
            )
            .await?;

        let runs = format!("/threads/{}/runs", session.thread);
        let run: Run = self
            .post(
                &runs,
                &CreateRun {
                    assistant_id: &session.agent,
                },
            )
            .await?;
        tracing::debug!("run started: {} ({:?})", run.id, run.status);

        Ok(Work {
            thread: session.thread.clone(),
            run: run.id,
        })
    }

    async fn poll_work(&self, work: &Work) -> Result<RunState> {
        let path = format!("/threads/{}/runs/{}", work.thread, work.run);
        let run: Run = self.call(self.request(Method::GET, &path), &path).await?;
        tracing::debug!("run {} status: {:?}", run.id, run.status);

        let state = match RunStatus::from(run.status) {
            RunStatus::RequiresAction => RunState::requires_action(
                run.required_action
                    .map(|action| action.submit_tool_outputs.tool_calls)
                    .unwrap_or_default(),
            ),
            RunStatus::Completed => RunState {
                text: self.answer(work).await?,
                ..RunState::status(RunStatus::Completed)
            },
            RunStatus::Failed => RunState::failed(match run.last_error {
                Some(error) => format!("{}: {}", error.code, error.message),
                None if run.status == Status::Failed => "run failed".to_owned(),
                None => format!("run ended as {:?}", run.status),
            }),
            status => RunState::status(status),
        };
        Ok(state)
    }

    async fn submit_tool_outputs(&self, work: &Work, outputs: &[ToolOutput]) -> Result<()> {
        let path = format!(
            "/threads/{}/runs/{}/submit_tool_outputs",
            work.thread, work.run
        );
        let run: Run = self
            .post(
                &path,
                &SubmitToolOutputs {
                    tool_outputs: outputs,
                },
            )
            .await?;
        tracing::debug!(
            "submitted {} tool outputs, run {} now {:?}",
            outputs.len(),
            run.id,
            run.status
        );
        Ok(())
    }

    async fn cancel_work(&self, work: &Work) -> Result<()> {
        let path = format!("/threads/{}/runs/{}/cancel", work.thread, work.run);
        let run: Run = self.post(&path, &serde_json::json!({})).await?;
        tracing::debug!("cancelled run {}, now {:?}", run.id, run.status);
        Ok(())
    }
}
