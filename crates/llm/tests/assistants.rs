//! Tests for the hosted assistant engine.

use concierge_llm::{
    Assistants, Client, Engine, EngineConfig, RunState, RunStatus, Session, Tool, ToolCall,
    ToolOutput, Work,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

fn engine(server: &MockServer) -> Assistants {
    let config = EngineConfig {
        base_url: server.uri(),
        ..EngineConfig::default()
    };
    Assistants::new(Client::new(), "test-key", config).expect("engine")
}

fn work() -> Work {
    Work {
        thread: "thread_1".into(),
        run: "run_1".into(),
    }
}

#[test]
fn bearer_and_beta_headers() {
    let engine = Assistants::new(Client::new(), "test-key", EngineConfig::default())
        .expect("engine");

    let auth = engine
        .headers()
        .get("authorization")
        .expect("authorization header");
    assert_eq!(auth.to_str().unwrap(), "Bearer test-key");
    let beta = engine.headers().get("openai-beta").expect("beta header");
    assert_eq!(beta.to_str().unwrap(), "assistants=v2");
    assert_eq!(engine.config().base_url, "https://api.openai.com/v1");
}

#[tokio::test]
async fn start_session_creates_assistant_and_thread() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/assistants"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4-1106-preview",
            "instructions": "be helpful",
            "tools": [{ "type": "function", "function": { "name": "get_current_weather" } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "asst_1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "thread_1" })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = Tool {
        name: "get_current_weather".into(),
        description: "Get the current weather for a given city".into(),
        parameters: schemars::json_schema!({ "type": "object" }),
        strict: false,
    };
    let session = engine(&server)
        .start_session("be helpful", &[tool])
        .await
        .unwrap();
    assert_eq!(session.agent, "asst_1");
    assert_eq!(session.thread, "thread_1");
}

#[tokio::test]
async fn post_user_turn_starts_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .and(body_partial_json(json!({ "role": "user", "content": "hi" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .and(body_partial_json(json!({ "assistant_id": "asst_1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "run_1", "status": "queued" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = Session {
        agent: "asst_1".into(),
        thread: "thread_1".into(),
    };
    let work = engine(&server).post_user_turn(&session, "hi").await.unwrap();
    assert_eq!(work.run, "run_1");
    assert_eq!(work.thread, "thread_1");
}

#[tokio::test]
async fn poll_reports_required_tool_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "run_1",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "get_current_weather", "arguments": "{\"city\":\"Paris\"}" }
                    }]
                }
            }
        })))
        .mount(&server)
        .await;

    let state = engine(&server).poll_work(&work()).await.unwrap();
    assert_eq!(state.status, RunStatus::RequiresAction);
    assert_eq!(state.tool_calls.len(), 1);
    assert_eq!(state.tool_calls[0].id, "call_1");
    assert_eq!(state.tool_calls[0].function.name, "get_current_weather");
    assert_eq!(state.tool_calls[0].function.arguments, r#"{"city":"Paris"}"#);
    assert_eq!(
        state,
        RunState::requires_action(vec![ToolCall::function(
            "call_1",
            "get_current_weather",
            r#"{"city":"Paris"}"#,
        )])
    );
}

#[tokio::test]
async fn poll_completed_fetches_answer_of_this_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "run_1", "status": "completed" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/messages"))
        .and(query_param("order", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "role": "assistant",
                    "run_id": "run_1",
                    "content": [
                        { "type": "text", "text": { "value": "It is sunny" } },
                        { "type": "text", "text": { "value": "in Paris." } }
                    ]
                },
                {
                    "role": "assistant",
                    "run_id": "run_0",
                    "content": [{ "type": "text", "text": { "value": "older" } }]
                }
            ]
        })))
        .mount(&server)
        .await;

    let state = engine(&server).poll_work(&work()).await.unwrap();
    assert_eq!(state.status, RunStatus::Completed);
    assert_eq!(state.text.as_deref(), Some("It is sunny in Paris."));
}

#[tokio::test]
async fn poll_maps_expired_to_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "run_1", "status": "expired" })),
        )
        .mount(&server)
        .await;

    let state = engine(&server).poll_work(&work()).await.unwrap();
    assert_eq!(state.status, RunStatus::Failed);
    assert!(state.error.is_some());
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/threads/thread_1/runs/run_1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = engine(&server).poll_work(&work()).await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn submit_sends_outputs_keyed_by_call_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs/run_1/submit_tool_outputs"))
        .and(body_partial_json(json!({
            "tool_outputs": [{ "tool_call_id": "call_1", "output": "sunny" }]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "run_1", "status": "queued" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    engine(&server)
        .submit_tool_outputs(&work(), &[ToolOutput::ok("call_1", "sunny")])
        .await
        .unwrap();
}

#[tokio::test]
async fn cancel_posts_to_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs/run_1/cancel"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "run_1", "status": "cancelling" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    engine(&server).cancel_work(&work()).await.unwrap();
}
