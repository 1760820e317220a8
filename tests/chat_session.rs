mod common;

use common::{logged_in_backend, sse_body, TOKEN};
use journal_client::chat::{ChatClient, ChatEvent, ChatSession};
use journal_client::error::JournalError;
use journal_client::models::Role;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn goal_turn() -> String {
    sse_body(&[
        r#"{"type":"content","content":"Sounds like a great goal. "}"#,
        r#"{not json"#,
        r#"{"type":"content","content":"Shall I create it?"}"#,
        r#"{"type":"tool_call","toolCallId":"tc_1","toolName":"create_goal","displayMessage":"Create goal: Run a 10k","conversationId":"conv_1","params":{"title":"Run a 10k"}}"#,
        "[DONE]",
    ])
}

fn session(api: journal_client::api::ApiClient) -> ChatSession {
    ChatSession::new(ChatClient::new(api, Duration::from_secs(5)), None, true)
}

#[tokio::test]
async fn test_tool_call_flow_confirms_and_appends_result() {
    let backend = logged_in_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/stream"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(body_partial_json(json!({ "message": "I want to run a 10k", "enableTools": true })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(goal_turn(), "text/event-stream"))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/tool-confirm"))
        .and(body_partial_json(json!({
            "toolCallId": "tc_1",
            "confirmed": true,
            "conversationId": "conv_1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Goal created: Run a 10k",
            "data": { "id": "g1" }
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let mut chat = session(backend.api.clone());
    let outcome = chat.send("I want to run a 10k").await.unwrap();

    assert_eq!(outcome.content, "Sounds like a great goal. Shall I create it?");
    assert_eq!(chat.conversation_id(), Some("conv_1"));
    let pending = chat.pending_tool_call().unwrap();
    assert_eq!(pending.tool_call_id, "tc_1");
    assert_eq!(pending.tool_name, "create_goal");
    assert_eq!(chat.messages().len(), 2);
    assert_eq!(chat.messages()[0].role, Role::User);
    assert_eq!(chat.messages()[1].content, outcome.content);

    let result = chat.confirm_pending_tool().await.unwrap();
    assert_eq!(result, "Goal created: Run a 10k");
    assert!(chat.pending_tool_call().is_none());
    assert_eq!(chat.messages().len(), 3);
    assert_eq!(chat.messages()[2].role, Role::Assistant);
    assert_eq!(chat.messages()[2].content, "Goal created: Run a 10k");
}

#[tokio::test]
async fn test_new_message_rejected_while_tool_call_pending() {
    let backend = logged_in_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(goal_turn(), "text/event-stream"))
        .expect(1)
        .mount(&backend.server)
        .await;

    let mut chat = session(backend.api.clone());
    chat.send("I want to run a 10k").await.unwrap();

    match chat.send("Actually, never mind").await {
        Err(JournalError::ToolCallPending(name)) => assert_eq!(name, "create_goal"),
        other => panic!("expected pending tool call error, got {:?}", other.map(|o| o.content)),
    }
    assert_eq!(chat.messages().len(), 2);
}

#[tokio::test]
async fn test_cancel_discards_pending_tool_call() {
    let backend = logged_in_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(goal_turn(), "text/event-stream"))
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/tool-confirm"))
        .and(body_partial_json(json!({ "toolCallId": "tc_1", "confirmed": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let mut chat = session(backend.api.clone());
    chat.send("I want to run a 10k").await.unwrap();
    let reply = chat.cancel_pending_tool().await.unwrap();

    assert_eq!(reply, "Okay, I won't do that.");
    assert!(chat.pending_tool_call().is_none());
    assert_eq!(chat.messages().last().unwrap().content, reply);
}

#[tokio::test]
async fn test_failed_tool_execution_is_reported_in_transcript() {
    let backend = logged_in_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(goal_turn(), "text/event-stream"))
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/tool-confirm"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Goal limit reached"
        })))
        .mount(&backend.server)
        .await;

    let mut chat = session(backend.api.clone());
    chat.send("I want to run a 10k").await.unwrap();

    match chat.confirm_pending_tool().await {
        Err(JournalError::ApiError { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Goal limit reached");
        }
        other => panic!("expected api error, got {:?}", other),
    }
    assert!(chat.pending_tool_call().is_none());
    let last = chat.messages().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.content.contains("Create goal: Run a 10k"));
    assert!(last.content.contains("Goal limit reached"));
}

#[tokio::test]
async fn test_failed_request_rolls_back_user_message() {
    let backend = logged_in_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/stream"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Model unavailable"
        })))
        .mount(&backend.server)
        .await;

    let mut chat = session(backend.api.clone());
    let err = chat.send("Hello").await.unwrap_err();

    assert!(err.to_string().contains("Model unavailable"));
    assert!(chat.messages().is_empty());
    assert!(chat.conversation_id().is_none());
}

#[tokio::test]
async fn test_stream_error_event_rolls_back_turn() {
    let backend = logged_in_backend().await;
    let body = sse_body(&[
        r#"{"type":"content","content":"Let me"}"#,
        r#"{"type":"error","error":"context too long"}"#,
    ]);
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&backend.server)
        .await;

    let mut chat = session(backend.api.clone());
    match chat.send("Summarize everything").await {
        Err(JournalError::StreamError(message)) => assert_eq!(message, "context too long"),
        other => panic!("expected stream error, got {:?}", other.map(|o| o.content)),
    }
    assert!(chat.messages().is_empty());
}

#[tokio::test]
async fn test_turn_yields_events_incrementally() {
    let backend = logged_in_backend().await;
    let body = sse_body(&[
        r#"{"type":"conversation","conversationId":"conv_7"}"#,
        r#"{"type":"content","content":"One"}"#,
        r#"{"type":"content","content":" two"}"#,
        "[DONE]",
    ]);
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&backend.server)
        .await;

    let mut chat = session(backend.api.clone());
    let mut turn = chat.begin_turn("Count").await.unwrap();
    let mut events = Vec::new();
    while let Some(event) = turn.next_event().await {
        events.push(event.unwrap());
    }
    drop(turn);

    assert_eq!(
        events,
        vec![
            ChatEvent::Conversation("conv_7".to_string()),
            ChatEvent::Content("One".to_string()),
            ChatEvent::Content(" two".to_string()),
            ChatEvent::Done,
        ]
    );
    assert_eq!(chat.conversation_id(), Some("conv_7"));
    assert_eq!(chat.messages()[1].content, "One two");
}

#[tokio::test]
async fn test_follow_up_message_sends_conversation_id() {
    let backend = logged_in_backend().await;
    let first = sse_body(&[
        r#"{"type":"conversation","conversationId":"conv_3"}"#,
        r#"{"content":"Hi!"}"#,
        "[DONE]",
    ]);
    let second = sse_body(&[r#"{"content":"Sure."}"#, "[DONE]"]);
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/stream"))
        .and(body_partial_json(json!({ "conversationId": "conv_3" })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(second, "text/event-stream"))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/stream"))
        .and(body_partial_json(json!({ "message": "Hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(first, "text/event-stream"))
        .expect(1)
        .mount(&backend.server)
        .await;

    let mut chat = session(backend.api.clone());
    chat.send("Hello").await.unwrap();
    let outcome = chat.send("Can you help?").await.unwrap();

    assert_eq!(outcome.content, "Sure.");
    assert_eq!(chat.messages().len(), 4);
}

#[tokio::test]
async fn test_load_replaces_transcript() {
    let backend = logged_in_backend().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/conversations/conv_5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "_id": "conv_5",
                "title": "Morning pages",
                "messages": [
                    { "role": "user", "content": "Good morning" },
                    { "role": "assistant", "content": "Morning! How did you sleep?" }
                ]
            }
        })))
        .mount(&backend.server)
        .await;

    let mut chat = session(backend.api.clone());
    chat.load("conv_5").await.unwrap();

    assert_eq!(chat.conversation_id(), Some("conv_5"));
    assert_eq!(chat.messages().len(), 2);
    chat.reset();
    assert!(chat.conversation_id().is_none());
    assert!(chat.messages().is_empty());
}

#[tokio::test]
async fn test_empty_message_is_rejected_without_request() {
    let backend = logged_in_backend().await;
    let mut chat = session(backend.api.clone());
    assert!(chat.send("   ").await.is_err());
    assert!(chat.messages().is_empty());
    assert!(backend.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_slow_stream_response_times_out_and_rolls_back() {
    let backend = logged_in_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&["[DONE]"]), "text/event-stream")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&backend.server)
        .await;

    let client = ChatClient::new(backend.api.clone(), Duration::from_millis(200));
    let mut chat = ChatSession::new(client, None, true);

    let started = std::time::Instant::now();
    match chat.send("Hello?").await {
        Err(JournalError::Timeout) => {}
        other => panic!("expected timeout, got {:?}", other.map(|o| o.content)),
    }
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(chat.messages().is_empty());
}
