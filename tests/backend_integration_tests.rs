use parley::chat::{
    BackendError, ChatBackend, ChatRequest, DataStreamBackend, Message, Part, Role, StreamEvent,
};
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path, query_param},
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Creates a single-message history with a user prompt
fn user_messages(text: &str) -> Vec<Message> {
    vec![Message {
        id: "msg_user_1".to_string(),
        role: Role::User,
        parts: vec![Part::text(text)],
    }]
}

/// Collects all stream events from a receiver
async fn collect_events(mut receiver: mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    while let Some(event) = receiver.recv().await {
        events.push(event);
    }
    events
}

async fn run_stream(
    backend: &DataStreamBackend,
    messages: &[Message],
) -> (Result<(), BackendError>, Vec<StreamEvent>) {
    let (tx, rx) = mpsc::channel(100);
    let request = ChatRequest {
        conversation_id: "conv_1",
        messages,
    };
    let result = backend.stream_chat(request, tx).await;
    let events = collect_events(rx).await;
    (result, events)
}

// ============================================================================
// Streaming Tests
// ============================================================================

#[tokio::test]
async fn test_text_streaming_sequence() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
data: {\"type\":\"start\",\"messageId\":\"msg_1\"}

data: {\"type\":\"text-start\",\"id\":\"t1\"}

data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\"Hello\"}

data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\" world\"}

data: {\"type\":\"text-end\",\"id\":\"t1\"}

data: {\"type\":\"finish\"}

data: [DONE]
";

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let backend = DataStreamBackend::new(mock_server.uri());
    let (result, events) = run_stream(&backend, &user_messages("Hello")).await;

    assert!(result.is_ok());
    assert_eq!(
        events,
        vec![
            StreamEvent::Start {
                message_id: "msg_1".to_string()
            },
            StreamEvent::TextStart {
                id: "t1".to_string()
            },
            StreamEvent::TextDelta {
                id: "t1".to_string(),
                delta: "Hello".to_string()
            },
            StreamEvent::TextDelta {
                id: "t1".to_string(),
                delta: " world".to_string()
            },
            StreamEvent::TextEnd {
                id: "t1".to_string()
            },
            StreamEvent::Finish,
        ]
    );
}

#[tokio::test]
async fn test_tool_round_trip_events() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
data: {\"type\":\"start\",\"messageId\":\"msg_1\"}

data: {\"type\":\"tool-input-start\",\"toolCallId\":\"call_1\",\"toolName\":\"get_current_weather\"}

data: {\"type\":\"tool-input-available\",\"toolCallId\":\"call_1\",\"toolName\":\"get_current_weather\",\"input\":{\"city\":\"Tokyo\"}}

data: {\"type\":\"tool-output-available\",\"toolCallId\":\"call_1\",\"output\":{\"temperature\":21}}

data: {\"type\":\"finish\"}

data: [DONE]
";

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let backend = DataStreamBackend::new(mock_server.uri());
    let (result, events) = run_stream(&backend, &user_messages("weather?")).await;

    assert!(result.is_ok());
    assert_eq!(
        events[1],
        StreamEvent::ToolInputStart {
            tool_call_id: "call_1".to_string(),
            tool_name: "get_current_weather".to_string()
        }
    );
    assert_eq!(
        events[2],
        StreamEvent::ToolInputAvailable {
            tool_call_id: "call_1".to_string(),
            tool_name: "get_current_weather".to_string(),
            input: json!({"city": "Tokyo"})
        }
    );
    assert_eq!(
        events[3],
        StreamEvent::ToolOutputAvailable {
            tool_call_id: "call_1".to_string(),
            output: json!({"temperature": 21})
        }
    );
}

#[tokio::test]
async fn test_named_data_events() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
data: {\"type\":\"start\",\"messageId\":\"msg_1\"}

data: {\"type\":\"data-usage\",\"data\":{\"totalTokens\":42}}

data: {\"type\":\"finish\"}

data: [DONE]
";

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let backend = DataStreamBackend::new(mock_server.uri());
    let (result, events) = run_stream(&backend, &user_messages("hi")).await;

    assert!(result.is_ok());
    assert_eq!(
        events[1],
        StreamEvent::Data {
            name: "usage".to_string(),
            data: json!({"totalTokens": 42})
        }
    );
}

#[tokio::test]
async fn test_error_event_is_forwarded() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
data: {\"type\":\"start\",\"messageId\":\"msg_1\"}

data: {\"type\":\"error\",\"errorText\":\"model unavailable\"}

data: {\"type\":\"finish\"}

data: [DONE]
";

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let backend = DataStreamBackend::new(mock_server.uri());
    let (result, events) = run_stream(&backend, &user_messages("hi")).await;

    assert!(result.is_ok());
    assert!(events.contains(&StreamEvent::Error {
        error_text: "model unavailable".to_string()
    }));
}

#[tokio::test]
async fn test_malformed_and_unknown_lines_are_skipped() {
    let mock_server = MockServer::start().await;

    // A malformed JSON line and an unrendered event type between two
    // valid deltas. The stream must survive both.
    let sse_response = "\
data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\"a\"}

data: {not json at all

data: {\"type\":\"source-url\",\"url\":\"https://example.com\"}

data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\"b\"}

data: [DONE]
";

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let backend = DataStreamBackend::new(mock_server.uri());
    let (result, events) = run_stream(&backend, &user_messages("hi")).await;

    assert!(result.is_ok());
    assert_eq!(
        events,
        vec![
            StreamEvent::TextDelta {
                id: "t1".to_string(),
                delta: "a".to_string()
            },
            StreamEvent::TextDelta {
                id: "t1".to_string(),
                delta: "b".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_body_ending_without_done_marker() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\"partial\"}
";

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let backend = DataStreamBackend::new(mock_server.uri());
    let (result, events) = run_stream(&backend, &user_messages("hi")).await;

    // A truncated body is not a transport error; the events that arrived
    // are still delivered.
    assert!(result.is_ok());
    assert_eq!(events.len(), 1);
}

// ============================================================================
// Request Shape Tests
// ============================================================================

#[tokio::test]
async fn test_request_carries_trigger_and_protocol() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(query_param("protocol", "data"))
        .and(body_partial_json(json!({
            "id": "conv_1",
            "trigger": "submit-message"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("data: [DONE]\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = DataStreamBackend::new(mock_server.uri());
    let (result, events) = run_stream(&backend, &user_messages("hi")).await;

    assert!(result.is_ok());
    assert!(events.is_empty());
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_http_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let backend = DataStreamBackend::new(mock_server.uri());
    let (result, _) = run_stream(&backend, &user_messages("hi")).await;

    match result {
        Err(BackendError::Api { status, .. }) => assert_eq!(status, 500),
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Nothing is listening on this port
    let backend = DataStreamBackend::new("http://127.0.0.1:1".to_string());
    let (result, _) = run_stream(&backend, &user_messages("hi")).await;

    assert!(matches!(result, Err(BackendError::Network(_))));
}

#[tokio::test]
async fn test_dropped_receiver_closes_stream() {
    let mock_server = MockServer::start().await;

    let sse_response = "\
data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\"a\"}

data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\"b\"}

data: [DONE]
";

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_response))
        .mount(&mock_server)
        .await;

    let backend = DataStreamBackend::new(mock_server.uri());
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let request = ChatRequest {
        conversation_id: "conv_1",
        messages: &user_messages("hi"),
    };
    let result = backend.stream_chat(request, tx).await;

    assert!(matches!(result, Err(BackendError::ChannelClosed)));
}
