//! Integration tests for DustClient against a mocked Dust API

use dust_client::{
    CreateConversationRequest, DustApiError, DustClient, DustClientTrait, DustConfig,
    MessageContext, MessagePayload,
};
use futures_util::StreamExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_request(stream: Option<bool>) -> CreateConversationRequest {
    CreateConversationRequest {
        message: MessagePayload {
            content: "Draw a pricing card".to_string(),
            mentions: vec![],
            context: MessageContext::default(),
        },
        assistant_id: "asst-1".to_string(),
        blocking: false,
        title: "Mockup: Draw a pricing card...".to_string(),
        stream,
    }
}

fn client_for(server: &MockServer) -> DustClient {
    let config = DustConfig::new("sk-test-key", "ws1").with_api_base(server.uri());
    DustClient::new(config).expect("client")
}

#[tokio::test]
async fn test_create_conversation_sends_bearer_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/w/ws1/assistant/conversations"))
        .and(header("authorization", "Bearer sk-test-key"))
        .and(body_partial_json(serde_json::json!({
            "assistantId": "asst-1",
            "blocking": false,
            "message": {"content": "Draw a pricing card", "mentions": []}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "conversation": {"sId": "conv-1", "title": "Mockup"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let conversation = client
        .create_conversation(&create_request(None))
        .await
        .expect("conversation");

    assert_eq!(conversation.s_id.as_deref(), Some("conv-1"));
    assert_eq!(conversation.extra["title"], "Mockup");
}

#[tokio::test]
async fn test_create_conversation_reports_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/w/ws1/assistant/conversations"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .create_conversation(&create_request(None))
        .await
        .unwrap_err();

    match err {
        DustApiError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream overloaded");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_conversation_parses_message_groups() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/ws1/assistant/conversations/conv-1"))
        .and(header("authorization", "Bearer sk-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "conversation": {
                "sId": "conv-1",
                "content": [
                    [{"type": "user_message", "sId": "u1", "content": "hi"}],
                    [{"type": "agent_message", "sId": "a1", "content": "hello", "visibility": "visible"}]
                ]
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let conversation = client.get_conversation("conv-1").await.expect("conversation");

    let message = conversation.last_agent_message().expect("agent message");
    assert_eq!(message.id, "a1");
    assert_eq!(message.content, "hello");
}

#[tokio::test]
async fn test_create_conversation_stream_yields_raw_body() {
    let mock_server = MockServer::start().await;

    let sse_body = concat!(
        "data: {\"type\":\"user_message_new\",\"conversation\":{\"sId\":\"conv-2\"}}\n",
        "\n",
        "data: {\"type\":\"agent_message_success\",\"message\":{\"sId\":\"a1\",\"content\":\"done\"}}\n",
    );

    Mock::given(method("POST"))
        .and(path("/w/ws1/assistant/conversations"))
        .and(body_partial_json(serde_json::json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut stream = client
        .create_conversation_stream(&create_request(Some(true)))
        .await
        .expect("stream");

    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk.expect("chunk"));
    }
    assert_eq!(String::from_utf8(body).unwrap(), sse_body);
}

#[tokio::test]
async fn test_create_conversation_stream_fails_before_reading_on_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/w/ws1/assistant/conversations"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .create_conversation_stream(&create_request(Some(true)))
        .await;

    match result {
        Err(err) => assert_eq!(err.status(), Some(401)),
        Ok(_) => panic!("expected an error for 401"),
    }
}

#[test]
fn test_conversation_web_url() {
    let config = DustConfig::new("sk-test-key", "ws1").with_web_base("https://dust.example/");
    let client = DustClient::new(config).expect("client");
    assert_eq!(
        client.conversation_web_url("conv-9"),
        "https://dust.example/w/ws1/conversation/conv-9"
    );
}
