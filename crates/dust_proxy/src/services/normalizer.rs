//! Maps a [`ResolutionOutcome`] onto the wire envelope returned to the caller.

use actix_web::{http::StatusCode, HttpResponse};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::services::resolver::ResolutionOutcome;

pub const TIMEOUT_MESSAGE: &str = "Timeout: assistant did not respond in time";
pub const NO_CONTENT_MESSAGE: &str = "No agent response found";
pub const UPSTREAM_ERROR_MESSAGE: &str = "Dust API error (create)";

/// Status and JSON body for an outcome.
///
/// A successful conversation is echoed with its history replaced by the final
/// agent message alone.
pub fn envelope(outcome: ResolutionOutcome) -> Result<(StatusCode, Value), AppError> {
    let envelope = match outcome {
        ResolutionOutcome::Success {
            conversation,
            message,
        } => {
            let conversation = conversation.with_single_message(&message);
            let conversation = serde_json::to_value(conversation)?;
            (StatusCode::OK, json!({ "conversation": conversation }))
        }
        ResolutionOutcome::Timeout {
            conversation_id,
            attempts,
            conversation_url,
        } => (
            StatusCode::REQUEST_TIMEOUT,
            json!({
                "error": TIMEOUT_MESSAGE,
                "debug": {
                    "conversationId": conversation_id,
                    "attempts": attempts,
                    "conversationUrl": conversation_url,
                }
            }),
        ),
        ResolutionOutcome::UpstreamError { status, body } => {
            let status = StatusCode::from_u16(status).unwrap_or_else(|_| {
                log::warn!("Upstream returned unusable status {}, answering 502", status);
                StatusCode::BAD_GATEWAY
            });
            (
                status,
                json!({
                    "error": UPSTREAM_ERROR_MESSAGE,
                    "details": body,
                }),
            )
        }
        ResolutionOutcome::NoContent { conversation_id } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "error": NO_CONTENT_MESSAGE,
                "debug": { "conversationId": conversation_id }
            }),
        ),
    };
    Ok(envelope)
}

pub fn into_response(outcome: ResolutionOutcome) -> Result<HttpResponse, AppError> {
    let (status, body) = envelope(outcome)?;
    Ok(HttpResponse::build(status).json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dust_client::{AgentMessage, Conversation};

    #[test]
    fn test_success_keeps_only_the_final_message() {
        let conversation: Conversation = serde_json::from_value(json!({
            "sId": "c1",
            "title": "Mockup: card...",
            "content": [
                [{"type": "user_message", "content": "card"}],
                [{"type": "agent_message", "sId": "a1", "content": "old"}],
                [{"type": "agent_message", "sId": "a2", "content": "new"}]
            ]
        }))
        .unwrap();
        let message = conversation.last_agent_message().unwrap();

        let (status, body) = envelope(ResolutionOutcome::Success {
            conversation,
            message,
        })
        .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["conversation"]["sId"], "c1");
        assert_eq!(body["conversation"]["title"], "Mockup: card...");
        let content = body["conversation"]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0].as_array().unwrap().len(), 1);
        assert_eq!(content[0][0]["sId"], "a2");
        assert_eq!(content[0][0]["content"], "new");
    }

    #[test]
    fn test_success_echoes_message_fields_unchanged() {
        let entry = json!({
            "type": "agent_message",
            "sId": "a1",
            "content": "<frame/>",
            "visibility": "archived",
            "status": "succeeded"
        });
        let conversation: Conversation =
            serde_json::from_value(json!({"sId": "c1", "content": [[entry.clone()]]})).unwrap();
        let message = conversation.last_agent_message().unwrap();

        let (_, body) = envelope(ResolutionOutcome::Success {
            conversation,
            message,
        })
        .unwrap();

        assert_eq!(body["conversation"]["content"], json!([[entry]]));
    }

    #[test]
    fn test_streamed_message_is_wrapped_in_a_conversation() {
        let (_, body) = envelope(ResolutionOutcome::Success {
            conversation: Conversation {
                s_id: Some("c9".to_string()),
                ..Default::default()
            },
            message: AgentMessage::new("stream-1".to_string(), "Hello world".to_string()),
        })
        .unwrap();

        assert_eq!(body["conversation"]["content"][0][0]["type"], "agent_message");
        assert_eq!(body["conversation"]["content"][0][0]["content"], "Hello world");
    }

    #[test]
    fn test_timeout_carries_debug_fields() {
        let (status, body) = envelope(ResolutionOutcome::Timeout {
            conversation_id: Some("c1".to_string()),
            attempts: 15,
            conversation_url: Some("https://dust.tt/w/ws/conversation/c1".to_string()),
        })
        .unwrap();

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["error"], TIMEOUT_MESSAGE);
        assert_eq!(body["debug"]["conversationId"], "c1");
        assert_eq!(body["debug"]["attempts"], 15);
        assert_eq!(
            body["debug"]["conversationUrl"],
            "https://dust.tt/w/ws/conversation/c1"
        );
    }

    #[test]
    fn test_upstream_status_is_passed_through() {
        let (status, body) = envelope(ResolutionOutcome::UpstreamError {
            status: 403,
            body: "{\"error\":\"forbidden\"}".to_string(),
        })
        .unwrap();

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], UPSTREAM_ERROR_MESSAGE);
        assert_eq!(body["details"], "{\"error\":\"forbidden\"}");
    }

    #[test]
    fn test_unusable_upstream_status_becomes_bad_gateway() {
        let (status, _) = envelope(ResolutionOutcome::UpstreamError {
            status: 42,
            body: String::new(),
        })
        .unwrap();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_no_content_is_server_error() {
        let (status, body) = envelope(ResolutionOutcome::NoContent {
            conversation_id: None,
        })
        .unwrap();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], NO_CONTENT_MESSAGE);
        assert!(body["debug"]["conversationId"].is_null());
    }
}
