//! Conversation creation on the Dust side.

use std::sync::Arc;

use dust_client::{
    ByteStream, CreateConversationRequest, DustApiError, DustClientTrait, MessageContext,
    MessagePayload,
};

use crate::services::resolver::{ConversationHandle, ResolutionRequest};

const TITLE_PREFIX: &str = "Mockup: ";
const TITLE_PROMPT_CHARS: usize = 50;

/// Conversation title: a fixed prefix plus the first 50 characters of the prompt.
pub fn conversation_title(prompt: &str) -> String {
    let head: String = prompt.chars().take(TITLE_PROMPT_CHARS).collect();
    format!("{TITLE_PREFIX}{head}...")
}

pub struct ConversationInitiator {
    client: Arc<dyn DustClientTrait>,
    context: MessageContext,
}

impl ConversationInitiator {
    pub fn new(client: Arc<dyn DustClientTrait>, context: MessageContext) -> Self {
        Self { client, context }
    }

    pub fn build_request(
        &self,
        request: &ResolutionRequest,
        streamed: bool,
    ) -> CreateConversationRequest {
        CreateConversationRequest {
            message: MessagePayload {
                content: request.prompt.clone(),
                mentions: Vec::new(),
                context: self.context.clone(),
            },
            assistant_id: request.assistant_id.clone(),
            blocking: false,
            title: conversation_title(&request.prompt),
            stream: streamed.then_some(true),
        }
    }

    /// Create the conversation without waiting for the assistant.
    pub async fn start(
        &self,
        request: &ResolutionRequest,
    ) -> Result<ConversationHandle, DustApiError> {
        let body = self.build_request(request, false);
        let conversation = self.client.create_conversation(&body).await.map_err(|e| {
            log::error!("Conversation creation failed: {}", e);
            e
        })?;
        let conversation_id = conversation.s_id.ok_or_else(|| {
            DustApiError::InvalidResponse("create response has no conversation.sId".to_string())
        })?;
        log::info!("Conversation created: {}", conversation_id);
        Ok(ConversationHandle { conversation_id })
    }

    /// Create the conversation with streamed delivery.
    pub async fn open_stream(
        &self,
        request: &ResolutionRequest,
    ) -> Result<ByteStream, DustApiError> {
        let body = self.build_request(request, true);
        let stream = self
            .client
            .create_conversation_stream(&body)
            .await
            .map_err(|e| {
                log::error!("Streamed conversation creation failed: {}", e);
                e
            })?;
        log::info!("Conversation stream opened");
        Ok(stream)
    }

    pub fn conversation_web_url(&self, conversation_id: &str) -> String {
        self.client.conversation_web_url(conversation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_keeps_short_prompts_whole() {
        assert_eq!(conversation_title("Login form"), "Mockup: Login form...");
    }

    #[test]
    fn test_title_truncates_to_fifty_chars() {
        let prompt = "x".repeat(80);
        let title = conversation_title(&prompt);
        assert_eq!(title, format!("Mockup: {}...", "x".repeat(50)));
    }

    #[test]
    fn test_title_never_splits_multibyte_chars() {
        let prompt = "é".repeat(60);
        let title = conversation_title(&prompt);
        assert_eq!(title.chars().filter(|c| *c == 'é').count(), 50);
    }
}
