use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

use crate::api::models::{Conversation, CreateConversationRequest};
use crate::error::Result;

/// Raw body chunks of a streamed conversation creation.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

#[async_trait]
pub trait DustClientTrait: Send + Sync {
    /// Create a conversation and return the snapshot from the create-response.
    async fn create_conversation(&self, request: &CreateConversationRequest)
        -> Result<Conversation>;

    /// Create a conversation with streamed delivery and hand back the open body.
    /// A non-success status is reported before any chunk is read.
    async fn create_conversation_stream(
        &self,
        request: &CreateConversationRequest,
    ) -> Result<ByteStream>;

    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation>;

    /// Human-facing link to the conversation.
    fn conversation_web_url(&self, conversation_id: &str) -> String;
}
