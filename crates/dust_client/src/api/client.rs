use async_trait::async_trait;
use futures_util::StreamExt;
use log::{info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method};

use crate::api::models::{Conversation, ConversationEnvelope, CreateConversationRequest};
use crate::client_trait::{ByteStream, DustClientTrait};
use crate::config::DustConfig;
use crate::error::{DustApiError, Result};
use crate::utils::http_utils::{ensure_success, execute_request};

const CLIENT_USER_AGENT: &str = concat!("dust-proxy/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the Dust assistant conversation API.
#[derive(Debug, Clone)]
pub struct DustClient {
    client: Client,
    config: DustConfig,
}

impl DustClient {
    pub fn new(config: DustConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers(Self::get_default_headers())
            .build()?;
        info!(
            "Dust client ready for workspace {} at {}",
            config.workspace_id, config.api_base
        );
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DustConfig {
        &self.config
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut header = HeaderMap::new();
        header.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        header.insert(ACCEPT, HeaderValue::from_static("application/json"));
        header
    }

    async fn post_conversation(
        &self,
        request: &CreateConversationRequest,
        streamed: bool,
    ) -> Result<reqwest::Response> {
        let url = self.config.conversations_url();
        let timeout = (!streamed).then_some(self.config.request_timeout);
        let response = execute_request(
            &self.client,
            Method::POST,
            &url,
            &self.config.api_key,
            Some(request),
            timeout,
        )
        .await?;
        ensure_success(response).await
    }
}

#[async_trait]
impl DustClientTrait for DustClient {
    async fn create_conversation(
        &self,
        request: &CreateConversationRequest,
    ) -> Result<Conversation> {
        let response = self.post_conversation(request, false).await?;
        let envelope: ConversationEnvelope = response.json().await?;
        Ok(envelope.conversation)
    }

    async fn create_conversation_stream(
        &self,
        request: &CreateConversationRequest,
    ) -> Result<ByteStream> {
        let mut request = request.clone();
        if request.stream != Some(true) {
            warn!("Streamed creation requested without stream flag, forcing it on");
            request.stream = Some(true);
        }
        let response = self.post_conversation(&request, true).await?;
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(DustApiError::from));
        Ok(Box::pin(stream))
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        let url = self.config.conversation_url(conversation_id);
        let response = execute_request::<()>(
            &self.client,
            Method::GET,
            &url,
            &self.config.api_key,
            None,
            Some(self.config.request_timeout),
        )
        .await?;
        let response = ensure_success(response).await?;
        let envelope: ConversationEnvelope = response.json().await?;
        Ok(envelope.conversation)
    }

    fn conversation_web_url(&self, conversation_id: &str) -> String {
        self.config.conversation_web_url(conversation_id)
    }
}
