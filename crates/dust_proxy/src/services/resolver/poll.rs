use std::sync::Arc;

use async_trait::async_trait;
use dust_client::DustClientTrait;
use tokio_util::sync::CancellationToken;

use super::{
    creation_failure, ResolutionOutcome, ResolutionRequest, ResolveError, Resolver, ResolverKind,
};
use crate::config::PollSettings;
use crate::services::initiator::ConversationInitiator;

/// Re-fetches the conversation at a fixed interval until an agent reply shows
/// up or the attempt budget runs out.
pub struct PollResolver {
    initiator: ConversationInitiator,
    client: Arc<dyn DustClientTrait>,
    settings: PollSettings,
}

impl PollResolver {
    pub fn new(
        initiator: ConversationInitiator,
        client: Arc<dyn DustClientTrait>,
        settings: PollSettings,
    ) -> Self {
        Self {
            initiator,
            client,
            settings,
        }
    }
}

#[async_trait]
impl Resolver for PollResolver {
    fn kind(&self) -> ResolverKind {
        ResolverKind::Poll
    }

    async fn resolve(
        &self,
        request: &ResolutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ResolutionOutcome, ResolveError> {
        let handle = tokio::select! {
            _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
            started = self.initiator.start(request) => match started {
                Ok(handle) => handle,
                Err(e) => return creation_failure(e),
            },
        };
        let conversation_id = handle.conversation_id;
        let max_attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            log::info!(
                "[{}] Polling attempt {}/{}",
                conversation_id,
                attempt,
                max_attempts
            );

            tokio::select! {
                _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
                _ = tokio::time::sleep(self.settings.interval) => {}
            }

            let fetched = tokio::select! {
                _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
                fetched = self.client.get_conversation(&conversation_id) => fetched,
            };

            let conversation = match fetched {
                Ok(conversation) => conversation,
                Err(e) => {
                    log::warn!(
                        "[{}] Fetch failed on attempt {}: {}",
                        conversation_id,
                        attempt,
                        e
                    );
                    continue;
                }
            };

            let mut agent_messages = conversation.agent_messages();
            log::info!(
                "[{}] Attempt {}: {} agent message(s)",
                conversation_id,
                attempt,
                agent_messages.len()
            );

            if let Some(message) = agent_messages.pop() {
                log::info!(
                    "[{}] Agent reply found ({} chars)",
                    conversation_id,
                    message.content.chars().count()
                );
                return Ok(ResolutionOutcome::Success {
                    conversation,
                    message,
                });
            }
        }

        log::error!(
            "[{}] No agent reply after {} attempts ({:?})",
            conversation_id,
            max_attempts,
            self.settings.max_wait()
        );
        let conversation_url = self.initiator.conversation_web_url(&conversation_id);
        Ok(ResolutionOutcome::Timeout {
            conversation_id: Some(conversation_id),
            attempts: max_attempts,
            conversation_url: Some(conversation_url),
        })
    }
}
