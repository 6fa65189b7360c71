use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures_util::StreamExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::event_parser::{FinishedStream, StreamAggregator};
use super::{
    creation_failure, ResolutionOutcome, ResolutionRequest, ResolveError, Resolver, ResolverKind,
};
use crate::config::StreamSettings;
use crate::services::initiator::ConversationInitiator;

/// Creates the conversation with streamed delivery and folds the event feed
/// into one message. The read is bounded by [`StreamSettings::deadline`].
pub struct StreamResolver {
    initiator: ConversationInitiator,
    settings: StreamSettings,
}

impl StreamResolver {
    pub fn new(initiator: ConversationInitiator, settings: StreamSettings) -> Self {
        Self {
            initiator,
            settings,
        }
    }

    fn finish(&self, aggregator: StreamAggregator) -> ResolutionOutcome {
        log::info!(
            "Stream closed after {} event(s), conversation {:?}",
            aggregator.events_seen(),
            aggregator.conversation_id()
        );
        match aggregator.finish() {
            FinishedStream::Message {
                conversation,
                message,
            } => {
                log::info!(
                    "Agent reply assembled ({} chars)",
                    message.content.chars().count()
                );
                ResolutionOutcome::Success {
                    conversation,
                    message,
                }
            }
            FinishedStream::Empty { conversation_id } => {
                log::error!("Stream ended without agent content");
                ResolutionOutcome::NoContent { conversation_id }
            }
        }
    }

    fn expired(&self, aggregator: &StreamAggregator) -> ResolutionOutcome {
        let conversation_id = aggregator.conversation_id().map(str::to_string);
        log::error!(
            "Stream deadline of {:?} exceeded, conversation {:?}",
            self.settings.deadline,
            conversation_id
        );
        let conversation_url = conversation_id
            .as_deref()
            .map(|id| self.initiator.conversation_web_url(id));
        ResolutionOutcome::Timeout {
            conversation_id,
            attempts: 1,
            conversation_url,
        }
    }
}

#[async_trait]
impl Resolver for StreamResolver {
    fn kind(&self) -> ResolverKind {
        ResolverKind::Stream
    }

    async fn resolve(
        &self,
        request: &ResolutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ResolutionOutcome, ResolveError> {
        let deadline = Instant::now() + self.settings.deadline;
        let mut aggregator = StreamAggregator::new();

        let opened = tokio::select! {
            _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
            opened = tokio::time::timeout_at(deadline, self.initiator.open_stream(request)) => opened,
        };
        let stream = match opened {
            Err(_elapsed) => return Ok(self.expired(&aggregator)),
            Ok(Err(e)) => return creation_failure(e),
            Ok(Ok(stream)) => stream,
        };

        let mut events = stream.eventsource();
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
                next = tokio::time::timeout_at(deadline, events.next()) => next,
            };
            match next {
                Err(_elapsed) => return Ok(self.expired(&aggregator)),
                Ok(None) => break,
                Ok(Some(Ok(event))) => aggregator.apply_data(&event.data),
                Ok(Some(Err(EventStreamError::Transport(e)))) => {
                    log::error!("Stream read failed: {}", e);
                    return Err(ResolveError::Upstream(e));
                }
                Ok(Some(Err(e))) => {
                    log::error!("Stream decoding failed: {}", e);
                    return Err(ResolveError::MalformedStream(e.to_string()));
                }
            }
        }

        Ok(self.finish(aggregator))
    }
}
