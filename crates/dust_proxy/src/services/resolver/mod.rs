//! Response resolution: turning a possibly delayed, possibly streamed assistant
//! reply into a single outcome.
//!
//! Both strategies implement [`Resolver`]; the handler picks one per request and
//! hands the [`ResolutionOutcome`] to the normalizer.

pub mod event_parser;
pub mod poll;
pub mod stream;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use dust_client::{AgentMessage, Conversation, DustApiError, DustClientTrait};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::ProxyConfig;
use crate::services::initiator::ConversationInitiator;

pub use poll::PollResolver;
pub use stream::StreamResolver;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    #[default]
    Poll,
    Stream,
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverKind::Poll => f.write_str("poll"),
            ResolverKind::Stream => f.write_str("stream"),
        }
    }
}

impl FromStr for ResolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poll" => Ok(ResolverKind::Poll),
            "stream" => Ok(ResolverKind::Stream),
            other => Err(format!("unknown resolver '{other}', expected 'poll' or 'stream'")),
        }
    }
}

/// Validated caller input for one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub prompt: String,
    pub assistant_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHandle {
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Success {
        conversation: Conversation,
        message: AgentMessage,
    },
    Timeout {
        conversation_id: Option<String>,
        attempts: u32,
        conversation_url: Option<String>,
    },
    UpstreamError {
        status: u16,
        body: String,
    },
    NoContent {
        conversation_id: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resolution cancelled")]
    Cancelled,

    #[error(transparent)]
    Upstream(#[from] DustApiError),

    /// The event feed could not be decoded.
    #[error("malformed event stream: {0}")]
    MalformedStream(String),
}

#[async_trait]
pub trait Resolver: Send + Sync {
    fn kind(&self) -> ResolverKind;

    async fn resolve(
        &self,
        request: &ResolutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ResolutionOutcome, ResolveError>;
}

/// A failed creation call ends the resolution: a status is passed through,
/// anything else is an internal failure.
fn creation_failure(err: DustApiError) -> Result<ResolutionOutcome, ResolveError> {
    match err {
        DustApiError::Status { status, body } => {
            Ok(ResolutionOutcome::UpstreamError { status, body })
        }
        other => Err(ResolveError::Upstream(other)),
    }
}

pub fn build_resolver(
    kind: ResolverKind,
    client: Arc<dyn DustClientTrait>,
    config: &ProxyConfig,
) -> Box<dyn Resolver> {
    let initiator = ConversationInitiator::new(client.clone(), config.message_context.clone());
    match kind {
        ResolverKind::Poll => Box::new(PollResolver::new(initiator, client, config.poll)),
        ResolverKind::Stream => Box::new(StreamResolver::new(initiator, config.stream)),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_kind_parses_case_insensitively() {
        assert_eq!("Poll".parse::<ResolverKind>(), Ok(ResolverKind::Poll));
        assert_eq!(" stream ".parse::<ResolverKind>(), Ok(ResolverKind::Stream));
        assert!("webhook".parse::<ResolverKind>().is_err());
    }

    #[test]
    fn test_creation_status_becomes_upstream_outcome() {
        let outcome = creation_failure(DustApiError::Status {
            status: 503,
            body: "down".to_string(),
        })
        .unwrap();
        assert_eq!(
            outcome,
            ResolutionOutcome::UpstreamError {
                status: 503,
                body: "down".to_string()
            }
        );
    }

    #[test]
    fn test_creation_decode_failure_is_internal() {
        let result = creation_failure(DustApiError::InvalidResponse("no sId".to_string()));
        assert!(matches!(result, Err(ResolveError::Upstream(_))));
    }

    #[test]
    fn test_build_resolver_honours_kind() {
        let client: Arc<dyn DustClientTrait> = Arc::new(test_support::FakeDustClient::default());
        let config = ProxyConfig::default();
        assert_eq!(
            build_resolver(ResolverKind::Poll, client.clone(), &config).kind(),
            ResolverKind::Poll
        );
        assert_eq!(
            build_resolver(ResolverKind::Stream, client, &config).kind(),
            ResolverKind::Stream
        );
    }
}
