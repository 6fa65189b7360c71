//! Aggregation of the streamed conversation feed.
//!
//! SSE framing is handled by `eventsource-stream`; each event's `data` holds one
//! JSON record per line. A record that fails to parse is skipped so a single
//! corrupt line never fails the resolution.

use dust_client::{AgentMessage, Conversation, ConversationEvent};
use uuid::Uuid;

/// Parse one record. Returns `None` for blank, `[DONE]` and malformed records.
pub fn parse_record(record: &str) -> Option<ConversationEvent> {
    let payload = record.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }
    match ConversationEvent::from_payload(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            log::debug!("Skipping malformed stream record: {} ({})", e, payload);
            None
        }
    }
}

/// Folds stream events into the final agent message.
///
/// `agent_message_new` content is appended as a delta; `agent_message_success`
/// content replaces everything accumulated so far.
#[derive(Debug, Default)]
pub struct StreamAggregator {
    conversation: Option<Conversation>,
    conversation_id: Option<String>,
    content: String,
    message_id: Option<String>,
    events: usize,
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the `data` of one SSE event, record by record.
    pub fn apply_data(&mut self, data: &str) {
        for record in data.split('\n') {
            if let Some(event) = parse_record(record) {
                self.apply(event);
            }
        }
    }

    pub fn apply(&mut self, event: ConversationEvent) {
        self.events += 1;
        match event {
            ConversationEvent::UserMessageNew {
                conversation,
                conversation_id,
            } => {
                if let Some(id) = conversation
                    .as_ref()
                    .and_then(|c| c.s_id.clone())
                    .or(conversation_id)
                {
                    self.conversation_id = Some(id);
                }
                if conversation.is_some() {
                    self.conversation = conversation;
                }
            }
            ConversationEvent::AgentMessageNew { message } => {
                let Some(message) = message else { return };
                match message.content {
                    Some(delta) if !delta.is_empty() => {
                        self.content.push_str(&delta);
                        if message.id.is_some() {
                            self.message_id = message.id;
                        }
                    }
                    _ => {}
                }
            }
            ConversationEvent::AgentMessageSuccess { message } => {
                let Some(message) = message else { return };
                if let Some(content) = message.content {
                    self.content = content;
                    if message.id.is_some() {
                        self.message_id = message.id;
                    }
                }
            }
            ConversationEvent::Other => {}
        }
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn events_seen(&self) -> usize {
        self.events
    }

    /// Final message, or [`FinishedStream::Empty`] when no agent content arrived.
    pub fn finish(self) -> FinishedStream {
        if self.content.is_empty() {
            return FinishedStream::Empty {
                conversation_id: self.conversation_id,
            };
        }
        let id = self
            .message_id
            .unwrap_or_else(|| format!("stream-{}", Uuid::new_v4()));
        let mut conversation = self.conversation.unwrap_or_default();
        if conversation.s_id.is_none() {
            conversation.s_id = self.conversation_id;
        }
        FinishedStream::Message {
            conversation,
            message: AgentMessage::new(id, self.content),
        }
    }
}

#[derive(Debug)]
pub enum FinishedStream {
    Message {
        conversation: Conversation,
        message: AgentMessage,
    },
    Empty {
        conversation_id: Option<String>,
    },
}
