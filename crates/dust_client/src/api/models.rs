//! Wire types for the Dust assistant conversation API.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};

pub const AGENT_MESSAGE_TYPE: &str = "agent_message";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContext {
    pub timezone: String,
    pub username: String,
}

impl Default for MessageContext {
    fn default() -> Self {
        Self {
            timezone: "Europe/Paris".to_string(),
            username: "Figma Plugin User".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    #[serde(rename = "configurationId")]
    pub configuration_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    pub content: String,
    #[serde(default)]
    pub mentions: Vec<Mention>,
    pub context: MessageContext,
}

/// Body of `POST /w/{workspace}/assistant/conversations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    pub message: MessagePayload,
    #[serde(rename = "assistantId")]
    pub assistant_id: String,
    pub blocking: bool,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationEnvelope {
    pub conversation: Conversation,
}

/// A conversation snapshot. Fields other than `sId` and `content` are kept
/// verbatim so they can be echoed back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "sId", default, skip_serializing_if = "Option::is_none")]
    pub s_id: Option<String>,
    /// Message groups, in chronological order.
    #[serde(default)]
    pub content: Vec<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Conversation {
    pub fn messages(&self) -> impl Iterator<Item = &Value> {
        self.content.iter().flatten()
    }

    /// Agent replies with non-empty content, oldest first.
    pub fn agent_messages(&self) -> Vec<AgentMessage> {
        self.messages()
            .filter_map(AgentMessage::from_conversation_entry)
            .collect()
    }

    pub fn last_agent_message(&self) -> Option<AgentMessage> {
        self.agent_messages().pop()
    }

    /// Replace the whole history with a single group holding `message`.
    pub fn with_single_message(mut self, message: &AgentMessage) -> Self {
        self.content = vec![vec![message.entry().clone()]];
        self
    }
}

/// An agent reply. The entry is kept exactly as Dust sent it so it can be
/// echoed back without losing or rewriting fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentMessage {
    /// `sId`, empty when the entry has none.
    pub id: String,
    pub content: String,
    entry: Value,
}

impl AgentMessage {
    /// A reply assembled locally, shaped like a conversation entry.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        let id = id.into();
        let content = content.into();
        let entry = json!({
            "sId": id,
            "type": AGENT_MESSAGE_TYPE,
            "content": content,
            "visibility": "visible",
        });
        Self { id, content, entry }
    }

    /// Keep a raw conversation entry only when it is an agent reply that
    /// already has content. Other fields are not inspected.
    pub fn from_conversation_entry(entry: &Value) -> Option<Self> {
        if entry.get("type").and_then(Value::as_str) != Some(AGENT_MESSAGE_TYPE) {
            return None;
        }
        let content = entry
            .get("content")
            .and_then(Value::as_str)
            .filter(|content| !content.is_empty())?;
        let id = entry
            .get("sId")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some(Self {
            id: id.to_string(),
            content: content.to_string(),
            entry: entry.clone(),
        })
    }

    pub fn entry(&self) -> &Value {
        &self.entry
    }

    pub fn visibility(&self) -> Option<&str> {
        self.entry.get("visibility").and_then(Value::as_str)
    }
}

impl Serialize for AgentMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entry.serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "sId", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// One record of the streamed conversation feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    UserMessageNew {
        #[serde(default)]
        conversation: Option<Conversation>,
        #[serde(rename = "conversationId", default)]
        conversation_id: Option<String>,
    },
    AgentMessageNew {
        #[serde(default)]
        message: Option<EventMessage>,
    },
    AgentMessageSuccess {
        #[serde(default)]
        message: Option<EventMessage>,
    },
    #[serde(other)]
    Other,
}

impl ConversationEvent {
    /// Parse an event payload. Payloads wrapped as `{"eventId": .., "data": {..}}`
    /// are unwrapped first.
    pub fn from_payload(payload: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(payload)?;
        let value = match value {
            Value::Object(mut object) if !object.contains_key("type") => {
                match object.remove("data") {
                    Some(inner @ Value::Object(_)) => inner,
                    Some(other) => {
                        object.insert("data".to_string(), other);
                        Value::Object(object)
                    }
                    None => Value::Object(object),
                }
            }
            other => other,
        };
        serde_json::from_value(value)
    }
}
