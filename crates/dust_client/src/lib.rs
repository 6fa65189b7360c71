pub mod api;
pub mod client_trait;
pub mod config;
pub mod error;
pub mod masking;
pub mod utils;

pub use api::client::DustClient;
pub use api::models::{
    AgentMessage, Conversation, ConversationEvent, CreateConversationRequest, EventMessage,
    MessageContext, MessagePayload,
};
pub use client_trait::{ByteStream, DustClientTrait};
pub use config::DustConfig;
pub use error::{ConfigError, DustApiError};
pub use masking::mask_secret;
