//! Gateway Event Types
//!
//! JSON events exchanged over the WebSocket connection. Every frame is an
//! object with a `type` discriminator.

use serde::{Deserialize, Serialize};

use crate::application::dto::MessageResponse;

/// Sent when a frame cannot be parsed into a known event.
pub const INVALID_EVENT_FORMAT: &str = "Invalid event format";
/// Sent when `authenticate` carries a token the verifier rejects.
pub const INVALID_TOKEN: &str = "Invalid or expired token";
/// Generic text for store failures on send.
pub const SEND_FAILED: &str = "Failed to send message";
/// Generic text for store failures on read-marking.
pub const MARK_READ_FAILED: &str = "Failed to mark messages as read";

/// Client to server events
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Bind this connection to the user the token was issued for
    Authenticate { token: String },

    /// Store a message and push it to the recipient
    #[serde(rename_all = "camelCase")]
    SendMessage {
        content: String,
        to_user_id: i64,
        #[serde(default)]
        animal_id: Option<i64>,
        /// Opaque client id echoed on the matching confirmation or error
        #[serde(default)]
        client_message_id: Option<String>,
    },

    /// Mark everything `from_user_id` sent to this user as read
    #[serde(rename_all = "camelCase")]
    MarkAsRead { from_user_id: i64 },
}

/// Server to client events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    Authenticated { user_id: i64 },

    #[serde(rename_all = "camelCase")]
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_message_id: Option<String>,
    },

    /// Send confirmation for the connection that sent the message
    #[serde(rename_all = "camelCase")]
    MessageReceived {
        message: MessageResponse,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_message_id: Option<String>,
    },

    /// Push to the recipient
    NewMessage { message: MessageResponse },

    /// Push to the original sender once the recipient has read
    #[serde(rename_all = "camelCase")]
    MessagesRead { read_by: i64 },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
            client_message_id: None,
        }
    }

    pub fn error_for(message: impl Into<String>, client_message_id: Option<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
            client_message_id,
        }
    }

    /// Wire name, used as a metrics label.
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerEvent::Authenticated { .. } => "authenticated",
            ServerEvent::Error { .. } => "error",
            ServerEvent::MessageReceived { .. } => "messageReceived",
            ServerEvent::NewMessage { .. } => "newMessage",
            ServerEvent::MessagesRead { .. } => "messagesRead",
        }
    }
}
