//! Conversation read models.
//!
//! Conversations are not stored; they are derived from the `messages` table
//! as the set of messages between an unordered pair of users.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::message::Message;

/// One page of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPage {
    /// Messages in the window, oldest first
    pub messages: Vec<Message>,

    /// True when older messages exist beyond this window
    pub has_more: bool,
}

/// A counterparty as seen from the messages table alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterpartyActivity {
    pub counterparty_id: i64,

    /// Time of the most recent message in either direction
    pub last_message_at: DateTime<Utc>,

    /// Messages from the counterparty the user has not read yet
    pub unread_count: i64,
}
