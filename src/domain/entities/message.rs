//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::conversation::{ConversationPage, CounterpartyActivity};
use crate::domain::value_objects::PageRequest;
use crate::shared::error::AppError;

/// A single directed message between two users.
///
/// Maps to the `messages` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - sender_id: BIGINT NOT NULL
/// - recipient_id: BIGINT NOT NULL, CHECK (sender_id <> recipient_id)
/// - animal_id: BIGINT NULL -- listing the conversation started from
/// - content: TEXT NOT NULL
/// - is_read: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
///
/// Everything except `is_read` is immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Store-assigned identity, increasing in insertion order
    pub id: i64,

    pub sender_id: i64,

    pub recipient_id: i64,

    /// Listing the message refers to, if any
    pub animal_id: Option<i64>,

    pub content: String,

    pub is_read: bool,

    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether this message belongs to the conversation between `a` and `b`.
    pub fn is_between(&self, a: i64, b: i64) -> bool {
        (self.sender_id == a && self.recipient_id == b)
            || (self.sender_id == b && self.recipient_id == a)
    }

    /// The other participant, seen from `user_id`.
    pub fn counterparty_of(&self, user_id: i64) -> Option<i64> {
        if self.sender_id == user_id {
            Some(self.recipient_id)
        } else if self.recipient_id == user_id {
            Some(self.sender_id)
        } else {
            None
        }
    }

    /// Sort key used everywhere a conversation is ordered.
    pub fn order_key(&self) -> (DateTime<Utc>, i64) {
        (self.created_at, self.id)
    }
}

/// A validated message that has not been stored yet.
///
/// Construction enforces the invariants every stored message carries, so a
/// repository never sees self-addressed or blank messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    sender_id: i64,
    recipient_id: i64,
    animal_id: Option<i64>,
    content: String,
}

impl NewMessage {
    /// Validate and build a new message. Content is stored trimmed.
    pub fn new(
        sender_id: i64,
        recipient_id: i64,
        content: &str,
        animal_id: Option<i64>,
    ) -> Result<Self, AppError> {
        if sender_id <= 0 || recipient_id <= 0 {
            return Err(AppError::Validation("Invalid user id".into()));
        }
        if sender_id == recipient_id {
            return Err(AppError::Validation(
                "Cannot send a message to yourself".into(),
            ));
        }
        if matches!(animal_id, Some(id) if id <= 0) {
            return Err(AppError::Validation("Invalid animal id".into()));
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Message content cannot be empty".into()));
        }

        Ok(Self {
            sender_id,
            recipient_id,
            animal_id,
            content: content.to_string(),
        })
    }

    pub fn sender_id(&self) -> i64 {
        self.sender_id
    }

    pub fn recipient_id(&self) -> i64 {
        self.recipient_id
    }

    pub fn animal_id(&self) -> Option<i64> {
        self.animal_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Content length in characters.
    pub fn content_length(&self) -> usize {
        self.content.chars().count()
    }

    /// Attach store-assigned identity and time.
    pub fn into_message(self, id: i64, created_at: DateTime<Utc>) -> Message {
        Message {
            id,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            animal_id: self.animal_id,
            content: self.content,
            is_read: false,
            created_at,
        }
    }
}

/// Repository trait for message persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message, assigning its id and creation time.
    async fn create(&self, message: &NewMessage) -> Result<Message, AppError>;

    /// Fetch the `page`-th most recent window of the conversation between
    /// `user_a` and `user_b`, returned oldest first.
    async fn page(
        &self,
        user_a: i64,
        user_b: i64,
        page: PageRequest,
    ) -> Result<ConversationPage, AppError>;

    /// Total number of messages exchanged between two users.
    async fn count_conversation(&self, user_a: i64, user_b: i64) -> Result<i64, AppError>;

    /// Mark every unread message from `sender` to `recipient` as read.
    ///
    /// Returns the number of messages that changed state.
    async fn mark_read(&self, recipient: i64, sender: i64) -> Result<u64, AppError>;

    /// Everyone `user_id` has exchanged messages with, most recent first.
    async fn list_counterparties(&self, user_id: i64)
        -> Result<Vec<CounterpartyActivity>, AppError>;

    /// Round-trip to the backing store.
    async fn health_check(&self) -> Result<(), AppError>;
}
