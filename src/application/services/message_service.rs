//! Message Service
//!
//! Sending, paging, read-marking and the conversation directory. Both the
//! WebSocket gateway and the HTTP handlers go through this service, so the
//! two paths share one set of rules.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::ChatSettings;
use crate::domain::{
    CounterpartyProfile, Message, MessageRepository, NewMessage, PageRequest, ProfileDirectory,
};
use crate::shared::error::AppError;

/// Message service trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Validate and store a message from `sender_id`.
    async fn send_message(
        &self,
        sender_id: i64,
        request: SendMessageDto,
    ) -> Result<Message, MessageError>;

    /// Fetch one page of the conversation with `counterparty_id`, then mark
    /// everything the counterparty sent to `user_id` as read.
    async fn conversation_history(
        &self,
        user_id: i64,
        counterparty_id: i64,
        page: PageRequest,
    ) -> Result<HistoryDto, MessageError>;

    /// Mark messages from `counterparty_id` to `reader_id` as read.
    async fn mark_read(&self, reader_id: i64, counterparty_id: i64) -> Result<u64, MessageError>;

    /// Conversation list for `user_id`, most recent first.
    async fn list_conversations(
        &self,
        user_id: i64,
    ) -> Result<Vec<ConversationSummaryDto>, MessageError>;

    /// Check that the message store is reachable.
    async fn health_check(&self) -> Result<(), MessageError>;
}

/// Send message request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageDto {
    pub content: String,
    pub recipient_id: i64,
    pub animal_id: Option<i64>,
}

/// One page of history plus the bookkeeping the HTTP layer reports.
#[derive(Debug, Clone)]
pub struct HistoryDto {
    /// Oldest first
    pub messages: Vec<Message>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub has_more: bool,
    /// Messages that flipped to read as a side effect of this fetch
    pub marked_read: u64,
}

/// Conversation list entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummaryDto {
    pub user_id: i64,
    pub profile: CounterpartyProfile,
    pub last_message_at: DateTime<Utc>,
    pub unread_count: i64,
}

/// Message service errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("{0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<AppError> for MessageError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => MessageError::Validation(msg),
            other => MessageError::Persistence(other.to_string()),
        }
    }
}

impl From<MessageError> for AppError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::Validation(msg) => AppError::Validation(msg),
            MessageError::Persistence(msg) => AppError::Internal(msg),
        }
    }
}

/// MessageService implementation
pub struct MessageServiceImpl {
    message_repo: Arc<dyn MessageRepository>,
    profile_directory: Arc<dyn ProfileDirectory>,
    settings: ChatSettings,
}

impl MessageServiceImpl {
    pub fn new(
        message_repo: Arc<dyn MessageRepository>,
        profile_directory: Arc<dyn ProfileDirectory>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            message_repo,
            profile_directory,
            settings,
        }
    }

    fn check_counterparty(user_id: i64, counterparty_id: i64) -> Result<(), MessageError> {
        if counterparty_id <= 0 {
            return Err(MessageError::Validation("Invalid user id".into()));
        }
        if counterparty_id == user_id {
            return Err(MessageError::Validation(
                "Cannot open a conversation with yourself".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageService for MessageServiceImpl {
    async fn send_message(
        &self,
        sender_id: i64,
        request: SendMessageDto,
    ) -> Result<Message, MessageError> {
        let new_message = NewMessage::new(
            sender_id,
            request.recipient_id,
            &request.content,
            request.animal_id,
        )?;

        if new_message.content_length() > self.settings.max_content_length {
            return Err(MessageError::Validation(format!(
                "Message content too long (max {} characters)",
                self.settings.max_content_length
            )));
        }

        let message = self.message_repo.create(&new_message).await?;

        tracing::debug!(
            message_id = message.id,
            sender_id = message.sender_id,
            recipient_id = message.recipient_id,
            "Message stored"
        );

        Ok(message)
    }

    async fn conversation_history(
        &self,
        user_id: i64,
        counterparty_id: i64,
        page: PageRequest,
    ) -> Result<HistoryDto, MessageError> {
        Self::check_counterparty(user_id, counterparty_id)?;

        let window = self.message_repo.page(user_id, counterparty_id, page).await?;
        let total = self
            .message_repo
            .count_conversation(user_id, counterparty_id)
            .await?;
        let marked_read = self.message_repo.mark_read(user_id, counterparty_id).await?;

        Ok(HistoryDto {
            messages: window.messages,
            page: page.page(),
            limit: page.page_size(),
            total,
            has_more: window.has_more,
            marked_read,
        })
    }

    async fn mark_read(&self, reader_id: i64, counterparty_id: i64) -> Result<u64, MessageError> {
        Self::check_counterparty(reader_id, counterparty_id)?;

        let updated = self.message_repo.mark_read(reader_id, counterparty_id).await?;
        if updated > 0 {
            tracing::debug!(reader_id, counterparty_id, updated, "Messages marked read");
        }
        Ok(updated)
    }

    async fn list_conversations(
        &self,
        user_id: i64,
    ) -> Result<Vec<ConversationSummaryDto>, MessageError> {
        let activity = self.message_repo.list_counterparties(user_id).await?;
        if activity.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = activity.iter().map(|a| a.counterparty_id).collect();
        let mut profiles = self.profile_directory.profiles(&ids).await?;

        Ok(activity
            .into_iter()
            .map(|a| ConversationSummaryDto {
                user_id: a.counterparty_id,
                profile: profiles.remove(&a.counterparty_id).unwrap_or_default(),
                last_message_at: a.last_message_at,
                unread_count: a.unread_count,
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), MessageError> {
        self.message_repo.health_check().await?;
        Ok(())
    }
}
