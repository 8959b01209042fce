//! Response DTOs
//!
//! Data structures for API response bodies and gateway payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::{ConversationSummaryDto, HistoryDto};
use crate::domain::Message;

/// Message wire shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: i64,
    pub content: String,
    pub from_user_id: i64,
    pub to_user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            content: message.content,
            from_user_id: message.sender_id,
            to_user_id: message.recipient_id,
            animal_id: message.animal_id,
            created_at: message.created_at,
            is_read: message.is_read,
        }
    }
}

/// Pagination block of a history response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub has_more: bool,
}

/// `GET /conversation-history/{counterpartyId}` response
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Oldest first within the page
    pub messages: Vec<MessageResponse>,
    pub pagination: PaginationResponse,
}

impl From<HistoryDto> for HistoryResponse {
    fn from(dto: HistoryDto) -> Self {
        Self {
            messages: dto.messages.into_iter().map(MessageResponse::from).collect(),
            pagination: PaginationResponse {
                page: dto.page,
                limit: dto.limit,
                total: dto.total,
                has_more: dto.has_more,
            },
        }
    }
}

/// Conversation list entry
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub user_id: i64,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub has_active_listings: bool,
    pub last_message_at: DateTime<Utc>,
    pub unread_count: i64,
    /// Whether the counterparty has a live gateway connection right now
    pub is_online: bool,
}

impl ConversationResponse {
    pub fn from_summary(summary: ConversationSummaryDto, is_online: bool) -> Self {
        Self {
            user_id: summary.user_id,
            display_name: summary.profile.display_name,
            avatar_url: summary.profile.avatar_url,
            has_active_listings: summary.profile.has_active_listings,
            last_message_at: summary.last_message_at,
            unread_count: summary.unread_count,
            is_online,
        }
    }
}

/// Result of an explicit mark-as-read request
#[derive(Debug, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}
