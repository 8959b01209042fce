//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use validator::Validate;

/// Send message request (`POST /messages`)
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Upper bound is `chat.max_content_length`, checked after trimming
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[validate(range(min = 1, message = "Invalid recipient"))]
    pub to_user_id: i64,

    #[validate(range(min = 1, message = "Invalid animal id"))]
    pub animal_id: Option<i64>,
}

/// Conversation history query parameters.
///
/// Kept as strings so that malformed numbers produce our own validation
/// error rather than the extractor's rejection.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQueryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}
