//! Message Handlers
//!
//! Request/response access to conversations, usable without a live
//! WebSocket connection. Writes made here are pushed through the gateway the
//! same way real-time writes are.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::{
    ConversationResponse, HistoryQueryParams, HistoryResponse, MarkReadResponse, MessageResponse,
    SendMessageRequest,
};
use crate::application::services::SendMessageDto;
use crate::domain::PageRequest;
use crate::infrastructure::metrics;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn parse_user_id(raw: &str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::Validation("Invalid user id".into())),
    }
}

fn parse_number(raw: Option<&str>, name: &str, default: i64) -> Result<i64, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse::<i64>().map_err(|_| {
            AppError::Validation(format!("{} must be a positive integer", name))
        }),
    }
}

/// Resolve `page` and `limit`, clamping the limit to the configured maximum.
fn page_request(params: &HistoryQueryParams, state: &AppState) -> Result<PageRequest, AppError> {
    let chat = &state.settings.chat;
    let page = parse_number(params.page.as_deref(), "page", 1)?;
    let limit = parse_number(
        params.limit.as_deref(),
        "limit",
        i64::from(chat.default_page_size),
    )?;

    let limit = if limit > 0 {
        limit.min(i64::from(chat.max_page_size))
    } else {
        limit
    };
    PageRequest::new(page, limit)
}

/// Get one page of the conversation with a counterparty
///
/// Messages the counterparty sent to the caller are marked read as a side
/// effect; the counterparty is told over the gateway if it is connected.
pub async fn get_conversation_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(counterparty_id): Path<String>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<Json<HistoryResponse>, AppError> {
    let counterparty_id = parse_user_id(&counterparty_id)?;
    let page = page_request(&params, &state)?;

    let history = state
        .messages
        .conversation_history(auth.user_id, counterparty_id, page)
        .await?;

    if history.marked_read > 0 {
        state
            .gateway
            .notify_messages_read(counterparty_id, auth.user_id);
    }

    Ok(Json(HistoryResponse::from(history)))
}

/// List the caller's conversations, most recent first
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ConversationResponse>>, AppError> {
    let summaries = state.messages.list_conversations(auth.user_id).await?;

    let conversations = summaries
        .into_iter()
        .map(|summary| {
            let online = state.gateway.is_online(summary.user_id);
            ConversationResponse::from_summary(summary, online)
        })
        .collect();

    Ok(Json(conversations))
}

/// Send a message without a live connection
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let message = state
        .messages
        .send_message(
            auth.user_id,
            SendMessageDto {
                content: body.content,
                recipient_id: body.to_user_id,
                animal_id: body.animal_id,
            },
        )
        .await?;

    metrics::record_message_created("http");
    state.gateway.publish_message(&message);

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// Mark everything a counterparty sent to the caller as read
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(counterparty_id): Path<String>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let counterparty_id = parse_user_id(&counterparty_id)?;

    let updated = state.messages.mark_read(auth.user_id, counterparty_id).await?;
    if updated > 0 {
        state
            .gateway
            .notify_messages_read(counterparty_id, auth.user_id);
    }

    Ok(Json(MarkReadResponse { updated }))
}
