//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **MessageService**: send, page, mark read, conversation directory
//! - **TokenVerifier**: bearer token to user id resolution

pub mod auth_service;
pub mod message_service;

// Re-export auth service types
pub use auth_service::{AuthError, Claims, JwtTokenVerifier, TokenVerifier};

// Re-export message service types
pub use message_service::{
    ConversationSummaryDto, HistoryDto, MessageError, MessageService, MessageServiceImpl,
    SendMessageDto,
};

#[cfg(test)]
pub use auth_service::MockTokenVerifier;
#[cfg(test)]
pub use message_service::MockMessageService;
