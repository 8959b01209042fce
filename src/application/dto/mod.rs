//! Data Transfer Objects
//!
//! DTOs for API request/response serialization. The same `MessageResponse`
//! shape is used on the HTTP API and on the WebSocket gateway.

pub mod request;
pub mod response;

pub use request::{HistoryQueryParams, SendMessageRequest};
pub use response::{
    ConversationResponse, HistoryResponse, MarkReadResponse, MessageResponse, PaginationResponse,
};
