//! # Domain Services
//!
//! Logic that spans several entities without touching infrastructure.
//!
//! - **ConversationView**: merges paginated history with live pushes into one
//!   ordered, duplicate-free conversation

mod conversation_view;

pub use conversation_view::*;
