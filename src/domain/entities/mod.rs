//! # Domain Entities
//!
//! Core domain entities of the marketplace messaging core.
//!
//! - **Message**: a directed message between two users, optionally about a listing
//! - **Conversation** (derived): pages and counterparty activity computed from messages
//! - **CounterpartyProfile**: display hints owned by the catalog side
//!
//! ## Repository Traits
//!
//! Data access is expressed as traits here and implemented in the
//! infrastructure layer.

mod conversation;
mod message;
mod profile;

pub use conversation::{ConversationPage, CounterpartyActivity};
pub use message::{Message, MessageRepository, NewMessage};
pub use profile::{CounterpartyProfile, ProfileDirectory};

#[cfg(test)]
pub use message::MockMessageRepository;
