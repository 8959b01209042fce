//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! - **PageRequest**: validated newest-first page window over a conversation

mod page_request;

pub use page_request::*;
