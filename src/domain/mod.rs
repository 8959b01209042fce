//! # Domain Layer
//!
//! The domain layer contains the core rules of marketplace messaging.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Messages, derived conversation models, profile hints
//! - **value_objects**: Immutable value types (PageRequest)
//! - **services**: Pure logic that spans entities (conversation view merging)

pub mod entities;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
