//! Repository Implementations
//!
//! Implementations of the domain repository traits.
//!
//! - **PgMessageRepository** - durable message store on PostgreSQL
//! - **PgProfileDirectory** - display hints from the users/animals tables
//! - **InMemoryMessageRepository** / **InMemoryProfileDirectory** - process-local
//!   stand-ins for tests and database-less runs
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use marketplace_chat::infrastructure::repositories::{PgMessageRepository, PgProfileDirectory};
//!
//! fn setup_repositories(pool: PgPool) {
//!     let messages = PgMessageRepository::new(pool.clone());
//!     let profiles = PgProfileDirectory::new(pool);
//! }
//! ```

pub mod memory_repository;
pub mod message_repository;
pub mod profile_repository;

pub use memory_repository::{InMemoryMessageRepository, InMemoryProfileDirectory};
pub use message_repository::PgMessageRepository;
pub use profile_repository::PgProfileDirectory;
