//! # Marketplace Chat Library
//!
//! Direct messaging between buyers and sellers of a pet marketplace:
//! - WebSocket gateway for real-time delivery and read receipts
//! - HTTP API for history, the conversation list and fallback sends
//! - PostgreSQL for persistent storage
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Messages, pagination, the conversation view and repository traits
//! - **Application Layer**: Message service, token verification and DTOs
//! - **Infrastructure Layer**: PostgreSQL and in-memory repositories, metrics
//! - **Presentation Layer**: HTTP handlers, middleware and the WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! marketplace_chat/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects, traits and pure services
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Repositories, database and metrics
//! +-- presentation/   HTTP routes and WebSocket gateway
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
