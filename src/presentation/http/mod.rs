//! HTTP API
//!
//! Routes and handlers for the request/response side of the service.

pub mod handlers;
pub mod routes;

pub use routes::create_router;
