//! WebSocket Gateway
//!
//! Real-time delivery over WebSocket connections.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod registry;
pub mod session;

pub use gateway::Gateway;
pub use handler::ws_handler;
pub use messages::{ClientEvent, ServerEvent};
pub use registry::{ConnectionHandle, ConnectionRegistry};
pub use session::{Session, SessionState};
