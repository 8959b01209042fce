//! WebSocket Session Management

use uuid::Uuid;

use super::messages::ServerEvent;
use super::registry::{ConnectionHandle, EventSender};
use crate::application::services::AuthError;

/// Protocol state of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport open, no identity yet
    Connected,
    /// Identity bound and registered
    Authenticated { user_id: i64 },
    /// Terminal
    Closed,
}

/// Per-connection state owned by the connection's task
#[derive(Debug)]
pub struct Session {
    handle: ConnectionHandle,
    state: SessionState,
}

impl Session {
    pub fn new(connection_id: Uuid, sender: EventSender) -> Self {
        Self {
            handle: ConnectionHandle::new(connection_id, sender),
            state: SessionState::Connected,
        }
    }

    pub fn connection_id(&self) -> Uuid {
        self.handle.connection_id()
    }

    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn user_id(&self) -> Option<i64> {
        match self.state {
            SessionState::Authenticated { user_id } => Some(user_id),
            _ => None,
        }
    }

    /// The bound identity, for operations that require one.
    pub fn require_user(&self) -> Result<i64, AuthError> {
        self.user_id().ok_or(AuthError::NotAuthenticated)
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// Bind the session to `user_id`, returning the identity it replaced.
    pub fn bind(&mut self, user_id: i64) -> Option<i64> {
        let previous = self.user_id();
        self.state = SessionState::Authenticated { user_id };
        previous
    }

    /// Enter the terminal state, returning the identity that was bound.
    pub fn close(&mut self) -> Option<i64> {
        let bound = self.user_id();
        self.state = SessionState::Closed;
        bound
    }

    /// Queue an event for this connection's own client.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.handle.send(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_lifecycle() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut session = Session::new(Uuid::new_v4(), tx);
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(session.user_id(), None);
        assert_eq!(session.require_user(), Err(AuthError::NotAuthenticated));

        assert_eq!(session.bind(3), None);
        assert_eq!(session.require_user(), Ok(3));
        assert_eq!(session.bind(4), Some(3));
        assert_eq!(session.state(), SessionState::Authenticated { user_id: 4 });

        assert_eq!(session.close(), Some(4));
        assert!(session.is_closed());
        assert_eq!(session.require_user(), Err(AuthError::NotAuthenticated));
        assert_eq!(session.close(), None);
    }
}
