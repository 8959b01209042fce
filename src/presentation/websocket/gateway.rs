//! WebSocket Gateway
//!
//! The per-connection protocol state machine and the push paths shared with
//! the HTTP handlers. Transport handling lives in `handler`; everything here
//! works on a [`Session`] and its outgoing queue, so it runs the same with a
//! real socket or a bare channel.

use std::sync::Arc;

use uuid::Uuid;

use super::messages::{
    ClientEvent, ServerEvent, INVALID_EVENT_FORMAT, INVALID_TOKEN, MARK_READ_FAILED, SEND_FAILED,
};
use super::registry::{ConnectionRegistry, EventSender};
use super::session::Session;
use crate::application::services::{MessageError, MessageService, SendMessageDto, TokenVerifier};
use crate::domain::Message;
use crate::infrastructure::metrics;

/// WebSocket gateway routing events between connections
pub struct Gateway {
    registry: Arc<ConnectionRegistry>,
    messages: Arc<dyn MessageService>,
    tokens: Arc<dyn TokenVerifier>,
}

impl Gateway {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        messages: Arc<dyn MessageService>,
        tokens: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            registry,
            messages,
            tokens,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Whether `user_id` currently has a live connection
    pub fn is_online(&self, user_id: i64) -> bool {
        self.registry.is_online(user_id)
    }

    /// Number of authenticated connections
    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    /// Start a session for a freshly opened transport.
    pub fn open_session(&self, sender: EventSender) -> Session {
        metrics::track_connection("connected", 1);
        Session::new(Uuid::new_v4(), sender)
    }

    /// Process one inbound text frame.
    pub async fn handle_text(&self, session: &mut Session, text: &str) {
        if session.is_closed() {
            return;
        }

        let event = match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(
                    connection_id = %session.connection_id(),
                    error = %e,
                    "Invalid event format"
                );
                session.send(ServerEvent::error(INVALID_EVENT_FORMAT));
                return;
            }
        };

        match event {
            ClientEvent::Authenticate { token } => self.authenticate(session, &token).await,
            ClientEvent::SendMessage {
                content,
                to_user_id,
                animal_id,
                client_message_id,
            } => {
                let request = SendMessageDto {
                    content,
                    recipient_id: to_user_id,
                    animal_id,
                };
                self.send_message(session, request, client_message_id).await
            }
            ClientEvent::MarkAsRead { from_user_id } => {
                self.mark_as_read(session, from_user_id).await
            }
        }
    }

    async fn authenticate(&self, session: &mut Session, token: &str) {
        let user_id = match self.tokens.verify_token(token).await {
            Ok(user_id) => user_id,
            Err(e) => {
                tracing::debug!(
                    connection_id = %session.connection_id(),
                    error = %e,
                    "Authentication failed"
                );
                session.send(ServerEvent::error(INVALID_TOKEN));
                return;
            }
        };

        match session.bind(user_id) {
            None => metrics::track_connection("authenticated", 1),
            Some(previous) if previous != user_id => {
                self.registry
                    .unregister_connection(previous, session.connection_id());
            }
            Some(_) => {}
        }
        self.registry.register(user_id, session.handle().clone());

        tracing::info!(
            user_id,
            connection_id = %session.connection_id(),
            "Connection authenticated"
        );
        session.send(ServerEvent::Authenticated { user_id });
    }

    async fn send_message(
        &self,
        session: &mut Session,
        request: SendMessageDto,
        client_message_id: Option<String>,
    ) {
        let sender_id = match session.require_user() {
            Ok(user_id) => user_id,
            Err(e) => {
                session.send(ServerEvent::error_for(e.to_string(), client_message_id));
                return;
            }
        };

        let message = match self.messages.send_message(sender_id, request).await {
            Ok(message) => message,
            Err(MessageError::Validation(reason)) => {
                session.send(ServerEvent::error_for(reason, client_message_id));
                return;
            }
            Err(MessageError::Persistence(e)) => {
                tracing::error!(sender_id, error = %e, "Failed to store message");
                session.send(ServerEvent::error_for(SEND_FAILED, client_message_id));
                return;
            }
        };

        metrics::record_message_created("realtime");

        // Sender first, so it never sees its own message later than the recipient.
        session.send(ServerEvent::MessageReceived {
            message: message.clone().into(),
            client_message_id,
        });
        self.notify_new_message(&message);
    }

    async fn mark_as_read(&self, session: &mut Session, counterparty_id: i64) {
        let reader_id = match session.require_user() {
            Ok(user_id) => user_id,
            Err(e) => {
                session.send(ServerEvent::error(e.to_string()));
                return;
            }
        };

        match self.messages.mark_read(reader_id, counterparty_id).await {
            Ok(0) => {}
            Ok(_) => {
                self.notify_messages_read(counterparty_id, reader_id);
            }
            Err(MessageError::Validation(reason)) => {
                session.send(ServerEvent::error(reason));
            }
            Err(MessageError::Persistence(e)) => {
                tracing::error!(reader_id, counterparty_id, error = %e, "Failed to mark read");
                session.send(ServerEvent::error(MARK_READ_FAILED));
            }
        }
    }

    /// Run the close transition. Safe to call more than once.
    pub fn disconnect(&self, session: &mut Session) {
        if session.is_closed() {
            return;
        }

        metrics::track_connection("connected", -1);
        if let Some(user_id) = session.close() {
            metrics::track_connection("authenticated", -1);
            let released = self
                .registry
                .unregister_connection(user_id, session.connection_id());
            tracing::info!(
                user_id,
                connection_id = %session.connection_id(),
                released,
                "Connection closed"
            );
        } else {
            tracing::debug!(connection_id = %session.connection_id(), "Anonymous connection closed");
        }
    }

    /// Push `newMessage` to the recipient if live.
    pub fn notify_new_message(&self, message: &Message) -> bool {
        self.push(
            message.recipient_id,
            ServerEvent::NewMessage {
                message: message.clone().into(),
            },
        )
    }

    /// Confirm a message written outside the gateway to its sender's live
    /// connection, then push it to the recipient.
    pub fn publish_message(&self, message: &Message) {
        self.push(
            message.sender_id,
            ServerEvent::MessageReceived {
                message: message.clone().into(),
                client_message_id: None,
            },
        );
        self.notify_new_message(message);
    }

    /// Tell `sender_id` that `read_by` has read their messages.
    pub fn notify_messages_read(&self, sender_id: i64, read_by: i64) -> bool {
        self.push(sender_id, ServerEvent::MessagesRead { read_by })
    }

    fn push(&self, user_id: i64, event: ServerEvent) -> bool {
        let name = event.event_name();
        let delivered = match self.registry.lookup(user_id) {
            Some(handle) => handle.send(event),
            None => false,
        };

        metrics::record_push(name, delivered);
        if !delivered {
            tracing::trace!(user_id, event = name, "Recipient offline, push skipped");
        }
        delivered
    }
}
