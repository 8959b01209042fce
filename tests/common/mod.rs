//! Common Test Utilities
//!
//! Builds the real router over in-memory repositories and issues tokens the
//! server accepts.

use std::sync::Arc;

use axum_test::TestServer;
use chrono::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use marketplace_chat::application::services::JwtTokenVerifier;
use marketplace_chat::config::{
    ChatSettings, CorsSettings, DatabaseSettings, JwtSettings, ServerSettings, Settings,
    WebSocketSettings,
};
use marketplace_chat::domain::{Message, MessageRepository, NewMessage};
use marketplace_chat::infrastructure::repositories::{
    InMemoryMessageRepository, InMemoryProfileDirectory,
};
use marketplace_chat::presentation::http::create_router;
use marketplace_chat::presentation::websocket::{ServerEvent, Session};
use marketplace_chat::startup::AppState;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "postgres://unused".into(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout: 1,
            run_migrations: false,
        },
        jwt: JwtSettings {
            secret: TEST_JWT_SECRET.into(),
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        websocket: WebSocketSettings::default(),
        chat: ChatSettings::default(),
        environment: "test".into(),
    }
}

/// Test application builder
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub repo: Arc<InMemoryMessageRepository>,
    pub profiles: Arc<InMemoryProfileDirectory>,
    verifier: JwtTokenVerifier,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(test_settings(), false)
    }

    /// Serve over a real socket so `/ws` can be upgraded
    pub fn with_http_transport(settings: Settings) -> Self {
        Self::build(settings, true)
    }

    fn build(settings: Settings, http_transport: bool) -> Self {
        let verifier = JwtTokenVerifier::new(&settings.jwt);
        let repo = Arc::new(InMemoryMessageRepository::new());
        let profiles = Arc::new(InMemoryProfileDirectory::default());

        let state = AppState::new(settings, repo.clone(), profiles.clone());
        let router = create_router(state.clone());
        let server = if http_transport {
            TestServer::builder().http_transport().build(router)
        } else {
            TestServer::new(router)
        }
        .expect("test server");

        Self {
            server,
            state,
            repo,
            profiles,
            verifier,
        }
    }

    /// A valid access token for `user_id`
    pub fn token(&self, user_id: i64) -> String {
        self.verifier
            .issue_token(user_id, Duration::minutes(15))
            .expect("token")
    }

    pub fn expired_token(&self, user_id: i64) -> String {
        self.verifier
            .issue_token(user_id, Duration::minutes(-15))
            .expect("token")
    }

    /// Store a message directly, bypassing the API
    pub async fn seed(&self, from: i64, to: i64, content: &str) -> Message {
        let message = NewMessage::new(from, to, content, None).expect("valid message");
        self.repo.create(&message).await.expect("stored")
    }

    /// Open a gateway session authenticated as `user_id`, with its event queue
    pub async fn connect(&self, user_id: i64) -> (Session, UnboundedReceiver<ServerEvent>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = self.state.gateway.open_session(tx);
        let frame = format!(
            r#"{{"type":"authenticate","token":"{}"}}"#,
            self.token(user_id)
        );
        self.state.gateway.handle_text(&mut session, &frame).await;
        assert_eq!(
            rx.try_recv().expect("authenticated event"),
            ServerEvent::Authenticated { user_id }
        );
        (session, rx)
    }
}

/// Everything currently queued for a session
pub fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Poll `condition` for up to five seconds
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..50 {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    condition()
}
