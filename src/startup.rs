//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;

use crate::application::services::{
    JwtTokenVerifier, MessageService, MessageServiceImpl, TokenVerifier,
};
use crate::config::Settings;
use crate::domain::{MessageRepository, ProfileDirectory};
use crate::infrastructure::database;
use crate::infrastructure::repositories::{PgMessageRepository, PgProfileDirectory};
use crate::presentation::http::{create_router, handlers::health};
use crate::presentation::websocket::{ConnectionRegistry, Gateway};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<dyn MessageService>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub gateway: Arc<Gateway>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire services and the gateway over the given store and directory.
    pub fn new(
        settings: Settings,
        message_repo: Arc<dyn MessageRepository>,
        profile_directory: Arc<dyn ProfileDirectory>,
    ) -> Self {
        let tokens: Arc<dyn TokenVerifier> = Arc::new(JwtTokenVerifier::new(&settings.jwt));
        let messages: Arc<dyn MessageService> = Arc::new(MessageServiceImpl::new(
            message_repo,
            profile_directory,
            settings.chat.clone(),
        ));
        let gateway = Arc::new(Gateway::new(
            Arc::new(ConnectionRegistry::new()),
            messages.clone(),
            tokens.clone(),
        ));

        Self {
            messages,
            tokens,
            gateway,
            settings: Arc::new(settings),
        }
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        // Create database pool
        let db = database::create_pool(&settings.database)
            .await
            .context("Failed to connect to PostgreSQL")?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database migrations applied");
        }

        let addr: SocketAddr = settings
            .server_addr()
            .parse()
            .with_context(|| format!("Invalid server address {}", settings.server_addr()))?;

        let state = AppState::new(
            settings,
            Arc::new(PgMessageRepository::new(db.clone())),
            Arc::new(PgProfileDirectory::new(db)),
        );
        let router = create_router(state);

        // Bind to address
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
