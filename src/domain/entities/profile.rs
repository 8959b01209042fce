//! Counterparty profile lookups.
//!
//! User accounts and listings belong to the catalog side of the marketplace.
//! The chat core only needs a display hint for the conversation list.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::shared::error::AppError;

/// Display information for a conversation partner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CounterpartyProfile {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,

    /// Whether the user currently has at least one active listing
    pub has_active_listings: bool,
}

/// Read-only view over users and their listings.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Look up profiles for the given users. Unknown ids are simply absent.
    async fn profiles(&self, user_ids: &[i64])
        -> Result<HashMap<i64, CounterpartyProfile>, AppError>;
}
