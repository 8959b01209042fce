//! Profile Directory Implementation
//!
//! Reads the `users` and `animals` tables owned by the catalog side of the
//! marketplace. Read-only.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{CounterpartyProfile, ProfileDirectory};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// PostgreSQL profile directory.
pub struct PgProfileDirectory {
    pool: PgPool,
}

impl PgProfileDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: i64,
    display_name: Option<String>,
    avatar_url: Option<String>,
    has_active_listings: bool,
}

#[async_trait]
impl ProfileDirectory for PgProfileDirectory {
    async fn profiles(
        &self,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, CounterpartyProfile>, AppError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let timer = metrics::DbTimer::start("select_profiles", "users");
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT u.id,
                   u.name AS display_name,
                   u.avatar_url,
                   EXISTS (
                       SELECT 1 FROM animals a
                       WHERE a.user_id = u.id AND a.status = 'active'
                   ) AS has_active_listings
            FROM users u
            WHERE u.id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        timer.observe();

        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    r.id,
                    CounterpartyProfile {
                        display_name: r.display_name,
                        avatar_url: r.avatar_url,
                        has_active_listings: r.has_active_listings,
                    },
                )
            })
            .collect())
    }
}
