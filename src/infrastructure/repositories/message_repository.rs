//! Message Repository Implementation
//!
//! PostgreSQL implementation of the message store: append-only rows with a
//! mutable read flag, newest-first offset paging and the counterparty
//! rollup behind the conversation list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    ConversationPage, CounterpartyActivity, Message, MessageRepository, NewMessage, PageRequest,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// PostgreSQL message repository implementation.
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    sender_id: i64,
    recipient_id: i64,
    animal_id: Option<i64>,
    content: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            animal_id: self.animal_id,
            content: self.content,
            is_read: self.is_read,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CounterpartyRow {
    counterparty_id: i64,
    last_message_at: DateTime<Utc>,
    unread_count: i64,
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    /// Insert a message. Identity comes from the `BIGSERIAL` and the
    /// timestamp from `clock_timestamp()`, so both are assigned by the store.
    async fn create(&self, message: &NewMessage) -> Result<Message, AppError> {
        let timer = metrics::DbTimer::start("insert", "messages");

        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (sender_id, recipient_id, animal_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sender_id, recipient_id, animal_id, content, is_read, created_at
            "#,
        )
        .bind(message.sender_id())
        .bind(message.recipient_id())
        .bind(message.animal_id())
        .bind(message.content())
        .fetch_one(&self.pool)
        .await?;

        timer.observe();
        Ok(row.into_message())
    }

    /// Newest-first window, reversed so the caller gets oldest first.
    ///
    /// Fetches one extra row to learn whether older messages exist.
    async fn page(
        &self,
        user_a: i64,
        user_b: i64,
        page: PageRequest,
    ) -> Result<ConversationPage, AppError> {
        let timer = metrics::DbTimer::start("select_page", "messages");
        let page_size = i64::from(page.page_size());

        let mut rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, recipient_id, animal_id, content, is_read, created_at
            FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .bind(page_size + 1)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        timer.observe();

        let has_more = rows.len() as i64 > page_size;
        rows.truncate(page_size as usize);
        rows.reverse();

        Ok(ConversationPage {
            messages: rows.into_iter().map(|r| r.into_message()).collect(),
            has_more,
        })
    }

    async fn count_conversation(&self, user_a: i64, user_b: i64) -> Result<i64, AppError> {
        let timer = metrics::DbTimer::start("count", "messages");

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&self.pool)
        .await?;

        timer.observe();
        Ok(count)
    }

    /// Single-statement flip; rows already read are not touched, which makes
    /// repeated calls report zero.
    async fn mark_read(&self, recipient: i64, sender: i64) -> Result<u64, AppError> {
        let timer = metrics::DbTimer::start("mark_read", "messages");

        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE recipient_id = $1 AND sender_id = $2 AND is_read = FALSE
            "#,
        )
        .bind(recipient)
        .bind(sender)
        .execute(&self.pool)
        .await?;

        timer.observe();
        Ok(result.rows_affected())
    }

    async fn list_counterparties(
        &self,
        user_id: i64,
    ) -> Result<Vec<CounterpartyActivity>, AppError> {
        let timer = metrics::DbTimer::start("select_counterparties", "messages");

        let rows = sqlx::query_as::<_, CounterpartyRow>(
            r#"
            SELECT counterparty_id,
                   MAX(created_at) AS last_message_at,
                   COUNT(*) FILTER (WHERE recipient_id = $1 AND NOT is_read) AS unread_count
            FROM (
                SELECT CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END AS counterparty_id,
                       id, recipient_id, is_read, created_at
                FROM messages
                WHERE sender_id = $1 OR recipient_id = $1
            ) m
            GROUP BY counterparty_id
            ORDER BY MAX(created_at) DESC, MAX(id) DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        timer.observe();
        Ok(rows
            .into_iter()
            .map(|r| CounterpartyActivity {
                counterparty_id: r.counterparty_id,
                last_message_at: r.last_message_at,
                unread_count: r.unread_count,
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        let _timer = metrics::DbTimer::start("ping", "messages");
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
