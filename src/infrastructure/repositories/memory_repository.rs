//! In-memory repositories.
//!
//! Process-local implementations of the message store and profile directory,
//! used by the test suite and for running the server without PostgreSQL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};

use crate::domain::{
    ConversationPage, CounterpartyActivity, CounterpartyProfile, Message, MessageRepository,
    NewMessage, PageRequest, ProfileDirectory,
};
use crate::shared::error::AppError;

#[derive(Debug, Default)]
struct MessageTable {
    rows: Vec<Message>,
    next_id: i64,
    last_created_at: Option<DateTime<Utc>>,
}

impl MessageTable {
    /// Wall-clock time, nudged forward so creation times strictly increase.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(ts);
        ts
    }

    fn conversation(&self, a: i64, b: i64) -> impl Iterator<Item = &Message> {
        self.rows.iter().filter(move |m| m.is_between(a, b))
    }
}

/// Message store backed by a mutex-guarded vector.
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    table: Mutex<MessageTable>,
    unavailable: AtomicBool,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every operation fails until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of every stored message in insertion order.
    pub fn all(&self) -> Vec<Message> {
        self.table.lock().rows.clone()
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AppError::Internal("message store unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: &NewMessage) -> Result<Message, AppError> {
        self.check_available()?;

        let mut table = self.table.lock();
        table.next_id += 1;
        let id = table.next_id;
        let created_at = table.next_timestamp();

        let stored = message.clone().into_message(id, created_at);
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn page(
        &self,
        user_a: i64,
        user_b: i64,
        page: PageRequest,
    ) -> Result<ConversationPage, AppError> {
        self.check_available()?;

        let table = self.table.lock();
        let mut newest_first: Vec<&Message> = table.conversation(user_a, user_b).collect();
        newest_first.sort_by_key(|m| std::cmp::Reverse(m.order_key()));

        let offset = page.offset() as usize;
        let size = page.page_size() as usize;
        let mut messages: Vec<Message> = newest_first
            .iter()
            .skip(offset)
            .take(size)
            .map(|m| (*m).clone())
            .collect();
        messages.reverse();

        Ok(ConversationPage {
            messages,
            has_more: newest_first.len() > offset + size,
        })
    }

    async fn count_conversation(&self, user_a: i64, user_b: i64) -> Result<i64, AppError> {
        self.check_available()?;
        Ok(self.table.lock().conversation(user_a, user_b).count() as i64)
    }

    async fn mark_read(&self, recipient: i64, sender: i64) -> Result<u64, AppError> {
        self.check_available()?;

        let mut table = self.table.lock();
        let mut updated = 0;
        for message in table
            .rows
            .iter_mut()
            .filter(|m| m.recipient_id == recipient && m.sender_id == sender && !m.is_read)
        {
            message.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn list_counterparties(
        &self,
        user_id: i64,
    ) -> Result<Vec<CounterpartyActivity>, AppError> {
        self.check_available()?;

        let table = self.table.lock();
        // counterparty -> (latest order key, unread count)
        let mut rollup: HashMap<i64, ((DateTime<Utc>, i64), i64)> = HashMap::new();
        for message in &table.rows {
            let Some(counterparty_id) = message.counterparty_of(user_id) else {
                continue;
            };
            let unread = i64::from(message.recipient_id == user_id && !message.is_read);
            let entry = rollup
                .entry(counterparty_id)
                .or_insert((message.order_key(), 0));
            entry.0 = entry.0.max(message.order_key());
            entry.1 += unread;
        }

        let mut activity: Vec<((DateTime<Utc>, i64), CounterpartyActivity)> = rollup
            .into_iter()
            .map(|(counterparty_id, (latest, unread_count))| {
                (
                    latest,
                    CounterpartyActivity {
                        counterparty_id,
                        last_message_at: latest.0,
                        unread_count,
                    },
                )
            })
            .collect();
        activity.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(activity.into_iter().map(|(_, a)| a).collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.check_available()
    }
}

/// Profile directory seeded by hand.
#[derive(Debug, Default)]
pub struct InMemoryProfileDirectory {
    profiles: RwLock<HashMap<i64, CounterpartyProfile>>,
}

impl InMemoryProfileDirectory {
    pub fn insert(&self, user_id: i64, profile: CounterpartyProfile) {
        self.profiles.write().insert(user_id, profile);
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryProfileDirectory {
    async fn profiles(
        &self,
        user_ids: &[i64],
    ) -> Result<HashMap<i64, CounterpartyProfile>, AppError> {
        let profiles = self.profiles.read();
        Ok(user_ids
            .iter()
            .filter_map(|id| profiles.get(id).map(|p| (*id, p.clone())))
            .collect())
    }
}
