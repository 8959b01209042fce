//! Client-side view of one open conversation.
//!
//! A client sees a conversation through two sources: history pages fetched
//! over HTTP and messages pushed over the live connection while the
//! conversation is open. `ConversationView` merges both into a single
//! ordered list with no duplicates.

use std::collections::HashMap;

use crate::domain::entities::{ConversationPage, Message};

/// Merged view of the conversation a user currently has open.
#[derive(Debug, Clone)]
pub struct ConversationView {
    owner_id: i64,
    counterparty_id: Option<i64>,
    /// Messages from history pages, in fetch order
    loaded: Vec<Message>,
    /// Messages pushed while this conversation was open
    live: Vec<Message>,
    pages_loaded: u32,
    has_more: bool,
}

impl ConversationView {
    pub fn new(owner_id: i64) -> Self {
        Self {
            owner_id,
            counterparty_id: None,
            loaded: Vec::new(),
            live: Vec::new(),
            pages_loaded: 0,
            has_more: true,
        }
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    pub fn counterparty_id(&self) -> Option<i64> {
        self.counterparty_id
    }

    /// Switch to the conversation with `counterparty_id`.
    ///
    /// Reopening the conversation that is already open keeps both buffers.
    pub fn open(&mut self, counterparty_id: i64) {
        if self.counterparty_id == Some(counterparty_id) {
            return;
        }
        self.counterparty_id = Some(counterparty_id);
        self.loaded.clear();
        self.live.clear();
        self.pages_loaded = 0;
        self.has_more = true;
    }

    /// Close the open conversation and drop both buffers.
    pub fn close(&mut self) {
        self.counterparty_id = None;
        self.loaded.clear();
        self.live.clear();
        self.pages_loaded = 0;
        self.has_more = true;
    }

    /// The next history page to request when scrolling back, if any.
    pub fn next_page(&self) -> Option<u32> {
        if self.counterparty_id.is_none() || !self.has_more {
            None
        } else {
            Some(self.pages_loaded + 1)
        }
    }

    /// Add the next older history page. The live buffer is left untouched.
    ///
    /// Messages that do not belong to the open conversation are dropped.
    pub fn load_page(&mut self, page: ConversationPage) {
        let Some(counterparty_id) = self.counterparty_id else {
            return;
        };
        let owner_id = self.owner_id;
        self.loaded.extend(
            page.messages
                .into_iter()
                .filter(|m| m.is_between(owner_id, counterparty_id)),
        );
        self.pages_loaded += 1;
        self.has_more = page.has_more;
    }

    /// Accept a pushed message. Returns false when it belongs to another
    /// conversation, in which case only unread badges elsewhere care about it.
    pub fn receive_live(&mut self, message: Message) -> bool {
        match self.counterparty_id {
            Some(counterparty_id) if message.is_between(self.owner_id, counterparty_id) => {
                self.live.push(message);
                true
            }
            _ => false,
        }
    }

    /// Flip the owner's messages to `read_by` to read.
    ///
    /// Returns how many distinct messages changed.
    pub fn apply_read_receipt(&mut self, read_by: i64) -> usize {
        if self.counterparty_id != Some(read_by) {
            return 0;
        }
        let owner_id = self.owner_id;
        let mut flipped = std::collections::HashSet::new();
        for message in self.loaded.iter_mut().chain(self.live.iter_mut()) {
            if message.sender_id == owner_id && message.recipient_id == read_by && !message.is_read {
                message.is_read = true;
                flipped.insert(message.id);
            }
        }
        flipped.len()
    }

    /// The conversation as it should be rendered: deduplicated by id and
    /// sorted by creation time ascending.
    ///
    /// Later copies of a message replace earlier ones; the read flag only
    /// ever moves forward, so a stale unread copy never hides a read one.
    pub fn merged(&self) -> Vec<Message> {
        let mut by_id: HashMap<i64, Message> =
            HashMap::with_capacity(self.loaded.len() + self.live.len());

        for message in self.loaded.iter().chain(self.live.iter()) {
            match by_id.get_mut(&message.id) {
                Some(existing) => {
                    let was_read = existing.is_read;
                    *existing = message.clone();
                    existing.is_read |= was_read;
                }
                None => {
                    by_id.insert(message.id, message.clone());
                }
            }
        }

        let mut merged: Vec<Message> = by_id.into_values().collect();
        merged.sort_by_key(Message::order_key);
        merged
    }

    /// Messages from the counterparty that are still unread.
    pub fn unread_count(&self) -> usize {
        self.merged()
            .iter()
            .filter(|m| m.recipient_id == self.owner_id && !m.is_read)
            .count()
    }
}
