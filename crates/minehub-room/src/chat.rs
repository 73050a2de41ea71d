//! Per-room chat history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use minehub_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::Player;
use crate::config::CHAT_HISTORY_LIMIT;

/// One chat line, stamped with the author's details at send time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author_id: PlayerId,
    pub author_name: String,
    pub author_color: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub(crate) fn new(author: &Player, text: String) -> Self {
        Self {
            author_id: author.id,
            author_name: author.name.clone(),
            author_color: author.color.clone(),
            text,
            timestamp: Utc::now(),
        }
    }
}

/// Bounded FIFO of chat messages, oldest first.
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
    limit: usize,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::with_limit(CHAT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Appends a message, dropping the oldest ones past the limit.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.limit {
            self.messages.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}
