//! Per-user mailbox.

use std::collections::VecDeque;

use super::types::Message;

/// Ordered, bounded list of unread messages for one user.
///
/// Arrival order is preserved. When full, the oldest message is evicted to
/// make room for the newest.
#[derive(Debug, Clone)]
pub struct Mailbox {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl Mailbox {
    /// Create an empty mailbox holding at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Append a message, returning the evicted one if the mailbox was full.
    pub fn push(&mut self, message: Message) -> Option<Message> {
        let evicted = if self.messages.len() >= self.capacity {
            self.messages.pop_front()
        } else {
            None
        };
        self.messages.push_back(message);
        evicted
    }

    /// Take every message, leaving the mailbox empty.
    pub fn drain(&mut self) -> Vec<Message> {
        self.messages.drain(..).collect()
    }

    /// Most recently arrived message.
    pub fn latest(&self) -> Option<&Message> {
        self.messages.back()
    }

    /// Number of unread messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether there is nothing to read.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Maximum number of messages kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
