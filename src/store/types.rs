//! Message and outcome types for the directory store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Addressee that delivers a message to every registered user.
pub const BROADCAST_ADDRESSEE: &str = "all";

/// A chat message sitting in a mailbox.
///
/// Immutable once built; the sender is always a nickname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    sender: String,
    text: String,
    sent_at: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    /// Nickname of the sender.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Message body.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// When the router accepted the message.
    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    /// Format the message for display.
    pub fn format(&self) -> String {
        format!(
            "[{}] <{}> {}",
            self.sent_at.format("%Y-%m-%d %H:%M"),
            self.sender,
            self.text
        )
    }
}

/// Why an insert was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Name, login or digest was empty.
    EmptyField,
    /// The login already belongs to someone.
    LoginTaken,
    /// The nickname already belongs to someone.
    NicknameTaken,
    /// The nickname collides with the broadcast addressee.
    ReservedNickname,
}

impl RejectReason {
    /// Human readable explanation.
    pub fn describe(&self) -> &'static str {
        match self {
            RejectReason::EmptyField => "name, login and password must not be empty",
            RejectReason::LoginTaken => "login is already registered",
            RejectReason::NicknameTaken => "nickname is already registered",
            RejectReason::ReservedNickname => "nickname is reserved",
        }
    }
}

/// Result of adding a user to the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum InsertOutcome {
    /// A new record with an empty mailbox was stored.
    Inserted,
    /// Nothing was stored.
    Rejected(RejectReason),
}

impl InsertOutcome {
    /// Whether the user was stored.
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}

/// Result of routing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The message was appended to this many mailboxes.
    Delivered {
        /// Number of mailboxes that received the message.
        recipients: usize,
    },
    /// No registered user has the addressee nickname; the message was dropped.
    AddresseeUnknown,
    /// The message had no sender and was dropped.
    EmptySender,
}

impl DeliveryOutcome {
    /// Whether at least the addressing succeeded.
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}
