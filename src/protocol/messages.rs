//! Request and response shapes.

use serde::{Deserialize, Serialize};

use crate::auth::PasswordDigest;
use crate::store::{DeliveryOutcome, InsertOutcome, Message};

/// Error text returned for requests that need an authenticated connection.
pub const NOT_LOGGED_IN: &str = "not logged in";

/// A request from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Does this login exist?
    IsLoginRegistered { login: String },
    /// Does this nickname exist?
    IsNicknameRegistered { name: String },
    /// Check credentials; on success the connection is logged in as `login`.
    IsPasswordCorrect {
        login: String,
        digest: PasswordDigest,
    },
    /// Create an account; on success the connection is logged in as `login`.
    Register {
        name: String,
        login: String,
        digest: PasswordDigest,
    },
    /// Nickname for a login.
    GetNickname { login: String },
    /// Send a message as the logged-in user.
    Send { addressee: String, text: String },
    /// Take all unread messages of the logged-in user.
    LoadMessages,
    /// All nicknames in registration order.
    ListNicknames,
    /// Number of registered users.
    CountUsers,
    /// Forget the logged-in user for this connection.
    Logout,
    /// Delete the logged-in user and their mailbox.
    RemoveAccount,
}

impl Request {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::IsLoginRegistered { .. } => "is_login_registered",
            Request::IsNicknameRegistered { .. } => "is_nickname_registered",
            Request::IsPasswordCorrect { .. } => "is_password_correct",
            Request::Register { .. } => "register",
            Request::GetNickname { .. } => "get_nickname",
            Request::Send { .. } => "send",
            Request::LoadMessages => "load_messages",
            Request::ListNicknames => "list_nicknames",
            Request::CountUsers => "count_users",
            Request::Logout => "logout",
            Request::RemoveAccount => "remove_account",
        }
    }
}

/// A response from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Answer to a yes/no question.
    Flag { value: bool },
    /// Nickname lookup; `None` when the login is unknown.
    Nickname { name: Option<String> },
    /// Outcome of a registration.
    Registration { outcome: InsertOutcome },
    /// Outcome of a send.
    Delivery { outcome: DeliveryOutcome },
    /// Drained mailbox contents, oldest first.
    Messages { messages: Vec<Message> },
    /// Nickname listing.
    Nicknames { names: Vec<String> },
    /// A count.
    Count { value: usize },
    /// Acknowledgement with no payload.
    Done,
    /// The request could not be served.
    Error { message: String },
}

impl Response {
    /// Build an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}
