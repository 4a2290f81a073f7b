//! Typed wrappers around the wire protocol.

use super::transport::Transport;
use crate::auth::PasswordDigest;
use crate::protocol::{Request, Response};
use crate::store::{DeliveryOutcome, InsertOutcome, Message};
use crate::{ChatError, Result};

/// Client-side view of the server operations.
pub struct ServerApi<T> {
    transport: T,
}

impl<T: Transport> ServerApi<T> {
    /// Wrap a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call(&mut self, request: Request) -> Result<Response> {
        match self.transport.round_trip(request).await? {
            Response::Error { message } => Err(ChatError::Server(message)),
            other => Ok(other),
        }
    }

    async fn flag(&mut self, request: Request) -> Result<bool> {
        match self.call(request).await? {
            Response::Flag { value } => Ok(value),
            other => Err(unexpected(other)),
        }
    }

    async fn done(&mut self, request: Request) -> Result<()> {
        match self.call(request).await? {
            Response::Done => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Whether an account with this login exists.
    pub async fn is_login_registered(&mut self, login: &str) -> Result<bool> {
        self.flag(Request::IsLoginRegistered {
            login: login.to_string(),
        })
        .await
    }

    /// Whether an account with this nickname exists.
    pub async fn is_nickname_registered(&mut self, name: &str) -> Result<bool> {
        self.flag(Request::IsNicknameRegistered {
            name: name.to_string(),
        })
        .await
    }

    /// Check credentials; a `true` answer also logs the connection in.
    pub async fn authenticate(&mut self, login: &str, digest: PasswordDigest) -> Result<bool> {
        self.flag(Request::IsPasswordCorrect {
            login: login.to_string(),
            digest,
        })
        .await
    }

    /// Create an account; `Inserted` also logs the connection in.
    pub async fn register(
        &mut self,
        name: &str,
        login: &str,
        digest: PasswordDigest,
    ) -> Result<InsertOutcome> {
        let request = Request::Register {
            name: name.to_string(),
            login: login.to_string(),
            digest,
        };
        match self.call(request).await? {
            Response::Registration { outcome } => Ok(outcome),
            other => Err(unexpected(other)),
        }
    }

    /// Nickname for a login, `None` when unregistered.
    pub async fn nickname(&mut self, login: &str) -> Result<Option<String>> {
        let request = Request::GetNickname {
            login: login.to_string(),
        };
        match self.call(request).await? {
            Response::Nickname { name } => Ok(name),
            other => Err(unexpected(other)),
        }
    }

    /// Send a message as the logged-in user.
    pub async fn send(&mut self, addressee: &str, text: &str) -> Result<DeliveryOutcome> {
        let request = Request::Send {
            addressee: addressee.to_string(),
            text: text.to_string(),
        };
        match self.call(request).await? {
            Response::Delivery { outcome } => Ok(outcome),
            other => Err(unexpected(other)),
        }
    }

    /// Fetch and clear the logged-in user's mailbox.
    pub async fn load_messages(&mut self) -> Result<Vec<Message>> {
        match self.call(Request::LoadMessages).await? {
            Response::Messages { messages } => Ok(messages),
            other => Err(unexpected(other)),
        }
    }

    /// All nicknames in registration order.
    pub async fn list_nicknames(&mut self) -> Result<Vec<String>> {
        match self.call(Request::ListNicknames).await? {
            Response::Nicknames { names } => Ok(names),
            other => Err(unexpected(other)),
        }
    }

    /// Number of registered accounts.
    pub async fn count_users(&mut self) -> Result<usize> {
        match self.call(Request::CountUsers).await? {
            Response::Count { value } => Ok(value),
            other => Err(unexpected(other)),
        }
    }

    /// Log the connection out.
    pub async fn logout(&mut self) -> Result<()> {
        self.done(Request::Logout).await
    }

    /// Delete the logged-in account and its mailbox.
    pub async fn remove_account(&mut self) -> Result<()> {
        self.done(Request::RemoveAccount).await
    }
}

fn unexpected(response: Response) -> ChatError {
    ChatError::UnexpectedResponse(format!("{response:?}"))
}
