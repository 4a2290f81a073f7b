//! Request dispatch.
//!
//! Turns one request into one response against the shared directory,
//! tracking which user the connection is logged in as.

use tracing::{debug, info};
use uuid::Uuid;

use crate::protocol::{Request, Response, NOT_LOGGED_IN};
use crate::store::{Directory, InsertOutcome, Message, Router};

/// The account a connection is logged in as.
#[derive(Debug, Clone)]
struct Account {
    login: String,
    user_id: Uuid,
}

/// Per-connection context.
#[derive(Debug)]
pub struct Connection {
    id: Uuid,
    account: Option<Account>,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    /// Create an anonymous connection context.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            account: None,
        }
    }

    /// Connection identifier used in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The login this connection is authenticated as.
    pub fn login(&self) -> Option<&str> {
        self.account.as_ref().map(|account| account.login.as_str())
    }

    /// Whether a user is logged in on this connection.
    pub fn is_logged_in(&self) -> bool {
        self.account.is_some()
    }

    fn bind(&mut self, directory: &Directory, login: &str) {
        let Some(user) = directory.get(login) else {
            return;
        };
        info!("Connection {} logged in as {}", self.id, login);
        self.account = Some(Account {
            login: login.to_string(),
            user_id: user.id(),
        });
    }

    fn unbind(&mut self) {
        if let Some(account) = self.account.take() {
            info!("Connection {} logged out (was {})", self.id, account.login);
        }
    }

    /// The bound account, if it still exists.
    ///
    /// Logs the connection out when the account was removed, including when
    /// its login has been registered again by someone else.
    fn current_account(&mut self, directory: &Directory) -> Option<Account> {
        let account = self.account.clone()?;
        if directory.is_current(&account.login, account.user_id) {
            return Some(account);
        }
        info!(
            "Connection {} account {} no longer exists",
            self.id, account.login
        );
        self.account = None;
        None
    }
}

/// Serve one request.
pub async fn dispatch(router: &Router, conn: &mut Connection, request: Request) -> Response {
    debug!("Connection {} request {}", conn.id, request.kind());

    match request {
        Request::IsLoginRegistered { login } => {
            let value = router.directory().read().await.is_login_registered(&login);
            Response::Flag { value }
        }
        Request::IsNicknameRegistered { name } => {
            let value = router.directory().read().await.is_nickname_registered(&name);
            Response::Flag { value }
        }
        Request::IsPasswordCorrect { login, digest } => {
            let directory = router.directory().read().await;
            let value = directory.is_password_correct(&login, &digest);
            if value {
                conn.bind(&directory, &login);
            } else {
                info!("Connection {} failed password check for {}", conn.id, login);
            }
            Response::Flag { value }
        }
        Request::Register {
            name,
            login,
            digest,
        } => {
            let mut directory = router.directory().write().await;
            let outcome = directory.add_user(&name, &login, digest);
            match outcome {
                InsertOutcome::Inserted => {
                    info!("Registered {} ({})", login, name);
                    conn.bind(&directory, &login);
                }
                InsertOutcome::Rejected(reason) => {
                    info!("Registration of {} rejected: {}", login, reason.describe());
                }
            }
            Response::Registration { outcome }
        }
        Request::GetNickname { login } => {
            let name = router
                .directory()
                .read()
                .await
                .nickname(&login)
                .map(str::to_string);
            Response::Nickname { name }
        }
        Request::Send { addressee, text } => {
            let Some(sender) = current_nickname(router, conn).await else {
                return Response::error(NOT_LOGGED_IN);
            };
            let outcome = router.deliver(&addressee, Message::new(sender, text)).await;
            Response::Delivery { outcome }
        }
        Request::LoadMessages => {
            let Some(account) = conn.account.clone() else {
                return Response::error(NOT_LOGGED_IN);
            };
            match router
                .load_messages_for(&account.login, account.user_id)
                .await
            {
                Some(messages) => {
                    debug!("Connection {} loaded {} messages", conn.id, messages.len());
                    Response::Messages { messages }
                }
                None => {
                    info!(
                        "Connection {} account {} no longer exists",
                        conn.id, account.login
                    );
                    conn.account = None;
                    Response::error(NOT_LOGGED_IN)
                }
            }
        }
        Request::ListNicknames => {
            let names = router.directory().read().await.list_nicknames();
            Response::Nicknames { names }
        }
        Request::CountUsers => {
            let value = router.directory().read().await.count();
            Response::Count { value }
        }
        Request::Logout => {
            conn.unbind();
            Response::Done
        }
        Request::RemoveAccount => {
            let mut directory = router.directory().write().await;
            let Some(account) = conn.current_account(&directory) else {
                return Response::error(NOT_LOGGED_IN);
            };
            directory.remove_user(&account.login);
            info!("Account {} removed", account.login);
            conn.unbind();
            Response::Done
        }
    }
}

/// Nickname of the logged-in user, if the account still exists.
async fn current_nickname(router: &Router, conn: &mut Connection) -> Option<String> {
    let directory = router.directory().read().await;
    let account = conn.current_account(&directory)?;
    directory.nickname(&account.login).map(str::to_string)
}
