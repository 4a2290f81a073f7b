//! Message routing between mailboxes.
//!
//! The router resolves an addressee nickname (or the broadcast addressee) to
//! mailboxes and appends the message there. Every operation holds the
//! directory write lock for its whole duration, so a broadcast is never
//! observed half-delivered and a drain always sees every earlier delivery.

use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;
use tracing::{debug, warn};

use super::directory::Directory;
use super::mailbox::Mailbox;
use super::types::{DeliveryOutcome, Message, BROADCAST_ADDRESSEE};

/// Directory shared between connection tasks.
pub type SharedDirectory = Arc<RwLock<Directory>>;

/// Delivers messages into mailboxes held by a shared directory.
#[derive(Clone)]
pub struct Router {
    directory: SharedDirectory,
}

impl Router {
    /// Create a router that takes ownership of the directory.
    pub fn new(directory: Directory) -> Self {
        Self {
            directory: Arc::new(RwLock::new(directory)),
        }
    }

    /// Create a router over an already shared directory.
    pub fn with_shared(directory: SharedDirectory) -> Self {
        Self { directory }
    }

    /// The directory this router delivers into.
    pub fn directory(&self) -> &SharedDirectory {
        &self.directory
    }

    /// Deliver a message to one user, or to everyone for the broadcast addressee.
    ///
    /// An unknown addressee drops the message without touching any mailbox.
    /// Broadcast includes the sender's own mailbox.
    pub async fn deliver(&self, addressee: &str, message: Message) -> DeliveryOutcome {
        if message.sender().is_empty() {
            warn!("Dropping message with empty sender for {:?}", addressee);
            return DeliveryOutcome::EmptySender;
        }

        let mut directory = self.directory.write().await;

        if addressee == BROADCAST_ADDRESSEE {
            let logins = directory.logins().to_vec();
            for login in &logins {
                if let Some(user) = directory.get_mut(login) {
                    push_logged(user.mailbox_mut(), login, message.clone());
                }
            }
            debug!(
                "Broadcast from {} delivered to {} mailboxes",
                message.sender(),
                logins.len()
            );
            return DeliveryOutcome::Delivered {
                recipients: logins.len(),
            };
        }

        let Some(login) = directory.login_by_nickname(addressee).map(str::to_string) else {
            debug!(
                "Message from {} dropped: addressee {:?} is not registered",
                message.sender(),
                addressee
            );
            return DeliveryOutcome::AddresseeUnknown;
        };

        match directory.get_mut(&login) {
            Some(user) => {
                debug!("Message from {} delivered to {}", message.sender(), addressee);
                push_logged(user.mailbox_mut(), &login, message);
                DeliveryOutcome::Delivered { recipients: 1 }
            }
            None => DeliveryOutcome::AddresseeUnknown,
        }
    }

    /// Take every unread message for a login, oldest first.
    ///
    /// The mailbox is empty afterwards. An unregistered login yields nothing.
    pub async fn load_messages(&self, login: &str) -> Vec<Message> {
        let mut directory = self.directory.write().await;
        match directory.get_mut(login) {
            Some(user) => user.mailbox_mut().drain(),
            None => Vec::new(),
        }
    }

    /// Like [`load_messages`](Self::load_messages), but only while `login`
    /// still names the account `id`.
    ///
    /// Returns `None`, leaving every mailbox untouched, once that account has
    /// been removed, even if the login was registered again since.
    pub async fn load_messages_for(&self, login: &str, id: Uuid) -> Option<Vec<Message>> {
        let mut directory = self.directory.write().await;
        match directory.get_mut(login) {
            Some(user) if user.id() == id => Some(user.mailbox_mut().drain()),
            _ => None,
        }
    }
}

fn push_logged(mailbox: &mut Mailbox, login: &str, message: Message) {
    if let Some(evicted) = mailbox.push(message) {
        warn!(
            "Mailbox of {} is full ({}); evicted message from {}",
            login,
            mailbox.capacity(),
            evicted.sender()
        );
    }
}
