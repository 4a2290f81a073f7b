//! User directory.
//!
//! Maps login to user record and enforces the uniqueness rules: logins are
//! unique, nicknames are unique, and no record with an empty field is ever
//! stored. Iteration follows insertion order so nickname listings are
//! deterministic.

use std::collections::HashMap;

use uuid::Uuid;

use super::mailbox::Mailbox;
use super::types::{InsertOutcome, RejectReason, BROADCAST_ADDRESSEE};
use crate::auth::PasswordDigest;

/// Default number of unread messages kept per user.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

/// A registered user and their mailbox.
#[derive(Debug, Clone)]
pub struct User {
    id: Uuid,
    name: String,
    login: String,
    digest: PasswordDigest,
    mailbox: Mailbox,
}

impl User {
    /// Identifier of this account, never reused after removal.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display nickname.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Login identifier.
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Unread messages.
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub(crate) fn mailbox_mut(&mut self) -> &mut Mailbox {
        &mut self.mailbox
    }
}

/// The collection of all registered users.
#[derive(Debug)]
pub struct Directory {
    users: HashMap<String, User>,
    /// Logins in insertion order.
    order: Vec<String>,
    mailbox_capacity: usize,
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory {
    /// Create an empty directory with the default mailbox capacity.
    pub fn new() -> Self {
        Self::with_mailbox_capacity(DEFAULT_MAILBOX_CAPACITY)
    }

    /// Create an empty directory whose mailboxes hold at most `capacity` messages.
    pub fn with_mailbox_capacity(capacity: usize) -> Self {
        Self {
            users: HashMap::new(),
            order: Vec::new(),
            mailbox_capacity: capacity,
        }
    }

    /// Add a user with an empty mailbox.
    ///
    /// All checks run before anything is stored, so a rejected insert leaves
    /// the directory untouched.
    pub fn add_user(&mut self, name: &str, login: &str, digest: PasswordDigest) -> InsertOutcome {
        if name.is_empty() || login.is_empty() || digest.is_empty() {
            return InsertOutcome::Rejected(RejectReason::EmptyField);
        }
        if self.users.contains_key(login) {
            return InsertOutcome::Rejected(RejectReason::LoginTaken);
        }
        if name == BROADCAST_ADDRESSEE {
            return InsertOutcome::Rejected(RejectReason::ReservedNickname);
        }
        if self.is_nickname_registered(name) {
            return InsertOutcome::Rejected(RejectReason::NicknameTaken);
        }

        self.users.insert(
            login.to_string(),
            User {
                id: Uuid::new_v4(),
                name: name.to_string(),
                login: login.to_string(),
                digest,
                mailbox: Mailbox::new(self.mailbox_capacity),
            },
        );
        self.order.push(login.to_string());
        InsertOutcome::Inserted
    }

    /// Whether the login belongs to a registered user.
    pub fn is_login_registered(&self, login: &str) -> bool {
        self.users.contains_key(login)
    }

    /// Whether any registered user has this nickname.
    pub fn is_nickname_registered(&self, name: &str) -> bool {
        self.users.values().any(|user| user.name == name)
    }

    /// Whether the digest matches the one stored for the login.
    ///
    /// Always false for an unregistered login.
    pub fn is_password_correct(&self, login: &str, digest: &PasswordDigest) -> bool {
        self.users
            .get(login)
            .is_some_and(|user| !digest.is_empty() && user.digest == *digest)
    }

    /// Remove a user together with their mailbox.
    ///
    /// Returns false when the login was not registered.
    pub fn remove_user(&mut self, login: &str) -> bool {
        if self.users.remove(login).is_none() {
            return false;
        }
        self.order.retain(|l| l != login);
        true
    }

    /// Nickname for a login.
    pub fn nickname(&self, login: &str) -> Option<&str> {
        self.users.get(login).map(|user| user.name.as_str())
    }

    /// Login for a nickname.
    pub fn login_by_nickname(&self, name: &str) -> Option<&str> {
        self.users
            .values()
            .find(|user| user.name == name)
            .map(|user| user.login.as_str())
    }

    /// Whether `login` still names the account with identifier `id`.
    pub fn is_current(&self, login: &str, id: Uuid) -> bool {
        self.users.get(login).is_some_and(|user| user.id == id)
    }

    /// Look up a user record.
    pub fn get(&self, login: &str) -> Option<&User> {
        self.users.get(login)
    }

    pub(crate) fn get_mut(&mut self, login: &str) -> Option<&mut User> {
        self.users.get_mut(login)
    }

    /// Number of registered users.
    pub fn count(&self) -> usize {
        self.users.len()
    }

    /// Whether nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Nicknames in insertion order.
    pub fn list_nicknames(&self) -> Vec<String> {
        self.iter().map(|user| user.name.clone()).collect()
    }

    /// Users in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.order.iter().filter_map(|login| self.users.get(login))
    }

    /// Logins in insertion order.
    pub(crate) fn logins(&self) -> &[String] {
        &self.order
    }
}
