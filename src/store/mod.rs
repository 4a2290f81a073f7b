//! Directory and mailbox store for textchat.
//!
//! This module provides:
//! - The user directory with login and nickname uniqueness
//! - Bounded per-user mailboxes
//! - The router that addresses messages by nickname or to everyone
//! - Seeding of demo accounts at startup

mod directory;
mod mailbox;
mod router;
mod seed;
mod types;

pub use directory::{Directory, User, DEFAULT_MAILBOX_CAPACITY};
pub use mailbox::Mailbox;
pub use router::{Router, SharedDirectory};
pub use seed::seed_directory;
pub use types::{
    DeliveryOutcome, InsertOutcome, Message, RejectReason, BROADCAST_ADDRESSEE,
};
