//! textchat - menu-driven text chat
//!
//! A TCP server keeping a directory of users with per-user mailboxes, and a
//! console client that walks users through login, registration and chat.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod store;

pub use auth::{digest, PasswordDigest, DIGEST_HEX_LENGTH};
pub use client::{
    Command, LocalTransport, RemoteTransport, ServerApi, Session, State, Transport,
};
pub use config::Config;
pub use error::{ChatError, Result};
pub use protocol::{Request, Response};
pub use server::{build_router, ChatServer, ConnectionLimits};
pub use store::{
    DeliveryOutcome, Directory, InsertOutcome, Message, RejectReason, Router,
    BROADCAST_ADDRESSEE,
};
