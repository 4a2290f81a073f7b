//! Chat server module.
//!
//! This module provides the TCP listener, the per-connection request loop
//! and request dispatch against the shared directory.

mod connection;
mod handler;
mod listener;

use std::future::Future;

use tracing::info;

pub use connection::{handle_connection, serve, ConnectionLimits};
pub use handler::{dispatch, Connection};
pub use listener::{ChatServer, ConnectionPermit};

use crate::config::Config;
use crate::store::{seed_directory, Directory, Router};
use crate::Result;

/// Build the router over a freshly seeded directory.
pub fn build_router(config: &Config) -> Router {
    let mut directory = Directory::with_mailbox_capacity(config.mailbox.capacity);
    let seeded = seed_directory(&mut directory, &config.seed.accounts);
    info!(
        "Directory ready with {} seeded accounts (mailbox capacity {})",
        seeded, config.mailbox.capacity
    );
    Router::new(directory)
}

/// Accept connections and serve each one until `shutdown` resolves.
pub async fn run<S>(
    server: ChatServer,
    router: Router,
    limits: ConnectionLimits,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()>,
{
    server
        .run_until(
            move |stream, addr| handle_connection(stream, addr, router.clone(), limits),
            shutdown,
        )
        .await
}
