//! Startup seed data.

use tracing::{info, warn};

use super::directory::Directory;
use super::types::InsertOutcome;
use crate::auth::digest;
use crate::config::SeedAccount;

/// Insert the configured accounts, returning how many were stored.
///
/// Accounts that collide with existing records are skipped with a warning.
pub fn seed_directory(directory: &mut Directory, accounts: &[SeedAccount]) -> usize {
    let mut inserted = 0;
    for account in accounts {
        match directory.add_user(&account.name, &account.login, digest(&account.password)) {
            InsertOutcome::Inserted => {
                info!("Seeded account {} ({})", account.login, account.name);
                inserted += 1;
            }
            InsertOutcome::Rejected(reason) => {
                warn!(
                    "Skipped seed account {:?}: {}",
                    account.login,
                    reason.describe()
                );
            }
        }
    }
    inserted
}
