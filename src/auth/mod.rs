//! Credential handling for textchat.
//!
//! Passwords never travel or get stored in plaintext: the client digests
//! them before submission and the directory compares digests.

mod password;

pub use password::{digest, PasswordDigest, DIGEST_HEX_LENGTH};
