//! Password digests for textchat.
//!
//! Uses SHA-256 so that the client and the server derive the same value from
//! the same plaintext.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of a digest rendered as lowercase hex.
pub const DIGEST_HEX_LENGTH: usize = 64;

/// A one-way password digest, carried as lowercase hex.
///
/// Values decoded from the wire are untrusted and may be empty; the
/// directory refuses to store an empty digest.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap an already computed hex digest.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// The digest as hex text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the digest carries no value at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Keeps digests out of logs.
impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

/// Digest a plaintext password.
///
/// # Examples
///
/// ```
/// use textchat::digest;
///
/// let first = digest("123");
/// assert_eq!(first, digest("123"));
/// assert_ne!(first, digest("wrong"));
/// assert_eq!(first.as_str().len(), textchat::DIGEST_HEX_LENGTH);
/// ```
pub fn digest(plaintext: &str) -> PasswordDigest {
    PasswordDigest(format!("{:x}", Sha256::digest(plaintext.as_bytes())))
}
