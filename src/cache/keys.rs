//! Identity keys for compiled documents.
//!
//! A key stands for one revision of one document. The cache never looks at
//! the source, so callers must mint a new key whenever content changes.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Document id plus last-modified instant. Equal instants in different
    /// offsets produce the same key.
    pub fn versioned(document_id: &str, modified_at: OffsetDateTime) -> Self {
        Self(format!(
            "{document_id}@{}",
            modified_at.unix_timestamp_nanos()
        ))
    }

    /// Document id plus a SHA-256 of the source, for callers without a
    /// reliable modification marker.
    pub fn content_addressed(document_id: &str, source: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        Self(format!("{document_id}#{}", hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for IdentityKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for IdentityKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn versioned_keys_track_modification_time() {
        let first = IdentityKey::versioned("post-1", datetime!(2024-05-01 10:00 UTC));
        let same_instant = IdentityKey::versioned("post-1", datetime!(2024-05-01 12:00 +02:00));
        let later = IdentityKey::versioned("post-1", datetime!(2024-05-01 10:00:01 UTC));

        assert_eq!(first, same_instant);
        assert_ne!(first, later);
        assert!(first.as_str().starts_with("post-1@"));
    }

    #[test]
    fn content_addressed_keys_change_with_source() {
        let a = IdentityKey::content_addressed("post-1", "# a");
        let b = IdentityKey::content_addressed("post-1", "# b");

        assert_ne!(a, b);
        assert_eq!(a, IdentityKey::content_addressed("post-1", "# a"));
        assert_eq!(a.as_str().len(), "post-1#".len() + 64);
    }
}
