//! Content fingerprints for change detection.
//!
//! A fingerprint is the MD5 of the message body, rendered as lowercase hex.
//! It only tells two bodies apart between plan and state; it is not a
//! security control. The same value is what SQS reports as
//! `MD5OfMessageBody`.

use std::fmt;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// MD5 digest of a message body as 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    /// Fingerprint a message body.
    pub fn of(body: impl AsRef<[u8]>) -> Self {
        Self(hex::encode(Md5::digest(body.as_ref())))
    }

    /// Wrap a digest reported by a transport, normalising it to lowercase.
    pub fn from_reported(hex_digest: &str) -> Self {
        Self(hex_digest.to_ascii_lowercase())
    }

    /// The hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the fingerprint, returning the hex string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint a message body.
pub fn fingerprint(body: impl AsRef<[u8]>) -> ContentFingerprint {
    ContentFingerprint::of(body)
}

/// Whether two bodies have the same fingerprint.
pub fn same_content(a: &str, b: &str) -> bool {
    fingerprint(a) == fingerprint(b)
}
