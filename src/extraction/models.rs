use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Server-assigned message sequence number, only meaningful inside the
/// session that produced it.
pub type MessageHandle = u32;

/// Login for a single session. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    pub address: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(address: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Search input as the caller supplied it. Dates stay unparsed until the
/// run reaches the parsing step so a malformed date fails the run, not the
/// request.
#[derive(Debug, Clone)]
pub struct RawCriteria {
    pub sender: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub sender: String,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
}

/// A MIME part that matched the target content type.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub original_filename: String,
    pub content_type: String,
    pub raw_bytes: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub name: String,
    pub subject: Option<String>,
    pub from: Option<String>,
    pub date: Option<String>,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_secret() {
        let creds = Credentials::new("me@example.com", "hunter2");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("me@example.com"));
        assert!(!printed.contains("hunter2"));
    }
}
