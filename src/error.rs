use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong during an extraction run.
///
/// `Connection`, `Authentication`, `Selection`, `Search` and `DateParse`
/// end the run. `Fetch` and `Write` only skip the affected message or
/// attachment.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IMAP login failed: {0}")]
    Authentication(String),

    #[error("Failed to select {mailbox}: {reason}")]
    Selection { mailbox: String, reason: String },

    #[error("IMAP search failed: {0}")]
    Search(String),

    #[error("Invalid date '{input}': expected YYYY-MM-DD or DD-Mon-YYYY")]
    DateParse { input: String },

    #[error("Failed to fetch message {handle}: {reason}")]
    Fetch { handle: u32, reason: String },

    #[error("Could not save attachment '{path}': {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let fetch = ExtractError::Fetch {
            handle: 3,
            reason: "gone".to_string(),
        };
        assert_eq!(fetch.to_string(), "Failed to fetch message 3: gone");

        let select = ExtractError::Selection {
            mailbox: "INBOX".to_string(),
            reason: "NO".to_string(),
        };
        assert_eq!(select.to_string(), "Failed to select INBOX: NO");
    }

    #[test]
    fn authentication_message_mentions_login() {
        let err = ExtractError::Authentication("Invalid credentials".to_string());
        assert!(err.to_string().contains("login failed"));
    }
}
