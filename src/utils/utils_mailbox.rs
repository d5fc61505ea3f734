use std::io::{Read, Write};

use imap::types::NameAttribute;
use utf7_imap::decode_utf7_imap;

use crate::{
    error::{ExtractError, Result},
    extraction::models::{Credentials, MessageHandle},
};

/// The handful of IMAP operations an extraction run needs.
pub trait MailStore {
    /// Selectable mailbox names, decoded from modified UTF-7.
    fn list_mailboxes(&mut self) -> Result<Vec<String>>;
    fn select(&mut self, mailbox: &str) -> Result<()>;
    fn search(&mut self, query: &str) -> Result<Vec<MessageHandle>>;
    /// Full RFC822 content of one message.
    fn fetch_rfc822(&mut self, handle: MessageHandle) -> Result<Vec<u8>>;
    fn logout(&mut self) -> Result<()>;
}

/// Opens authenticated sessions. Shared between runs.
pub trait MailConnector: Send + Sync {
    fn connect(&self, credentials: &Credentials) -> Result<Box<dyn MailStore + Send>>;
}

impl<T: Read + Write> MailStore for imap::Session<T> {
    fn list_mailboxes(&mut self) -> Result<Vec<String>> {
        let names = imap::Session::list(self, Some(""), Some("*"))
            .map_err(|err| ExtractError::Connection(format!("LIST failed: {err}")))?;

        Ok(names
            .iter()
            .filter(|name| !name.attributes().contains(&NameAttribute::NoSelect))
            .map(|name| decode_utf7_imap(name.name().to_string()))
            .collect())
    }

    fn select(&mut self, mailbox: &str) -> Result<()> {
        let info = imap::Session::select(self, mailbox).map_err(|err| ExtractError::Selection {
            mailbox: mailbox.to_string(),
            reason: err.to_string(),
        })?;
        tracing::debug!(mailbox, exists = info.exists, "Mailbox selected");
        Ok(())
    }

    fn search(&mut self, query: &str) -> Result<Vec<MessageHandle>> {
        let found = imap::Session::search(self, query)
            .map_err(|err| ExtractError::Search(err.to_string()))?;

        // The client hands back an unordered set; restore the server's
        // ascending sequence order.
        let mut handles: Vec<MessageHandle> = found.into_iter().collect();
        handles.sort_unstable();
        Ok(handles)
    }

    fn fetch_rfc822(&mut self, handle: MessageHandle) -> Result<Vec<u8>> {
        let fetches = imap::Session::fetch(self, handle.to_string(), "RFC822").map_err(|err| {
            ExtractError::Fetch {
                handle,
                reason: err.to_string(),
            }
        })?;

        fetches
            .iter()
            .find_map(|fetch| fetch.body())
            .map(<[u8]>::to_vec)
            .ok_or(ExtractError::Fetch {
                handle,
                reason: "server returned no message body".to_string(),
            })
    }

    fn logout(&mut self) -> Result<()> {
        imap::Session::logout(self)
            .map_err(|err| ExtractError::Connection(format!("LOGOUT failed: {err}")))
    }
}
