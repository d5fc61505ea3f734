//! In-memory mailbox and message builders shared by the extraction tests.

use std::sync::{Arc, Mutex};

use crate::{
    error::{ExtractError, Result},
    extraction::models::{Credentials, MessageHandle},
    utils::utils_mailbox::{MailConnector, MailStore},
};

pub fn pdf_part(filename: &str, bytes: &[u8]) -> String {
    format!(
        "Content-Type: application/pdf; name=\"{filename}\"\r\n\
Content-Disposition: attachment; filename=\"{filename}\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
{}\r\n",
        data_encoding::BASE64.encode(bytes)
    )
}

pub fn png_part(filename: &str) -> String {
    format!(
        "Content-Type: image/png\r\n\
Content-Disposition: attachment; filename=\"{filename}\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
iVBORw0KGgo=\r\n"
    )
}

/// An attached (forwarded) message wrapping `inner`.
pub fn forwarded_part(inner: &str) -> String {
    format!(
        "Content-Type: message/rfc822\r\n\
Content-Disposition: attachment\r\n\
\r\n\
{inner}"
    )
}

/// A `multipart/mixed` message with a text body followed by `parts`.
pub fn message(sender: &str, subject: &str, parts: &[String]) -> String {
    message_with_boundary(sender, subject, "XYZ", parts)
}

pub fn message_with_boundary(sender: &str, subject: &str, boundary: &str, parts: &[String]) -> String {
    let mut raw = format!(
        "From: Billing <{sender}>\r\n\
Subject: {subject}\r\n\
Date: Mon, 15 Jan 2024 10:00:00 +0000\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\
\r\n\
--{boundary}\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
See attached.\r\n"
    );
    for part in parts {
        raw.push_str(&format!("--{boundary}\r\n"));
        raw.push_str(part);
    }
    raw.push_str(&format!("--{boundary}--\r\n"));
    raw
}

/// What the fake server saw during a session.
#[derive(Debug, Default)]
pub struct Calls {
    pub selected: Vec<String>,
    pub queries: Vec<String>,
    pub fetched: Vec<MessageHandle>,
    pub logged_out: bool,
}

/// Mailbox contents keyed by sequence number; `None` makes the fetch fail.
#[derive(Clone, Default)]
pub struct FakeServer {
    pub messages: Vec<(MessageHandle, Option<String>)>,
    pub login_error: Option<String>,
    pub select_error: Option<String>,
    pub search_error: Option<String>,
    pub calls: Arc<Mutex<Calls>>,
}

impl FakeServer {
    pub fn with_messages(messages: Vec<String>) -> Self {
        Self {
            messages: messages
                .into_iter()
                .enumerate()
                .map(|(i, raw)| (i as MessageHandle + 1, Some(raw)))
                .collect(),
            ..Self::default()
        }
    }
}

struct FakeSession {
    server: FakeServer,
}

impl MailStore for FakeSession {
    fn list_mailboxes(&mut self) -> Result<Vec<String>> {
        Ok(vec!["INBOX".to_string(), "Sent".to_string()])
    }

    fn select(&mut self, mailbox: &str) -> Result<()> {
        self.server.calls.lock().unwrap().selected.push(mailbox.to_string());
        match &self.server.select_error {
            Some(reason) => Err(ExtractError::Selection {
                mailbox: mailbox.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn search(&mut self, query: &str) -> Result<Vec<MessageHandle>> {
        self.server.calls.lock().unwrap().queries.push(query.to_string());
        match &self.server.search_error {
            Some(reason) => Err(ExtractError::Search(reason.clone())),
            None => Ok(self.server.messages.iter().map(|(h, _)| *h).collect()),
        }
    }

    fn fetch_rfc822(&mut self, handle: MessageHandle) -> Result<Vec<u8>> {
        self.server.calls.lock().unwrap().fetched.push(handle);
        self.server
            .messages
            .iter()
            .find(|(h, _)| *h == handle)
            .and_then(|(_, raw)| raw.clone())
            .map(String::into_bytes)
            .ok_or(ExtractError::Fetch {
                handle,
                reason: "NO fetch failed".to_string(),
            })
    }

    fn logout(&mut self) -> Result<()> {
        self.server.calls.lock().unwrap().logged_out = true;
        Ok(())
    }
}

impl MailConnector for FakeServer {
    fn connect(&self, _credentials: &Credentials) -> Result<Box<dyn MailStore + Send>> {
        if let Some(reason) = &self.login_error {
            return Err(ExtractError::Authentication(reason.clone()));
        }
        Ok(Box::new(FakeSession {
            server: self.clone(),
        }))
    }
}
