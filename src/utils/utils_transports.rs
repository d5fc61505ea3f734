use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use imap::Session;
use native_tls::TlsStream;

use crate::{
    error::{ExtractError, Result},
    extraction::models::Credentials,
};

use super::utils_mailbox::{MailConnector, MailStore};

pub type ImapSession = Session<TlsStream<TcpStream>>;

/// Open a TLS session to `host:port` and log in.
///
/// A `NO`/`BAD` answer to LOGIN is an authentication failure; anything that
/// goes wrong before that is a connection failure.
pub fn create_imap_session(
    credentials: &Credentials,
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<ImapSession> {
    if credentials.address.trim().is_empty() || credentials.secret.is_empty() {
        return Err(ExtractError::Authentication(
            "email address and app password are required".to_string(),
        ));
    }

    let tls = native_tls::TlsConnector::builder()
        .build()
        .map_err(|err| ExtractError::Connection(format!("TlsConnector build failed: {err}")))?;

    let address = (host, port)
        .to_socket_addrs()
        .map_err(|err| ExtractError::Connection(format!("cannot resolve {host}: {err}")))?
        .next()
        .ok_or_else(|| ExtractError::Connection(format!("no address found for {host}")))?;

    tracing::debug!(%address, "Opening TCP connection");
    let tcp = TcpStream::connect_timeout(&address, timeout)
        .map_err(|err| ExtractError::Connection(format!("IMAP connect failed: {err}")))?;
    tcp.set_read_timeout(Some(timeout))
        .and_then(|_| tcp.set_write_timeout(Some(timeout)))
        .map_err(|err| ExtractError::Connection(format!("socket setup failed: {err}")))?;

    let stream = tls
        .connect(host, tcp)
        .map_err(|err| ExtractError::Connection(format!("TLS handshake failed: {err:?}")))?;

    let mut client = imap::Client::new(stream);
    client
        .read_greeting()
        .map_err(|err| ExtractError::Connection(format!("no server greeting: {err}")))?;

    client
        .login(&credentials.address, &credentials.secret)
        .map_err(|(err, _client)| match err {
            imap::Error::No(reason) | imap::Error::Bad(reason) => {
                ExtractError::Authentication(reason)
            }
            other => ExtractError::Connection(format!("IMAP login aborted: {other}")),
        })
}

/// Connector for a real IMAP server.
#[derive(Debug, Clone)]
pub struct ImapConnector {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl MailConnector for ImapConnector {
    fn connect(&self, credentials: &Credentials) -> Result<Box<dyn MailStore + Send>> {
        tracing::info!(host = %self.host, port = self.port, "Connecting to IMAP server");
        let session = create_imap_session(credentials, &self.host, self.port, self.timeout)?;
        tracing::info!(address = %credentials.address, "Logged in");
        Ok(Box::new(session))
    }
}
