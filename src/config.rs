//! Runtime configuration.
//!
//! Values come from command-line flags, falling back to environment
//! variables (a `.env` file is loaded first) and then built-in defaults.

use std::{path::PathBuf, time::Duration};

use clap::Args;

use crate::constants::{
    DEFAULT_BIND_ADDRESS, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DOWNLOAD_DIR, DEFAULT_HTTP_PORT,
    DEFAULT_IMAP_PORT, DEFAULT_IMAP_SERVER,
};

/// Settings shared by every extraction run.
#[derive(Args, Debug, Clone)]
pub struct MailConfig {
    /// IMAP server host name
    #[arg(long, env = "IMAP_SERVER", default_value = DEFAULT_IMAP_SERVER)]
    pub imap_server: String,

    /// IMAP server port (implicit TLS)
    #[arg(long, env = "IMAP_PORT", default_value_t = DEFAULT_IMAP_PORT)]
    pub imap_port: u16,

    /// Directory attachments are written to
    #[arg(long, env = "DOWNLOAD_DIR", default_value = DEFAULT_DOWNLOAD_DIR)]
    pub download_dir: PathBuf,

    /// Only attachments of exactly this content type are saved
    #[arg(long, env = "TARGET_CONTENT_TYPE", default_value = "application/pdf")]
    pub target_content_type: mime::Mime,

    /// TCP connect and read timeout, in seconds
    #[arg(long, env = "CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout_secs: u64,
}

impl MailConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Short label for the target type used in status messages, e.g. `PDF`.
    pub fn target_label(&self) -> String {
        self.target_content_type.subtype().as_str().to_uppercase()
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            imap_server: DEFAULT_IMAP_SERVER.to_string(),
            imap_port: DEFAULT_IMAP_PORT,
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            target_content_type: mime::APPLICATION_PDF,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// HTTP listener settings for `serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    #[arg(long, env = "BIND_ADDRESS", default_value = DEFAULT_BIND_ADDRESS)]
    pub bind_address: String,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub port: u16,
}
