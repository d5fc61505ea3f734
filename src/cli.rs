//! Interactive command-line extraction.

use std::{
    io::{self, BufRead, Write},
    sync::Mutex,
};

use anyhow::Context;
use clap::Args;

use crate::{
    config::MailConfig,
    error::{ExtractError, Result},
    extraction::{
        models::{Credentials, RawCriteria},
        progress::{ProgressHandle, ProgressState},
        runner::{run_extraction, RunRequest},
    },
    utils::{
        utils_mailbox::{MailConnector, MailStore},
        utils_transports::ImapConnector,
    },
};

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Mail account to log in as
    #[arg(long, env = "EMAIL_ADDRESS")]
    pub email_address: Option<String>,

    /// App password for the account
    #[arg(long, env = "APP_PASSWORD", hide_env_values = true)]
    pub app_password: Option<String>,

    /// Only messages from this sender are searched
    #[arg(long)]
    pub sender: Option<String>,

    /// First day of the range (YYYY-MM-DD or DD-Mon-YYYY)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Last day of the range, inclusive
    #[arg(long)]
    pub end_date: Option<String>,

    #[command(flatten)]
    pub mail: MailConfig,
}

/// Hands out a session that was opened before the search criteria were
/// known. Only the first `connect` succeeds.
struct OpenSession {
    store: Mutex<Option<Box<dyn MailStore + Send>>>,
}

impl OpenSession {
    fn new(store: Box<dyn MailStore + Send>) -> Self {
        Self {
            store: Mutex::new(Some(store)),
        }
    }
}

impl MailConnector for OpenSession {
    fn connect(&self, _credentials: &Credentials) -> Result<Box<dyn MailStore + Send>> {
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .ok_or_else(|| ExtractError::Connection("session already in use".to_string()))
    }
}

fn print_mailboxes(store: &mut dyn MailStore) {
    match store.list_mailboxes() {
        Ok(names) => {
            println!("\nAvailable Mailboxes:");
            for name in names {
                println!("- {name}");
            }
        }
        Err(err) => tracing::warn!(error = %err, "Failed to list mailboxes"),
    }
}

fn prompt(input: &mut impl BufRead, label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn value_or_prompt(
    value: Option<String>,
    input: &mut impl BufRead,
    label: &str,
) -> anyhow::Result<String> {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(value) => Ok(value),
        None => prompt(input, label).with_context(|| format!("reading '{}'", label.trim())),
    }
}

pub fn run_interactive(args: ExtractArgs) -> anyhow::Result<()> {
    let imap = ImapConnector {
        host: args.mail.imap_server.clone(),
        port: args.mail.imap_port,
        timeout: args.mail.connect_timeout(),
    };
    let stdin = io::stdin();
    run_flow(args, &imap, &mut stdin.lock())
}

fn read_criteria(
    sender: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    input: &mut impl BufRead,
) -> anyhow::Result<RawCriteria> {
    let sender = value_or_prompt(sender, input, "What sender to use?: ")?;
    if start_date.is_none() || end_date.is_none() {
        println!("Please enter dates as YYYY-MM-DD or DD-Mon-YYYY (e.g., 01-Jan-2024)");
    }
    Ok(RawCriteria {
        sender,
        start_date: value_or_prompt(start_date, input, "From which date?: ")?,
        end_date: value_or_prompt(end_date, input, "To which date?: ")?,
    })
}

fn fail(err: ExtractError) -> anyhow::Error {
    eprintln!("ERROR: {err}");
    err.into()
}

/// Log in first so bad credentials fail before the search criteria are
/// asked for.
fn run_flow(
    args: ExtractArgs,
    connector: &dyn MailConnector,
    input: &mut impl BufRead,
) -> anyhow::Result<()> {
    let address = value_or_prompt(args.email_address, input, "Email address: ")?;
    let secret = value_or_prompt(args.app_password, input, "App password: ")?;
    let credentials = Credentials::new(address, secret);

    println!("\nConnecting to {}...", args.mail.imap_server);
    let mut store = connector.connect(&credentials).map_err(fail)?;
    print_mailboxes(store.as_mut());

    let criteria = match read_criteria(args.sender, args.start_date, args.end_date, input) {
        Ok(criteria) => criteria,
        Err(err) => {
            if let Err(logout_err) = store.logout() {
                tracing::warn!(error = %logout_err, "Logout failed");
            }
            return Err(err);
        }
    };
    let request = RunRequest {
        credentials,
        criteria,
    };
    let progress = ProgressHandle::new(ProgressState::connecting());

    println!(
        "\nSearching for emails from '{}' between {} and {}...",
        request.criteria.sender, request.criteria.start_date, request.criteria.end_date
    );

    let session = OpenSession::new(store);
    run_extraction(&session, &args.mail, &request, &progress).map_err(fail)?;

    let state = progress.snapshot();
    if !state.files.is_empty() {
        let dir = std::fs::canonicalize(&args.mail.download_dir)
            .unwrap_or_else(|_| args.mail.download_dir.clone());
        println!("\nAttachments saved in: {}", dir.display());
        for file in &state.files {
            println!(
                "  -> {} ({} bytes) from {}",
                file.name,
                file.size,
                file.from.as_deref().unwrap_or("unknown sender")
            );
        }
    }
    println!("\n--- {} ---", state.message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::extraction::fixtures::{self, FakeServer};

    #[test]
    fn provided_values_skip_the_prompt() {
        let mut input = Cursor::new(b"typed\n".to_vec());
        let value = value_or_prompt(Some("given".to_string()), &mut input, "x: ").unwrap();
        assert_eq!(value, "given");
    }

    #[test]
    fn missing_values_are_read_and_trimmed() {
        let mut input = Cursor::new(b"  a@b.com  \n2024-01-01\n".to_vec());
        assert_eq!(value_or_prompt(None, &mut input, "x: ").unwrap(), "a@b.com");
        assert_eq!(
            value_or_prompt(Some(" ".to_string()), &mut input, "y: ").unwrap(),
            "2024-01-01"
        );
    }

    fn args(dir: &std::path::Path) -> ExtractArgs {
        ExtractArgs {
            email_address: Some("me@example.com".to_string()),
            app_password: Some("pw".to_string()),
            sender: None,
            start_date: None,
            end_date: None,
            mail: crate::config::MailConfig {
                download_dir: dir.to_path_buf(),
                ..crate::config::MailConfig::default()
            },
        }
    }

    #[test]
    fn open_session_is_handed_out_once() {
        let server = FakeServer::default();
        let credentials = Credentials::new("me@example.com", "pw");
        let session = OpenSession::new(server.connect(&credentials).unwrap());

        let mut store = session.connect(&credentials).unwrap();
        assert!(store.logout().is_ok());
        assert!(server.calls.lock().unwrap().logged_out);
        assert!(matches!(
            session.connect(&credentials),
            Err(ExtractError::Connection(_))
        ));
    }

    #[test]
    fn login_failure_stops_before_search_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let server = FakeServer {
            login_error: Some("Invalid credentials".to_string()),
            ..FakeServer::default()
        };
        let mut input = Cursor::new(b"a@b.com\n2024-01-01\n2024-01-31\n".to_vec());

        let err = run_flow(args(dir.path()), &server, &mut input).unwrap_err();

        assert!(err.to_string().contains("login failed"));
        assert_eq!(input.position(), 0);
        assert!(server.calls.lock().unwrap().queries.is_empty());
    }

    #[test]
    fn criteria_are_read_after_login() {
        let dir = tempfile::tempdir().unwrap();
        let server = FakeServer::with_messages(vec![fixtures::message(
            "a@b.com",
            "Invoice",
            &[fixtures::pdf_part("invoice.pdf", b"%PDF")],
        )]);
        let mut input = Cursor::new(b"a@b.com\n2024-01-01\n2024-01-31\n".to_vec());

        run_flow(args(dir.path()), &server, &mut input).unwrap();

        let calls = server.calls.lock().unwrap();
        assert_eq!(
            calls.queries,
            vec![r#"FROM "a@b.com" SINCE "01-Jan-2024" BEFORE "01-Feb-2024""#]
        );
        assert!(calls.logged_out);
        assert!(dir.path().join("invoice.pdf").is_file());
    }
}
