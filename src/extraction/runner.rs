use crate::{
    config::MailConfig,
    error::{ExtractError, Result},
    utils::utils_mailbox::{MailConnector, MailStore},
};

use super::{
    extractor::extract_all,
    models::{Credentials, RawCriteria},
    progress::{ProgressHandle, RunStatus},
    selector::{search_messages, select_inbox},
};

/// Everything a caller supplies for one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub credentials: Credentials,
    pub criteria: RawCriteria,
}

/// Run one extraction from connect to logout, reporting into `progress`.
///
/// Setup failures end the run with status `error`; per-message and
/// per-attachment failures only skip the affected item.
pub fn run_extraction(
    connector: &dyn MailConnector,
    config: &MailConfig,
    request: &RunRequest,
    progress: &ProgressHandle,
) -> Result<usize> {
    let outcome = connector
        .connect(&request.credentials)
        .and_then(|mut store| {
            let result = run_session(store.as_mut(), config, request, progress);
            logout(store.as_mut());
            result
        });

    match outcome {
        Ok(downloads) => Ok(downloads),
        Err(err) => {
            tracing::error!(error = %err, "Extraction run failed");
            progress.set_status(RunStatus::Error, format!("Error: {err}"));
            Err(err)
        }
    }
}

fn run_session(
    store: &mut dyn MailStore,
    config: &MailConfig,
    request: &RunRequest,
    progress: &ProgressHandle,
) -> Result<usize> {
    progress.set_message("Connected! Parsing dates...");
    let criteria = request.criteria.parse()?;

    progress.set_status(RunStatus::Searching, "Selecting INBOX...");
    select_inbox(store)?;

    progress.set_message(format!("Searching for emails from {}...", criteria.sender));
    let handles = search_messages(store, &criteria)?;

    if handles.is_empty() {
        tracing::info!(sender = %criteria.sender, "No matching messages");
        progress.set_status(
            RunStatus::Completed,
            "No messages found matching the criteria.",
        );
        return Ok(0);
    }

    tracing::info!(count = handles.len(), "Found matching messages");
    progress.set_total(handles.len());
    progress.set_status(
        RunStatus::Processing,
        format!("Found {} messages. Processing...", handles.len()),
    );

    std::fs::create_dir_all(&config.download_dir)
        .map_err(|err| ExtractError::io(&config.download_dir, err))?;

    let downloads = extract_all(
        store,
        &handles,
        &config.download_dir,
        &config.target_content_type,
        progress,
    );

    tracing::info!(downloads, "Extraction finished");
    progress.set_status(
        RunStatus::Completed,
        format!(
            "Complete! Downloaded {} {}(s).",
            downloads,
            config.target_label()
        ),
    );
    Ok(downloads)
}

fn logout(store: &mut dyn MailStore) {
    match store.logout() {
        Ok(()) => tracing::debug!("Logged out from IMAP server"),
        Err(err) => tracing::warn!(error = %err, "Logout failed"),
    }
}
