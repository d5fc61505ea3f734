use std::path::Path;

use mailparse::{MailHeaderMap, ParsedMail};

use crate::{
    error::{ExtractError, Result},
    utils::{
        utils_files::{sanitize_filename, write_unique},
        utils_mailbox::MailStore,
    },
};

use super::{
    models::{Attachment, MessageHandle, SavedFile},
    progress::ProgressHandle,
};

/// Header values copied onto every file saved from one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageMeta {
    pub subject: Option<String>,
    pub from: Option<String>,
    pub date: Option<String>,
}

impl MessageMeta {
    pub fn from_mail(mail: &ParsedMail) -> Self {
        let headers = mail.get_headers();
        Self {
            subject: headers.get_first_value("Subject"),
            from: headers.get_first_value("From"),
            date: headers.get_first_value("Date"),
        }
    }
}

/// Declared filename of a part: the `Content-Disposition` filename,
/// otherwise the `Content-Type` name.
fn part_filename(part: &ParsedMail) -> Option<String> {
    part.get_content_disposition()
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .filter(|name| !name.is_empty())
        .cloned()
}

type Found = std::result::Result<Attachment, (String, String)>;

fn is_forwarded(part: &ParsedMail) -> bool {
    part.ctype.mimetype.eq_ignore_ascii_case("message/rfc822")
}

fn collect_attachments(part: &ParsedMail, target: &mime::Mime, out: &mut Vec<Found>) {
    if part.ctype.mimetype.eq_ignore_ascii_case(target.essence_str()) {
        if let Some(filename) = part_filename(part) {
            out.push(match part.get_body_raw() {
                Ok(raw_bytes) => Ok(Attachment {
                    original_filename: filename,
                    content_type: part.ctype.mimetype.clone(),
                    raw_bytes,
                }),
                Err(err) => Err((filename, err.to_string())),
            });
        }
    }

    // mailparse leaves an attached message unparsed.
    if is_forwarded(part) {
        match part.get_body_raw() {
            Ok(inner_raw) => match mailparse::parse_mail(&inner_raw) {
                Ok(inner) => collect_attachments(&inner, target, out),
                Err(err) => tracing::warn!(error = %err, "Skipping unparsable forwarded message"),
            },
            Err(err) => tracing::warn!(error = %err, "Skipping undecodable forwarded message"),
        }
    }

    for sub in &part.subparts {
        collect_attachments(sub, target, out);
    }
}

/// Every part of `mail` (root included, depth first, forwarded messages
/// entered) that declares a filename and whose content type is exactly
/// `target`.
///
/// Parts whose payload cannot be decoded come back as errors so the caller
/// can skip just that attachment.
pub fn find_attachments(mail: &ParsedMail, target: &mime::Mime) -> Vec<Found> {
    let mut found = Vec::new();
    collect_attachments(mail, target, &mut found);
    found
}

/// Sanitize the attachment's name, pick a free name in `dir` and write it.
pub fn save_attachment(dir: &Path, attachment: &Attachment, meta: &MessageMeta) -> Result<SavedFile> {
    let safe_name = sanitize_filename(&attachment.original_filename);
    let path = write_unique(dir, &safe_name, &attachment.raw_bytes).map_err(|err| {
        ExtractError::Write {
            path: dir.join(&safe_name),
            reason: err.to_string(),
        }
    })?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or(safe_name);

    Ok(SavedFile {
        name,
        subject: meta.subject.clone(),
        from: meta.from.clone(),
        date: meta.date.clone(),
        size: attachment.raw_bytes.len() as u64,
    })
}

/// Fetch, parse and save matching attachments of a single message.
///
/// Only a failed fetch or an unparsable message is returned as an error;
/// individual attachments that cannot be written are logged and skipped.
pub fn process_message(
    store: &mut dyn MailStore,
    handle: MessageHandle,
    dir: &Path,
    target: &mime::Mime,
    progress: &ProgressHandle,
) -> Result<usize> {
    let raw = store.fetch_rfc822(handle)?;
    let mail = mailparse::parse_mail(&raw).map_err(|err| ExtractError::Fetch {
        handle,
        reason: format!("unparsable message: {err}"),
    })?;

    let meta = MessageMeta::from_mail(&mail);
    tracing::debug!(
        handle,
        subject = meta.subject.as_deref().unwrap_or(""),
        from = meta.from.as_deref().unwrap_or(""),
        "Processing message"
    );

    let mut saved = 0;
    for found in find_attachments(&mail, target) {
        let attachment = match found {
            Ok(attachment) => attachment,
            Err((filename, reason)) => {
                let err = ExtractError::Write {
                    path: dir.join(sanitize_filename(&filename)),
                    reason: format!("cannot decode payload: {reason}"),
                };
                tracing::warn!(handle, error = %err, "Skipping attachment");
                continue;
            }
        };

        tracing::info!(
            handle,
            filename = %attachment.original_filename,
            content_type = %attachment.content_type,
            "Identified attachment"
        );
        match save_attachment(dir, &attachment, &meta) {
            Ok(file) => {
                tracing::info!(handle, name = %file.name, size = file.size, "Saved attachment");
                progress.record_file(file);
                saved += 1;
            }
            Err(err) => tracing::warn!(handle, error = %err, "Skipping attachment"),
        }
    }

    Ok(saved)
}

/// Walk `handles` in order, saving attachments and updating `progress`
/// after each message. Returns the number of files written.
pub fn extract_all(
    store: &mut dyn MailStore,
    handles: &[MessageHandle],
    dir: &Path,
    target: &mime::Mime,
    progress: &ProgressHandle,
) -> usize {
    let total = handles.len();
    let mut downloads = 0;

    for (index, &handle) in handles.iter().enumerate() {
        progress.set_current(
            index + 1,
            format!("Processing email {} of {}...", index + 1, total),
        );

        match process_message(store, handle, dir, target, progress) {
            Ok(saved) => downloads += saved,
            Err(err) => tracing::warn!(handle, error = %err, "Skipping message"),
        }
    }

    downloads
}
