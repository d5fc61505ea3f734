use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Write},
    path::{Component, Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-. ]").unwrap());

/// Replace every character outside `[\w\-. ]` with `_`, one for one.
pub fn sanitize_filename(filename: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(filename, "_").into_owned()
}

/// Split `name` into stem and extension (extension keeps its dot).
///
/// Leading dots never start an extension, so `.pdf` has no extension and
/// `archive.tar.gz` splits into `archive.tar` + `.gz`.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => name.split_at(dot),
        _ => (name, ""),
    }
}

/// Candidate name for collision attempt `attempt` (0 is the name itself).
pub fn numbered_name(name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    format!("{stem}_{attempt}{ext}")
}

/// First free path in `dir` for `name`, trying `name`, `stem_1.ext`,
/// `stem_2.ext`, ... starting at `first_attempt`.
pub fn resolve_unique_path(dir: &Path, name: &str, first_attempt: u32) -> (PathBuf, u32) {
    let mut attempt = first_attempt;
    loop {
        let candidate = dir.join(numbered_name(name, attempt));
        if !candidate.exists() {
            return (candidate, attempt);
        }
        attempt += 1;
    }
}

/// Write `bytes` to a new file in `dir` named after `name`, never touching
/// an existing file. Returns the path actually written.
///
/// The existence check and the create are separate steps; when another
/// writer takes the chosen name in between, `create_new` fails and the next
/// suffix is tried.
pub fn write_unique(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let mut attempt = 0;
    loop {
        let (path, used) = resolve_unique_path(dir, name, attempt);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                if let Err(err) = write_all_and_sync(&mut file, bytes) {
                    drop(file);
                    let _ = std::fs::remove_file(&path);
                    return Err(err);
                }
                return Ok(path);
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt = used + 1,
            Err(err) => return Err(err),
        }
    }
}

fn write_all_and_sync(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes)?;
    file.sync_all()
}

/// Resolve a caller-supplied name to a path inside `dir`, rejecting
/// anything other than a single plain file name.
pub fn contained_path(dir: &Path, requested: &str) -> Option<PathBuf> {
    if requested.contains('\\') {
        return None;
    }
    let mut components = Path::new(requested).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => Some(dir.join(name)),
        _ => None,
    }
}
