use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use super::models::SavedFile;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Idle,
    Connecting,
    Searching,
    Processing,
    Completed,
    Error,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProgressState {
    pub status: RunStatus,
    pub message: String,
    /// One-based index of the message being processed.
    pub progress: usize,
    pub total: usize,
    pub downloads: usize,
    pub files: Vec<SavedFile>,
}

impl ProgressState {
    pub fn idle() -> Self {
        Self {
            status: RunStatus::Idle,
            message: String::new(),
            progress: 0,
            total: 0,
            downloads: 0,
            files: vec![],
        }
    }

    pub fn connecting() -> Self {
        Self {
            status: RunStatus::Connecting,
            message: "Connecting to IMAP server...".to_string(),
            ..Self::idle()
        }
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Shared, lock-protected progress of one run.
///
/// Every setter takes the lock on its own, so a reader may see any
/// combination of partially applied updates.
#[derive(Debug, Clone, Default)]
pub struct ProgressHandle {
    inner: Arc<RwLock<ProgressState>>,
}

impl ProgressHandle {
    pub fn new(initial: ProgressState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn snapshot(&self) -> ProgressState {
        self.read().clone()
    }

    pub fn status(&self) -> RunStatus {
        self.read().status
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.write().message = message.into();
    }

    pub fn set_status(&self, status: RunStatus, message: impl Into<String>) {
        let mut state = self.write();
        state.status = status;
        state.message = message.into();
    }

    pub fn set_total(&self, total: usize) {
        self.write().total = total;
    }

    pub fn set_current(&self, index: usize, message: impl Into<String>) {
        let mut state = self.write();
        state.progress = index;
        state.message = message.into();
    }

    pub fn record_file(&self, file: SavedFile) {
        let mut state = self.write();
        state.downloads += 1;
        state.files.push(file);
    }

    // A writer that panicked mid-update leaves plain data behind; keep
    // serving it.
    fn read(&self) -> RwLockReadGuard<'_, ProgressState> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProgressState> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_value(ProgressState::connecting()).unwrap();
        assert_eq!(json["status"], "connecting");
        assert_eq!(json["message"], "Connecting to IMAP server...");
        assert_eq!(json["progress"], 0);
        assert_eq!(json["total"], 0);
        assert_eq!(json["downloads"], 0);
        assert_eq!(json["files"], serde_json::json!([]));
    }

    #[test]
    fn handle_updates_are_visible_to_clones() {
        let handle = ProgressHandle::new(ProgressState::connecting());
        let reader = handle.clone();
        handle.set_total(2);
        handle.set_current(1, "Processing email 1 of 2...");
        handle.record_file(SavedFile {
            name: "a.pdf".to_string(),
            subject: None,
            from: None,
            date: None,
            size: 3,
        });
        let state = reader.snapshot();
        assert_eq!(state.total, 2);
        assert_eq!(state.progress, 1);
        assert_eq!(state.downloads, 1);
        assert_eq!(state.files[0].name, "a.pdf");
        assert!(!state.status.is_terminal());
    }
}
