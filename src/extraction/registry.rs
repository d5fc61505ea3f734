use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{config::MailConfig, constants::MAX_RETAINED_RUNS, utils::utils_mailbox::MailConnector};

use super::{
    progress::{ProgressHandle, ProgressState},
    runner::{run_extraction, RunRequest},
};

pub type RunId = Uuid;

struct RunEntry {
    id: RunId,
    progress: ProgressHandle,
    task: Option<JoinHandle<()>>,
}

impl RunEntry {
    fn is_active(&self) -> bool {
        let finished = self.task.as_ref().is_some_and(JoinHandle::is_finished);
        !finished && !self.progress.status().is_terminal()
    }
}

/// Progress of recent runs, newest last. At most one run is active at a
/// time.
#[derive(Default)]
pub struct RunRegistry {
    runs: Mutex<VecDeque<RunEntry>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new run, or return the id of the run still in progress.
    pub(crate) fn begin(&self) -> Result<(RunId, ProgressHandle), RunId> {
        let mut runs = self.lock();
        if let Some(active) = runs.back().filter(|entry| entry.is_active()) {
            return Err(active.id);
        }

        let id = Uuid::new_v4();
        let progress = ProgressHandle::new(ProgressState::connecting());
        runs.push_back(RunEntry {
            id,
            progress: progress.clone(),
            task: None,
        });
        while runs.len() > MAX_RETAINED_RUNS {
            runs.pop_front();
        }
        Ok((id, progress))
    }

    /// Start a run on the blocking pool and return its id right away.
    ///
    /// Fails with the active run's id when one is still in progress.
    pub fn start(
        &self,
        connector: Arc<dyn MailConnector>,
        config: Arc<MailConfig>,
        request: RunRequest,
    ) -> Result<RunId, RunId> {
        let (id, progress) = self.begin()?;
        tracing::info!(run_id = %id, sender = %request.criteria.sender, "Starting extraction run");

        let task = tokio::task::spawn_blocking(move || {
            match run_extraction(connector.as_ref(), &config, &request, &progress) {
                Ok(downloads) => tracing::debug!(run_id = %id, downloads, "Run finished"),
                Err(err) => tracing::debug!(run_id = %id, error = %err, "Run ended with error"),
            }
        });

        if let Some(entry) = self.lock().iter_mut().find(|entry| entry.id == id) {
            entry.task = Some(task);
        }
        Ok(id)
    }

    /// Snapshot of the newest run, or an idle state before the first one.
    pub fn latest(&self) -> ProgressState {
        self.lock()
            .back()
            .map(|entry| entry.progress.snapshot())
            .unwrap_or_default()
    }

    pub fn get(&self, id: RunId) -> Option<ProgressState> {
        self.lock()
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.progress.snapshot())
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<RunEntry>> {
        self.runs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
