use contracts::usecases::csv_import::{ImportStatus, ImportTask};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Outcome of processing one row, as recorded against the task counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Created,
    Updated,
    Failed,
}

/// In-memory registry of import tasks (for real-time polling).
///
/// Mutated only through this API; status transitions are monotonic:
/// pending -> processing -> completed | failed, and a terminal task is
/// never modified again. Reads clone the snapshot under a short read lock.
#[derive(Clone)]
pub struct ProgressTracker {
    tasks: Arc<RwLock<HashMap<String, ImportTask>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a new task in `pending`
    pub fn create(&self, task_id: &str, filename: &str) {
        let mut tasks = self.tasks.write().unwrap();
        tasks.insert(
            task_id.to_string(),
            ImportTask::new(task_id.to_string(), filename.to_string()),
        );
    }

    /// Transition to `processing` and set total_rows. The total is set
    /// once; repeated calls leave it untouched.
    pub fn begin(&self, task_id: &str, total_rows: u64) {
        let mut tasks = self.tasks.write().unwrap();
        if let Some(task) = tasks.get_mut(task_id) {
            if task.is_terminal() {
                return;
            }
            if task.status == ImportStatus::Pending {
                task.status = ImportStatus::Processing;
            }
            if task.total_rows == 0 {
                task.total_rows = total_rows;
            }
        }
    }

    /// Count one processed row against the matching counter
    pub fn record(&self, task_id: &str, outcome: RowOutcome) {
        let mut tasks = self.tasks.write().unwrap();
        if let Some(task) = tasks.get_mut(task_id) {
            if task.is_terminal() {
                return;
            }
            task.processed_rows += 1;
            match outcome {
                RowOutcome::Created => task.created_count += 1,
                RowOutcome::Updated => task.updated_count += 1,
                RowOutcome::Failed => task.failed_count += 1,
            }
        }
    }

    /// Record the terminal outcome. Idempotent: once a task is terminal,
    /// later calls are no-ops so retry-safe orchestration cannot clobber
    /// the first result.
    pub fn finish(&self, task_id: &str, status: ImportStatus, error_message: Option<String>) {
        if !status.is_terminal() {
            tracing::warn!("finish called with non-terminal status for task {}", task_id);
            return;
        }
        let mut tasks = self.tasks.write().unwrap();
        if let Some(task) = tasks.get_mut(task_id) {
            if task.is_terminal() {
                return;
            }
            task.status = status;
            task.error_message = error_message;
            task.finished_at = Some(chrono::Utc::now());
        }
    }

    /// Current snapshot for polling clients
    pub fn get(&self, task_id: &str) -> Option<ImportTask> {
        let tasks = self.tasks.read().unwrap();
        tasks.get(task_id).cloned()
    }

    /// Drop finished tasks older than the retention window. Tasks still
    /// running are always kept.
    pub fn cleanup_finished(&self, max_age_hours: i64) {
        let mut tasks = self.tasks.write().unwrap();
        let now = chrono::Utc::now();
        tasks.retain(|_, task| {
            if let Some(finished_at) = task.finished_at {
                (now - finished_at).num_hours() < max_age_hours
            } else {
                true
            }
        });
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
