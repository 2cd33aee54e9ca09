use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an import task. Transitions are one-directional:
/// pending -> processing -> completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ImportStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportStatus::Completed | ImportStatus::Failed)
    }
}

/// Snapshot of a single import task: status, counters and terminal outcome.
/// Owned by the progress tracker; read-only for polling clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportTask {
    pub task_id: String,
    pub filename: String,
    pub status: ImportStatus,
    pub total_rows: u64,
    pub processed_rows: u64,
    pub created_count: u64,
    pub updated_count: u64,
    pub failed_count: u64,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ImportTask {
    pub fn new(task_id: String, filename: String) -> Self {
        Self {
            task_id,
            filename,
            status: ImportStatus::Pending,
            total_rows: 0,
            processed_rows: 0,
            created_count: 0,
            updated_count: 0,
            failed_count: 0,
            error_message: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
