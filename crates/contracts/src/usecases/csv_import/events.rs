use serde::{Deserialize, Serialize};

/// Terminal import events emitted by the executor onto the dispatch channel.
/// The webhook dispatcher consumes these and fans them out to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImportEvent {
    /// All rows processed; per-row failures are tolerated
    Completed {
        task_id: String,
        created: u64,
        updated: u64,
        failed: u64,
    },

    /// Unrecoverable error; zero or more rows may have been processed
    Failed {
        task_id: String,
        error_message: String,
    },
}

impl ImportEvent {
    pub fn task_id(&self) -> &str {
        match self {
            ImportEvent::Completed { task_id, .. } => task_id,
            ImportEvent::Failed { task_id, .. } => task_id,
        }
    }

    /// Event type string delivered to webhook subscribers
    pub fn event_type(&self) -> &'static str {
        match self {
            ImportEvent::Completed { .. } => "import.completed",
            ImportEvent::Failed { .. } => "import.failed",
        }
    }
}
