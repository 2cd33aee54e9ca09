use serde::{Deserialize, Serialize};

use super::progress::ImportTask;

/// Response to POST /api/upload: the caller gets a task id immediately,
/// the pipeline continues in the background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub task_id: String,
    pub filename: String,
    pub message: String,
}

/// Response to GET /api/upload/progress/:task_id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    #[serde(flatten)]
    pub task: ImportTask,
    pub progress_percentage: f64,
}

impl From<ImportTask> for ProgressResponse {
    fn from(task: ImportTask) -> Self {
        let progress_percentage = if task.total_rows > 0 {
            task.processed_rows as f64 / task.total_rows as f64 * 100.0
        } else {
            0.0
        };
        Self {
            task,
            progress_percentage,
        }
    }
}
